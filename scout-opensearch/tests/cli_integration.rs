//! Integration tests wiring the CLI to a real transport.
//!
//! No cluster is needed: the transport points at a closed local port, so these
//! tests cover settings, wiring and error propagation up to the network.

use clap::Parser;
use scout_opensearch::commands::{self, Cli};
use scout_opensearch::{AppError, Dependencies, Settings};
use scout_opensearch_repository::SearchIndexError;

fn unreachable_dependencies() -> Dependencies {
    let settings = Settings::from_lookup(|key| match key {
        "OPENSEARCH_HOSTS" => Some("http://127.0.0.1:1".to_string()),
        "OPENSEARCH_RETRIES" => Some("0".to_string()),
        "OPENSEARCH_TIMEOUT_SECS" => Some("2".to_string()),
        "SCOUT_SOFT_DELETE" => Some("true".to_string()),
        _ => None,
    })
    .unwrap();

    Dependencies::from_settings(settings).unwrap()
}

#[tokio::test]
async fn test_search_against_unreachable_cluster() {
    let deps = unreachable_dependencies();
    assert!(deps.engine.config().soft_delete);

    let cli = Cli::try_parse_from(["scout-opensearch", "search", "posts", "zonda"]).unwrap();
    let result = commands::run(cli.command, &deps.engine).await;

    assert!(matches!(
        result,
        Err(AppError::SearchIndex(SearchIndexError::ConnectionError(_)))
    ));
}

#[tokio::test]
async fn test_create_index_against_unreachable_cluster() {
    let deps = unreachable_dependencies();

    let cli = Cli::try_parse_from(["scout-opensearch", "create-index", "posts"]).unwrap();
    let result = commands::run(cli.command, &deps.engine).await;

    assert!(matches!(
        result,
        Err(AppError::SearchIndex(SearchIndexError::ConnectionError(_)))
    ));
}

#[test]
fn test_cli_rejects_conflicting_trashed_flags() {
    let result = Cli::try_parse_from([
        "scout-opensearch",
        "search",
        "posts",
        "--with-trashed",
        "--only-trashed",
    ]);

    assert!(result.is_err());
}
