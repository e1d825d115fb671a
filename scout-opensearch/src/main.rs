//! Scout OpenSearch Entry Point
//!
//! Admin CLI for creating, deleting and querying Scout indexes.

use clap::Parser;
use dotenv::dotenv;
use scout_opensearch::commands::{self, Cli};
use scout_opensearch::{AppError, Dependencies};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("scout_opensearch=info,scout_opensearch_repository=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .init();

        info!(
            service_name = "scout-opensearch",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        // Logs go to stderr so command output on stdout stays parseable
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let deps = match Dependencies::new() {
        Ok(deps) => deps,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match commands::run(cli.command, &deps.engine).await {
        Ok(output) => {
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::input(format!("Unprintable response: {}", e)))?;
            println!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
