//! Admin commands.
//!
//! Each command maps onto one `ScoutEngine` operation and yields the JSON
//! returned by the backend.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::info;

use crate::AppError;
use scout_opensearch_repository::{
    HttpMethod, IndexConfig, KeyType, ScoutEngine, SearchRequest, SortDirection,
};

#[derive(Debug, Parser)]
#[command(name = "scout-opensearch")]
#[command(about = "Manage and query Scout OpenSearch indexes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an index
    CreateIndex {
        /// Index name
        name: String,

        /// Number of primary shards
        #[arg(long, default_value = "1")]
        shards: u32,

        /// Number of replicas per shard
        #[arg(long, default_value = "1")]
        replicas: u32,

        /// Map the `id` key as `long` instead of `keyword`
        #[arg(long)]
        integer_keys: bool,

        /// Raw JSON index body, replacing the generated settings
        #[arg(long)]
        body: Option<String>,
    },

    /// Delete an index
    DeleteIndex {
        /// Index name
        name: String,
    },

    /// Search an index and print the raw response
    Search {
        /// Index name
        index: String,

        /// Free-text query (empty matches everything)
        #[arg(default_value = "")]
        query: String,

        /// Equality filter as column=value (repeatable)
        #[arg(long = "where", value_name = "COLUMN=VALUE")]
        wheres: Vec<String>,

        /// Sort as column:asc or column:desc (repeatable)
        #[arg(long = "sort", value_name = "COLUMN:DIRECTION")]
        sorts: Vec<String>,

        /// Maximum number of hits
        #[arg(long)]
        limit: Option<usize>,

        /// Results per page; enables pagination
        #[arg(long)]
        per_page: Option<usize>,

        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: usize,

        /// Include soft-deleted records
        #[arg(long, conflicts_with = "only_trashed")]
        with_trashed: bool,

        /// Only soft-deleted records
        #[arg(long)]
        only_trashed: bool,
    },

    /// Send a raw request to the cluster
    Raw {
        /// HTTP method
        #[arg(value_enum)]
        method: RawMethod,

        /// Request path, e.g. _cluster/health
        path: String,

        /// Raw JSON request body
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RawMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl From<RawMethod> for HttpMethod {
    fn from(method: RawMethod) -> Self {
        match method {
            RawMethod::Get => HttpMethod::Get,
            RawMethod::Post => HttpMethod::Post,
            RawMethod::Put => HttpMethod::Put,
            RawMethod::Delete => HttpMethod::Delete,
            RawMethod::Head => HttpMethod::Head,
        }
    }
}

/// Run a command against the engine.
pub async fn run(command: Command, engine: &ScoutEngine) -> Result<Value, AppError> {
    match command {
        Command::CreateIndex {
            name,
            shards,
            replicas,
            integer_keys,
            body,
        } => {
            let key_type = if integer_keys {
                KeyType::Long
            } else {
                KeyType::Keyword
            };
            let options = match body {
                Some(raw) => parse_json(&raw)?,
                None => IndexConfig::new(shards, replicas)
                    .with_soft_delete(engine.config().soft_delete)
                    .with_key_type(key_type)
                    .to_options(),
            };
            info!(index = %name, "Creating index");
            Ok(engine.create_index(&name, options).await?)
        }
        Command::DeleteIndex { name } => {
            info!(index = %name, "Deleting index");
            Ok(engine.delete_index(&name).await?)
        }
        Command::Search {
            index,
            query,
            wheres,
            sorts,
            limit,
            per_page,
            page,
            with_trashed,
            only_trashed,
        } => {
            let mut request = SearchRequest::new(index, query);
            for raw in &wheres {
                let (column, value) = parse_where(raw)?;
                request = request.where_eq(column, value);
            }
            for raw in &sorts {
                let (column, direction) = parse_sort(raw)?;
                request = request.order_by(column, direction);
            }
            if let Some(limit) = limit {
                request = request.take(limit);
            }
            if with_trashed {
                request = request.with_trashed();
            } else if only_trashed {
                request = request.only_trashed();
            }

            let results = match per_page {
                Some(per_page) => engine.paginate(&request, per_page, page).await?,
                None => engine.search(&request).await?,
            };

            Ok(json!({
                "total": engine.total_count(&results),
                "ids": engine.map_ids(&results),
                "raw": results.into_inner(),
            }))
        }
        Command::Raw { method, path, body } => {
            let body = body.as_deref().map(parse_json).transpose()?;
            Ok(engine.invoke(method.into(), &path, body).await?)
        }
    }
}

fn parse_json(raw: &str) -> Result<Value, AppError> {
    serde_json::from_str(raw).map_err(|e| AppError::input(format!("Invalid JSON body: {}", e)))
}

/// Parse `column=value`. The value is read as JSON when possible, as a string otherwise.
fn parse_where(raw: &str) -> Result<(String, Value), AppError> {
    let (column, value) = raw
        .split_once('=')
        .filter(|(column, _)| !column.trim().is_empty())
        .ok_or_else(|| AppError::input(format!("Expected COLUMN=VALUE, got '{}'", raw)))?;

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((column.trim().to_string(), value))
}

/// Parse `column:asc` / `column:desc`. A bare column sorts ascending.
fn parse_sort(raw: &str) -> Result<(String, SortDirection), AppError> {
    let (column, direction) = match raw.rsplit_once(':') {
        Some((column, direction)) => (column, direction),
        None => (raw, "asc"),
    };

    if column.trim().is_empty() {
        return Err(AppError::input(format!("Missing sort column in '{}'", raw)));
    }

    let direction = match direction.to_lowercase().as_str() {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => {
            return Err(AppError::input(format!(
                "Unknown sort direction '{}', expected asc or desc",
                other
            )))
        }
    };

    Ok((column.trim().to_string(), direction))
}
