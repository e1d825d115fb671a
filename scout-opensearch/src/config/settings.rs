//! Settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::AppError;
use scout_opensearch_repository::config::{
    DEFAULT_FLUSH_CHUNK_SIZE, DEFAULT_HOST, DEFAULT_RETRIES, DEFAULT_TIMEOUT,
};
use scout_opensearch_repository::{ConnectionConfig, EngineConfig};

/// Default TLS certificate verification.
const DEFAULT_SSL_VERIFICATION: bool = true;

/// Default soft-delete support.
const DEFAULT_SOFT_DELETE: bool = false;

/// Connection and engine settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub engine: EngineConfig,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_HOSTS`: Comma-separated host URLs (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: Basic auth credentials (optional)
    /// - `OPENSEARCH_RETRIES`: Retries after a connection failure (default: 2)
    /// - `OPENSEARCH_SSL_VERIFICATION`: Verify TLS certificates (default: true)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    /// - `SCOUT_SOFT_DELETE`: Enable soft-delete support (default: false)
    /// - `SCOUT_MAX_BATCH_SIZE`: Maximum operations per bulk request (default: unlimited)
    /// - `SCOUT_FLUSH_CHUNK_SIZE`: Keys deleted per bulk request when flushing (default: 500)
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hosts: Vec<String> = lookup("OPENSEARCH_HOSTS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|host| !host.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|hosts| !hosts.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_HOST.to_string()]);

        let mut connection = ConnectionConfig::new(&hosts)
            .map_err(|e| AppError::config(e.to_string()))?
            .with_retries(parse_or(&lookup, "OPENSEARCH_RETRIES", DEFAULT_RETRIES))
            .with_tls_verification(parse_bool_or(
                &lookup,
                "OPENSEARCH_SSL_VERIFICATION",
                DEFAULT_SSL_VERIFICATION,
            ))
            .with_timeout(Duration::from_secs(parse_or(
                &lookup,
                "OPENSEARCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )));

        match (lookup("OPENSEARCH_USERNAME"), lookup("OPENSEARCH_PASSWORD")) {
            (Some(username), Some(password)) => {
                connection = connection.with_basic_auth(username, password);
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one of OPENSEARCH_USERNAME and OPENSEARCH_PASSWORD is set, ignoring credentials");
            }
            (None, None) => {}
        }

        let mut engine = EngineConfig::default()
            .with_soft_delete(parse_bool_or(&lookup, "SCOUT_SOFT_DELETE", DEFAULT_SOFT_DELETE))
            .with_flush_chunk_size(parse_or(
                &lookup,
                "SCOUT_FLUSH_CHUNK_SIZE",
                DEFAULT_FLUSH_CHUNK_SIZE,
            ));

        if let Some(max) = parse_optional::<usize, _>(&lookup, "SCOUT_MAX_BATCH_SIZE") {
            engine = engine.with_max_batch_size(max);
        }

        Ok(Self { connection, engine })
    }
}

fn parse_optional<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Invalid value, using default");
            None
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    parse_optional(lookup, key).unwrap_or(default)
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            warn!(key, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}
