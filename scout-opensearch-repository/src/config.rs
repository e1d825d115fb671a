//! Configuration types for the ScoutEngine and the OpenSearch transport.

use std::time::Duration;

use url::Url;

use crate::errors::SearchIndexError;

/// Default number of keys deleted per bulk request when flushing an index.
pub const DEFAULT_FLUSH_CHUNK_SIZE: usize = 500;

/// Default number of transport-level retries.
pub const DEFAULT_RETRIES: usize = 2;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default OpenSearch host.
pub const DEFAULT_HOST: &str = "http://localhost:9200";

/// Configuration for the ScoutEngine.
///
/// Controls soft-delete handling and the size of bulk requests sent to the
/// backend.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether records with the soft-delete capability carry `__soft_deleted`,
    /// and whether searches filter on it.
    pub soft_delete: bool,

    /// Maximum number of operations allowed in a single bulk request.
    ///
    /// `None` (the default) sends every batch as one request, whatever its size.
    pub max_batch_size: Option<usize>,

    /// Number of keys deleted per bulk request by `flush`.
    pub flush_chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            soft_delete: false,
            max_batch_size: None,
            flush_chunk_size: DEFAULT_FLUSH_CHUNK_SIZE,
        }
    }
}

impl EngineConfig {
    /// Enable or disable soft-delete support.
    pub fn with_soft_delete(mut self, enabled: bool) -> Self {
        self.soft_delete = enabled;
        self
    }

    /// Create a config with a custom batch size limit.
    ///
    /// # Arguments
    ///
    /// * `max_batch_size` - Maximum number of operations allowed in a single bulk request
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }

    /// Set the flush chunk size. Zero falls back to the default.
    pub fn with_flush_chunk_size(mut self, chunk_size: usize) -> Self {
        self.flush_chunk_size = if chunk_size == 0 {
            DEFAULT_FLUSH_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }
}

/// Connection parameters for the OpenSearch transport.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Hosts tried in rotation. Never empty.
    pub hosts: Vec<Url>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Extra attempts after a connection-level failure.
    pub retries: usize,
    /// Verify TLS certificates.
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl ConnectionConfig {
    /// Create a config for the given hosts with default settings.
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionConfig)` - If at least one host was given and all parse
    /// * `Err(SearchIndexError::ValidationError)` - Otherwise
    pub fn new<I, S>(hosts: I) -> Result<Self, SearchIndexError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|host| {
                Url::parse(host.as_ref().trim()).map_err(|e| {
                    SearchIndexError::validation(format!(
                        "Invalid OpenSearch host '{}': {}",
                        host.as_ref(),
                        e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if hosts.is_empty() {
            return Err(SearchIndexError::validation(
                "At least one OpenSearch host must be configured",
            ));
        }

        Ok(Self {
            hosts,
            username: None,
            password: None,
            retries: DEFAULT_RETRIES,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Use HTTP basic authentication.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_tls_verification(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Basic auth credentials, when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hosts: Vec<&str> = self.hosts.iter().map(Url::as_str).collect();
        f.debug_struct("ConnectionConfig")
            .field("hosts", &hosts)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("retries", &self.retries)
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert!(!config.soft_delete);
        assert_eq!(config.max_batch_size, None);
        assert_eq!(config.flush_chunk_size, 500);
    }

    #[test]
    fn test_flush_chunk_size_zero_falls_back() {
        let config = EngineConfig::default().with_flush_chunk_size(0);
        assert_eq!(config.flush_chunk_size, DEFAULT_FLUSH_CHUNK_SIZE);
    }

    #[test]
    fn test_connection_config_parses_hosts() {
        let config = ConnectionConfig::new(["http://a:9200", " https://b:9200 "]).unwrap();
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.hosts[1].scheme(), "https");
        assert_eq!(config.retries, DEFAULT_RETRIES);
        assert!(config.verify_tls);
    }

    #[test]
    fn test_connection_config_rejects_bad_input() {
        assert!(ConnectionConfig::new(Vec::<String>::new()).is_err());
        assert!(ConnectionConfig::new(["not a url"]).is_err());
    }

    #[test]
    fn test_credentials_and_debug() {
        let config = ConnectionConfig::new([DEFAULT_HOST])
            .unwrap()
            .with_basic_auth("admin", "secret");

        assert_eq!(config.credentials(), Some(("admin", "secret")));
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
