//! OpenSearch transport implementation.
//!
//! This module provides the concrete implementation of `SearchTransport`
//! using the OpenSearch Rust crate.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::{IndicesCreateParts, IndicesDeleteParts},
    BulkParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::ConnectionConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchTransport;
use crate::types::{BulkOperation, HttpMethod};

/// OpenSearch transport implementation.
///
/// Holds one client per configured host. A request that fails before any
/// response arrives (connection refused, timeout) is retried on the next host,
/// up to `retries` extra attempts. Responses with an error status are never retried.
///
/// # Example
///
/// ```ignore
/// use scout_opensearch_repository::{ConnectionConfig, OpenSearchTransport};
///
/// let config = ConnectionConfig::new(["http://node-1:9200", "http://node-2:9200"])?
///     .with_basic_auth("admin", "admin")
///     .with_retries(3);
/// let transport = OpenSearchTransport::new(config)?;
/// ```
pub struct OpenSearchTransport {
    clients: Vec<OpenSearch>,
    hosts: Vec<Url>,
    retries: usize,
    cursor: AtomicUsize,
}

impl OpenSearchTransport {
    /// Create a new OpenSearch transport.
    ///
    /// No request is sent; an unreachable cluster only shows up on first use.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchTransport)` - A new transport instance
    /// * `Err(SearchIndexError)` - If a client cannot be built
    pub fn new(config: ConnectionConfig) -> Result<Self, SearchIndexError> {
        if config.hosts.is_empty() {
            return Err(SearchIndexError::validation(
                "At least one OpenSearch host must be configured",
            ));
        }

        let clients = config
            .hosts
            .iter()
            .map(|host| Self::build_client(host, &config))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            hosts = ?config.hosts.iter().map(Url::as_str).collect::<Vec<_>>(),
            retries = config.retries,
            verify_tls = config.verify_tls,
            timeout_secs = config.timeout.as_secs(),
            "Created OpenSearch transport"
        );

        Ok(Self {
            clients,
            hosts: config.hosts,
            retries: config.retries,
            cursor: AtomicUsize::new(0),
        })
    }

    fn build_client(host: &Url, config: &ConnectionConfig) -> Result<OpenSearch, SearchIndexError> {
        let conn_pool = SingleNodeConnectionPool::new(host.clone());
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.timeout);

        if let Some((username, password)) = config.credentials() {
            builder = builder.auth(Credentials::Basic(
                username.to_string(),
                password.to_string(),
            ));
        }

        if !config.verify_tls {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        Ok(OpenSearch::new(transport))
    }

    /// Send a request, rotating to the next host after a connection-level failure.
    async fn send_with_failover<F, Fut>(
        &self,
        action: &str,
        send: F,
    ) -> Result<Response, SearchIndexError>
    where
        F: Fn(OpenSearch) -> Fut,
        Fut: Future<Output = Result<Response, opensearch::Error>>,
    {
        let attempts = self.retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let slot = self.cursor.load(Ordering::Relaxed) % self.clients.len();

            match send(self.clients[slot].clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        action,
                        host = %self.hosts[slot],
                        attempt,
                        attempts,
                        error = %e,
                        "OpenSearch request failed before a response"
                    );
                    self.cursor.fetch_add(1, Ordering::Relaxed);
                    last_error = e.to_string();
                }
            }
        }

        Err(SearchIndexError::connection(format!(
            "{} failed after {} attempts: {}",
            action, attempts, last_error
        )))
    }

    /// Read a response body, turning error statuses into errors.
    ///
    /// Returns `None` for an empty body.
    async fn read_body(
        response: Response,
        action: &str,
        to_error: fn(String) -> SearchIndexError,
    ) -> Result<Option<String>, SearchIndexError> {
        let status = response.status_code();
        let text = response
            .text()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        if !status.is_success() {
            error!(action, status = %status, body = %text, "OpenSearch request rejected");
            return Err(to_error(format!(
                "{} failed with status {}: {}",
                action, status, text
            )));
        }

        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }

    /// Read a JSON acknowledgment. An empty body reads as `null`.
    async fn read_json(
        response: Response,
        action: &str,
        to_error: fn(String) -> SearchIndexError,
    ) -> Result<Value, SearchIndexError> {
        match Self::read_body(response, action, to_error).await? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                SearchIndexError::parse(format!("Invalid {} response: {}", action, e))
            }),
            None => Ok(Value::Null),
        }
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::Get,
        HttpMethod::Post => Method::Post,
        HttpMethod::Put => Method::Put,
        HttpMethod::Delete => Method::Delete,
        HttpMethod::Head => Method::Head,
    }
}

/// Render bulk operations as NDJSON lines.
fn bulk_lines(operations: &[BulkOperation]) -> Vec<Value> {
    operations.iter().flat_map(BulkOperation::to_lines).collect()
}

#[async_trait]
impl SearchTransport for OpenSearchTransport {
    /// Execute a search body against an index.
    ///
    /// An empty or unparseable body is reported as `Ok(None)`, not as an error.
    async fn search(&self, index: &str, body: Value) -> Result<Option<Value>, SearchIndexError> {
        let response = self
            .send_with_failover("search", |client| {
                let body = body.clone();
                async move {
                    client
                        .search(SearchParts::Index(&[index]))
                        .body(body)
                        .send()
                        .await
                }
            })
            .await?;

        let Some(text) = Self::read_body(response, "search", SearchIndexError::SearchError).await?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                debug!(index = %index, "Search completed");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(index = %index, error = %e, "Discarding unparseable search response");
                Ok(None)
            }
        }
    }

    async fn bulk(
        &self,
        index: &str,
        operations: Vec<BulkOperation>,
    ) -> Result<Value, SearchIndexError> {
        if operations.is_empty() {
            return Err(SearchIndexError::validation("Bulk request has no operations"));
        }

        let lines = bulk_lines(&operations);
        let response = self
            .send_with_failover("bulk", |client| {
                let body: Vec<JsonBody<Value>> = lines.iter().cloned().map(JsonBody::from).collect();
                async move { client.bulk(BulkParts::Index(index)).body(body).send().await }
            })
            .await?;

        let ack = Self::read_json(response, "bulk", SearchIndexError::BulkError).await?;
        debug!(index = %index, operations = operations.len(), "Bulk request sent");
        Ok(ack)
    }

    async fn create_index(&self, name: &str, options: Value) -> Result<Value, SearchIndexError> {
        let response = self
            .send_with_failover("create index", |client| {
                let options = options.clone();
                async move {
                    client
                        .indices()
                        .create(IndicesCreateParts::Index(name))
                        .body(options)
                        .send()
                        .await
                }
            })
            .await?;

        Self::read_json(response, "create index", SearchIndexError::IndexCreationError).await
    }

    async fn delete_index(&self, name: &str) -> Result<Value, SearchIndexError> {
        let response = self
            .send_with_failover("delete index", |client| async move {
                client
                    .indices()
                    .delete(IndicesDeleteParts::Index(&[name]))
                    .send()
                    .await
            })
            .await?;

        Self::read_json(response, "delete index", SearchIndexError::IndexDeletionError).await
    }

    async fn invoke(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SearchIndexError> {
        let path = format!("/{}", path.trim_start_matches('/'));
        let response = self
            .send_with_failover("raw request", |client| {
                let body = body.clone().map(JsonBody::from);
                let path = path.clone();
                async move {
                    client
                        .send(
                            to_method(method),
                            &path,
                            HeaderMap::new(),
                            None::<&()>,
                            body,
                            None,
                        )
                        .await
                }
            })
            .await?;

        Self::read_json(response, "raw request", SearchIndexError::RequestError).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_opensearch_shared::ScoutKey;
    use serde_json::{json, Map};

    #[test]
    fn test_bulk_lines_interleave_headers_and_documents() {
        let mut document = Map::new();
        document.insert("id".to_string(), json!(1));

        let lines = bulk_lines(&[
            BulkOperation::Index {
                index: "table".to_string(),
                id: ScoutKey::Int(1),
                document,
            },
            BulkOperation::Delete {
                index: "table".to_string(),
                id: ScoutKey::from("my-opensearch-key.5"),
            },
        ]);

        assert_eq!(
            lines,
            vec![
                json!({ "index": { "_index": "table", "_id": 1 } }),
                json!({ "id": 1 }),
                json!({ "delete": { "_index": "table", "_id": "my-opensearch-key.5" } }),
            ]
        );
    }

    #[test]
    fn test_method_mapping() {
        assert!(matches!(to_method(HttpMethod::Get), Method::Get));
        assert!(matches!(to_method(HttpMethod::Head), Method::Head));
    }

    #[test]
    fn test_new_builds_one_client_per_host() {
        let config = ConnectionConfig::new(["http://localhost:9200", "http://localhost:9201"])
            .unwrap()
            .with_basic_auth("admin", "admin")
            .with_tls_verification(false);

        let transport = OpenSearchTransport::new(config).unwrap();
        assert_eq!(transport.clients.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_connection_error() {
        let config = ConnectionConfig::new(["http://127.0.0.1:1"])
            .unwrap()
            .with_retries(1)
            .with_timeout(std::time::Duration::from_secs(2));
        let transport = OpenSearchTransport::new(config).unwrap();

        let err = transport
            .search("table", json!({ "query": { "match_all": {} } }))
            .await
            .unwrap_err();

        assert!(err.is_connection());
        assert_eq!(transport.cursor.load(Ordering::Relaxed), 2);
    }
}
