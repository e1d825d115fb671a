//! Search transport trait definition.
//!
//! This module defines the abstract interface for the search backend client,
//! allowing for different backend implementations (OpenSearch, mock, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{BulkOperation, HttpMethod};

/// Abstracts the HTTP client of the search backend.
///
/// Implementations are injected into `ScoutEngine` to enable dependency injection
/// and easy testing with mock implementations. The engine performs no retries of
/// its own: whatever retry and timeout policy exists lives in the implementation.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations. Non-success responses must be reported as errors
/// carrying the status and body returned by the backend.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Execute a search body against an index.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Value))` - The raw response body
    /// * `Ok(None)` - The backend answered with an empty body
    /// * `Err(SearchIndexError)` - If the request failed
    async fn search(&self, index: &str, body: Value) -> Result<Option<Value>, SearchIndexError>;

    /// Send a bulk request. Callers never pass an empty operation list.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The raw bulk acknowledgment, per-item errors included
    /// * `Err(SearchIndexError)` - If the request as a whole failed
    async fn bulk(
        &self,
        index: &str,
        operations: Vec<BulkOperation>,
    ) -> Result<Value, SearchIndexError>;

    /// Create an index with the given body.
    ///
    /// An already existing index is reported as an error, not smoothed over.
    async fn create_index(&self, name: &str, options: Value) -> Result<Value, SearchIndexError>;

    /// Delete an index.
    ///
    /// A missing index is reported as an error, not smoothed over.
    async fn delete_index(&self, name: &str) -> Result<Value, SearchIndexError>;

    /// Send an arbitrary request to the backend.
    ///
    /// This is an unchecked escape hatch for API calls the trait does not model.
    /// Nothing about the path or body is validated.
    async fn invoke(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SearchIndexError>;
}
