//! Search index error types.
//!
//! This module defines the unified error type for all engine operations,
//! including transport failures, administrative failures and record store failures.

use thiserror::Error;

/// Unified errors from engine operations.
///
/// Used by the `SearchTransport` and `RecordStore` traits and by `ScoutEngine`.
/// Transport and administrative failures are propagated to the caller as-is;
/// the engine never retries them. Malformed or absent search bodies are not
/// errors: they map to an empty result.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., invalid configuration, batch limits).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Search request was rejected by the backend.
    #[error("Search error: {0}")]
    SearchError(String),

    /// Bulk request was rejected by the backend.
    #[error("Bulk error: {0}")]
    BulkError(String),

    /// Failed to create an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to delete an index.
    #[error("Index deletion error: {0}")]
    IndexDeletionError(String),

    /// A raw request sent through the escape hatch failed.
    #[error("Request error: {0}")]
    RequestError(String),

    /// Failed to parse a response body from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The authoritative record store failed.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a search error.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::SearchError(msg.into())
    }

    /// Create a bulk error.
    pub fn bulk(msg: impl Into<String>) -> Self {
        Self::BulkError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an index deletion error.
    pub fn index_deletion(msg: impl Into<String>) -> Self {
        Self::IndexDeletionError(msg.into())
    }

    /// Create a raw request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a record store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Returns true for failures that never reached the backend.
    ///
    /// Only these are eligible for the transport's host failover.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}
