//! Error types for the Scout OpenSearch repository.
//!
//! This module provides a unified error type for all engine operations.

mod search_index_error;

pub use search_index_error::SearchIndexError;
