//! Error types for the Scout OpenSearch binary.

use scout_opensearch_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during startup or while running a command.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid command-line input.
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Error from the engine or the search backend.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an input error.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::InputError(msg.into())
    }
}
