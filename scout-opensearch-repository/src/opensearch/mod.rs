//! OpenSearch implementation of the search transport.
//!
//! This module provides the query builders, index settings and a concrete
//! implementation of `SearchTransport` using OpenSearch as the backend.

mod index_config;
pub mod queries;
mod transport;

pub use index_config::{IndexConfig, KeyType, KEY_FIELD};
pub use transport::OpenSearchTransport;
