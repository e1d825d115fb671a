//! # Scout OpenSearch Repository
//!
//! This crate provides the engine that keeps OpenSearch indexes in sync with
//! searchable records and queries them. It includes definitions for errors,
//! interfaces, query translation, result mapping, and a concrete transport
//! for OpenSearch.

pub mod bulk;
pub mod config;
pub mod engine;
pub mod errors;
pub mod interfaces;
pub mod mapper;
pub mod opensearch;
pub mod types;

pub use config::{ConnectionConfig, EngineConfig};
pub use engine::ScoutEngine;
pub use errors::SearchIndexError;
pub use interfaces::{RecordStore, SearchTransport};
pub use mapper::LazyResults;
pub use opensearch::{IndexConfig, KeyType, OpenSearchTransport, KEY_FIELD};
pub use types::{
    BulkOperation, HttpMethod, IndexAdminRequest, Pagination, RawResults, SearchRequest,
    SortDirection, TrashedMode,
};
