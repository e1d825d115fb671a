//! # Scout OpenSearch Shared
//!
//! This crate defines the data structures and capability traits shared across the
//! Scout OpenSearch engine. It includes the record key type, the `Searchable`
//! contract implemented by indexed records, and the parsed search response.

pub mod types;

pub use types::scout_key::ScoutKey;
pub use types::search_result::{SearchHit, SearchResponse};
pub use types::searchable::{Searchable, SoftDeletes, SOFT_DELETED_FIELD};
