//! This module defines the core data structures and types used across the engine.
//! It re-exports specific types like `ScoutKey` and `SearchResponse`.

pub mod scout_key;
pub mod search_result;
pub mod searchable;

pub use scout_key::ScoutKey;
pub use search_result::{SearchHit, SearchResponse};
pub use searchable::{Searchable, SoftDeletes};
