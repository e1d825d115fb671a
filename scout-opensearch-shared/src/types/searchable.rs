//! Searchable record contract.
//!
//! This module defines the traits a domain record implements to be indexed by
//! the engine, and the soft-delete capability it may optionally declare.

use serde_json::{Map, Value};

use crate::types::scout_key::ScoutKey;

/// Document field carrying the soft-delete flag (`0` live, `1` trashed).
pub const SOFT_DELETED_FIELD: &str = "__soft_deleted";

/// Capability interface for records that support soft deletion.
///
/// Records declare this capability through [`Searchable::soft_deletes`].
pub trait SoftDeletes {
    /// Whether the record is currently soft-deleted.
    fn is_trashed(&self) -> bool;
}

/// A domain record that can be written to and re-hydrated from the search index.
///
/// # Example
///
/// ```
/// use scout_opensearch_shared::{ScoutKey, Searchable};
/// use serde_json::{json, Map, Value};
///
/// struct Post {
///     id: i64,
///     title: String,
/// }
///
/// impl Searchable for Post {
///     fn searchable_as(&self) -> String {
///         "posts".to_string()
///     }
///
///     fn scout_key(&self) -> ScoutKey {
///         ScoutKey::Int(self.id)
///     }
///
///     fn to_searchable_array(&self) -> Map<String, Value> {
///         let mut fields = Map::new();
///         fields.insert("title".to_string(), json!(self.title));
///         fields
///     }
/// }
/// ```
pub trait Searchable {
    /// Name of the index the record is stored in.
    fn searchable_as(&self) -> String;

    /// Key under which the record is indexed.
    fn scout_key(&self) -> ScoutKey;

    /// Field map sent to the index. An empty map means "nothing to index".
    fn to_searchable_array(&self) -> Map<String, Value>;

    /// Extra metadata merged into the document after the searchable fields.
    fn scout_metadata(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Soft-delete capability, if the record supports it.
    fn soft_deletes(&self) -> Option<&dyn SoftDeletes> {
        None
    }
}
