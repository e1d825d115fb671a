//! Bulk request composition.
//!
//! Turns searchable records into `BulkOperation`s. Nothing here talks to the
//! backend; `ScoutEngine` sends what these functions build.

use serde_json::{json, Map, Value};

use crate::opensearch::KEY_FIELD;
use crate::types::BulkOperation;
use scout_opensearch_shared::{ScoutKey, Searchable, SOFT_DELETED_FIELD};

/// Compose the canonical document for a record.
///
/// The document is `{"id": key, ...fields, ...metadata}`. The `id` entry comes
/// first and always equals the scout key, even when the searchable array has
/// its own `id`. Returns `None` when the searchable array is empty.
pub fn compose_document<R: Searchable + ?Sized>(
    record: &R,
    soft_delete: bool,
) -> Option<Map<String, Value>> {
    let fields = record.to_searchable_array();
    if fields.is_empty() {
        return None;
    }

    let mut document = Map::with_capacity(fields.len() + 1);
    document.insert(KEY_FIELD.to_string(), Value::from(record.scout_key()));

    for (field, value) in fields {
        if field != KEY_FIELD {
            document.insert(field, value);
        }
    }

    for (field, value) in record.scout_metadata() {
        document.insert(field, value);
    }

    if soft_delete {
        if let Some(capability) = record.soft_deletes() {
            let flag = if capability.is_trashed() { 1 } else { 0 };
            document.insert(SOFT_DELETED_FIELD.to_string(), json!(flag));
        }
    }

    Some(document)
}

/// Build the upsert operations for a batch, in input order.
///
/// Every operation targets `index`. Records with an empty searchable array are skipped.
pub fn index_operations<R: Searchable>(
    index: &str,
    records: &[R],
    soft_delete: bool,
) -> Vec<BulkOperation> {
    records
        .iter()
        .filter_map(|record| {
            compose_document(record, soft_delete).map(|document| BulkOperation::Index {
                index: index.to_string(),
                id: record.scout_key(),
                document,
            })
        })
        .collect()
}

/// Build one delete operation per record key.
pub fn delete_operations<R: Searchable>(records: &[R]) -> Vec<BulkOperation> {
    records
        .iter()
        .map(|record| BulkOperation::Delete {
            index: record.searchable_as(),
            id: record.scout_key(),
        })
        .collect()
}

/// Build delete operations for raw keys against a single index.
pub fn delete_key_operations(index: &str, keys: Vec<ScoutKey>) -> Vec<BulkOperation> {
    keys.into_iter()
        .map(|id| BulkOperation::Delete {
            index: index.to_string(),
            id,
        })
        .collect()
}
