//! Authoritative record store trait definition.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::SearchIndexError;
use scout_opensearch_shared::{ScoutKey, Searchable};

/// The system of record used to re-hydrate full records from search hits.
///
/// The engine never assumes anything about the order in which records come
/// back, nor that every requested key still exists: stale index entries are
/// expected and silently dropped by the result mapper.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The record type this store loads.
    type Record: Searchable + Send;

    /// Batch lookup of records by key. Missing keys are simply absent from the result.
    async fn fetch_by_ids(&self, ids: &[ScoutKey])
        -> Result<Vec<Self::Record>, SearchIndexError>;

    /// Cursor-style lookup of records by key, for large result sets.
    fn stream_by_ids(
        &self,
        ids: Vec<ScoutKey>,
    ) -> BoxStream<'_, Result<Self::Record, SearchIndexError>>;

    /// Every key of the record type, ordered by key. Used to flush an index.
    fn all_keys(&self) -> BoxStream<'_, Result<ScoutKey, SearchIndexError>>;
}
