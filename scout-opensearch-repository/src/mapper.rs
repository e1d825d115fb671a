//! Search result mapping.
//!
//! Re-hydrates search hits into full records loaded from a `RecordStore`,
//! keeping the relevance order of the hits. Records the store no longer has
//! are dropped, and each hit id yields at most one record.

use std::collections::{BTreeMap, HashMap, HashSet};

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::errors::SearchIndexError;
use crate::interfaces::RecordStore;
use crate::types::RawResults;
use scout_opensearch_shared::{ScoutKey, SearchResponse, Searchable};

/// Hit ids in response order. Absent or malformed bodies yield no ids.
pub fn map_ids(results: &RawResults) -> Vec<ScoutKey> {
    parse_or_empty(results).ids()
}

/// Total number of matching documents reported by the backend.
pub fn total_count(results: &RawResults) -> u64 {
    let response = parse_or_empty(results);
    if response.is_empty() {
        0
    } else {
        response.total
    }
}

fn parse_or_empty(results: &RawResults) -> SearchResponse {
    results.response().unwrap_or_else(SearchResponse::empty)
}

/// Load the records behind the hits with a single batch lookup.
///
/// An empty or absent response returns an empty list without touching the store.
pub async fn map_records<S>(
    results: &RawResults,
    store: &S,
) -> Result<Vec<S::Record>, SearchIndexError>
where
    S: RecordStore + ?Sized,
{
    let ids = unique_ids(map_ids(results));
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let records = store.fetch_by_ids(&ids).await?;
    Ok(order_by_hits(&ids, records))
}

/// Lazily load the records behind the hits.
pub fn lazy_map_records<'a, S>(results: &RawResults, store: &'a S) -> LazyResults<'a, S>
where
    S: RecordStore + ?Sized,
{
    LazyResults {
        store,
        ids: unique_ids(map_ids(results)),
        total: total_count(results),
    }
}

/// Sort `records` into hit order, dropping unknown keys and duplicates.
fn order_by_hits<R: Searchable>(ids: &[ScoutKey], records: Vec<R>) -> Vec<R> {
    let positions = hit_positions(ids);
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(ids.len()).collect();

    for record in records {
        if let Some(&position) = positions.get(&record.scout_key().as_document_id()) {
            let slot = &mut slots[position];
            if slot.is_none() {
                *slot = Some(record);
            }
        }
    }

    slots.into_iter().flatten().collect()
}

fn unique_ids(ids: Vec<ScoutKey>) -> Vec<ScoutKey> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter()
        .filter(|id| seen.insert(id.as_document_id()))
        .collect()
}

fn hit_positions(ids: &[ScoutKey]) -> HashMap<String, usize> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| (id.as_document_id(), position))
        .collect()
}

/// A restartable, lazily loaded result set.
///
/// Every call to [`LazyResults::stream`] queries the store again and yields
/// records in hit order as soon as they can be placed.
pub struct LazyResults<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    ids: Vec<ScoutKey>,
    total: u64,
}

impl<'a, S> LazyResults<'a, S>
where
    S: RecordStore + ?Sized,
    S::Record: 'a,
{
    /// Deduplicated hit ids in response order.
    pub fn ids(&self) -> &[ScoutKey] {
        &self.ids
    }

    /// Total number of matching documents reported by the backend.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Stream the records in hit order.
    ///
    /// The stream ends after the first store error.
    pub fn stream(&self) -> BoxStream<'a, Result<S::Record, SearchIndexError>> {
        if self.ids.is_empty() {
            return stream::empty().boxed();
        }

        let state = ReorderState {
            inner: self.store.stream_by_ids(self.ids.clone()),
            positions: hit_positions(&self.ids),
            pending: BTreeMap::new(),
            next: 0,
            exhausted: false,
            failed: false,
        };

        stream::unfold(state, |mut state| async move {
            let item = state.advance().await?;
            Some((item, state))
        })
        .boxed()
    }

    /// Drain a fresh stream into a vector.
    pub async fn collect(&self) -> Result<Vec<S::Record>, SearchIndexError> {
        self.stream().try_collect().await
    }
}

struct ReorderState<'a, R> {
    inner: BoxStream<'a, Result<R, SearchIndexError>>,
    positions: HashMap<String, usize>,
    pending: BTreeMap<usize, R>,
    next: usize,
    exhausted: bool,
    failed: bool,
}

impl<R: Searchable> ReorderState<'_, R> {
    async fn advance(&mut self) -> Option<Result<R, SearchIndexError>> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(record) = self.pending.remove(&self.next) {
                self.next += 1;
                return Some(Ok(record));
            }

            if self.exhausted {
                // Skip over hits the store did not return
                let (position, record) = self.pending.pop_first()?;
                self.next = position + 1;
                return Some(Ok(record));
            }

            match self.inner.next().await {
                Some(Ok(record)) => {
                    let key = record.scout_key().as_document_id();
                    if let Some(&position) = self.positions.get(&key) {
                        if position >= self.next {
                            self.pending.entry(position).or_insert(record);
                        }
                    }
                }
                Some(Err(err)) => {
                    self.failed = true;
                    self.pending.clear();
                    return Some(Err(err));
                }
                None => self.exhausted = true,
            }
        }
    }
}
