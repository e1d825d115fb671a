//! Scout engine implementation.
//!
//! This module provides the engine that application code uses to keep search
//! indexes in sync with its records and to query them.
//!
//! # Note on Document Creation
//!
//! There is no separate `create` operation. `update` sends bulk `index`
//! operations, which create the document if it doesn't exist and replace it
//! if it does.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bulk;
use crate::config::EngineConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::{RecordStore, SearchTransport};
use crate::mapper::{self, LazyResults};
use crate::opensearch::queries::{build_search_body, build_search_options};
use crate::types::{BulkOperation, HttpMethod, IndexAdminRequest, Pagination, RawResults, SearchRequest};
use scout_opensearch_shared::{ScoutKey, Searchable};

/// The engine behind searchable records.
///
/// This is the high-level API that application code should use. It builds
/// bulk and search bodies and delegates to a `SearchTransport` for the actual
/// backend calls. All operations return `SearchIndexError` for consistent
/// error handling. The engine keeps no mutable state and can be shared
/// behind an `Arc`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use scout_opensearch_repository::{ConnectionConfig, OpenSearchTransport, ScoutEngine};
/// use scout_opensearch_repository::types::SearchRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConnectionConfig::new(["http://localhost:9200"])?;
/// let transport = Arc::new(OpenSearchTransport::new(config)?);
/// let engine = ScoutEngine::new(transport);
///
/// let request = SearchRequest::new("posts", "zonda").where_eq("published", true);
/// let results = engine.search(&request).await?;
/// println!("{} matching posts", engine.total_count(&results));
/// # Ok(())
/// # }
/// ```
pub struct ScoutEngine {
    transport: Arc<dyn SearchTransport>,
    config: EngineConfig,
}

impl ScoutEngine {
    /// Create a new ScoutEngine with default configuration.
    ///
    /// The default configuration has soft deletes disabled and no batch size limit.
    ///
    /// # Arguments
    ///
    /// * `transport` - An implementation of `SearchTransport` (e.g., `OpenSearchTransport`)
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self::with_config(transport, EngineConfig::default())
    }

    /// Create a new ScoutEngine with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `transport` - An implementation of `SearchTransport` (e.g., `OpenSearchTransport`)
    /// * `config` - Custom configuration for the engine
    pub fn with_config(transport: Arc<dyn SearchTransport>, config: EngineConfig) -> Self {
        info!(
            soft_delete = config.soft_delete,
            max_batch_size = ?config.max_batch_size,
            flush_chunk_size = config.flush_chunk_size,
            "Created Scout engine"
        );

        Self { transport, config }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A handle to the underlying transport.
    pub fn transport(&self) -> Arc<dyn SearchTransport> {
        Arc::clone(&self.transport)
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Index a batch of records, creating or replacing their documents.
    ///
    /// All documents go to the index of the first record, in input order, in a
    /// single bulk request. Records with an empty searchable array are skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the bulk request was accepted, or there was nothing to send
    /// * `Err(SearchIndexError::BatchSizeExceeded)` - If the batch exceeds the configured maximum
    /// * `Err(SearchIndexError)` - If the bulk request fails
    ///
    /// # Note
    ///
    /// Per-document failures inside an accepted bulk request are logged, not returned.
    pub async fn update<R: Searchable>(&self, records: &[R]) -> Result<(), SearchIndexError> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        let index = first.searchable_as();
        let operations = bulk::index_operations(&index, records, self.config.soft_delete);
        if operations.is_empty() {
            debug!(index = %index, skipped = records.len(), "No searchable documents to index");
            return Ok(());
        }

        self.validate_batch_size(operations.len())?;
        self.send_bulk(&index, operations).await
    }

    /// Remove a batch of records from their index.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the bulk request was accepted, or there was nothing to send
    /// * `Err(SearchIndexError::BatchSizeExceeded)` - If the batch exceeds the configured maximum
    /// * `Err(SearchIndexError)` - If the bulk request fails
    pub async fn delete<R: Searchable>(&self, records: &[R]) -> Result<(), SearchIndexError> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        let index = first.searchable_as();
        let operations = bulk::delete_operations(records);

        self.validate_batch_size(operations.len())?;
        self.send_bulk(&index, operations).await
    }

    /// Remove every document of a record type from `index`.
    ///
    /// Keys come from the store and are deleted in chunks of `flush_chunk_size`
    /// (capped by `max_batch_size`).
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of delete operations sent
    /// * `Err(SearchIndexError)` - If the store or a bulk request fails
    pub async fn flush<S>(&self, store: &S, index: &str) -> Result<usize, SearchIndexError>
    where
        S: RecordStore + ?Sized,
    {
        let chunk_size = match self.config.max_batch_size {
            Some(max) => self.config.flush_chunk_size.min(max).max(1),
            None => self.config.flush_chunk_size.max(1),
        };

        let mut keys = store.all_keys();
        let mut chunk: Vec<ScoutKey> = Vec::with_capacity(chunk_size);
        let mut flushed = 0;

        while let Some(key) = keys.next().await {
            chunk.push(key?);
            if chunk.len() == chunk_size {
                flushed += chunk.len();
                let operations = bulk::delete_key_operations(index, std::mem::take(&mut chunk));
                self.send_bulk(index, operations).await?;
            }
        }

        if !chunk.is_empty() {
            flushed += chunk.len();
            self.send_bulk(index, bulk::delete_key_operations(index, chunk)).await?;
        }

        info!(index = %index, flushed, "Flushed index");
        Ok(flushed)
    }

    async fn send_bulk(
        &self,
        index: &str,
        operations: Vec<BulkOperation>,
    ) -> Result<(), SearchIndexError> {
        let count = operations.len();
        let ack = self.transport.bulk(index, operations).await?;

        if ack.get("errors").and_then(Value::as_bool).unwrap_or(false) {
            warn!(index = %index, operations = count, "Bulk request reported item failures");
        } else {
            debug!(index = %index, operations = count, "Bulk request completed");
        }

        Ok(())
    }

    /// Run a search request.
    ///
    /// The request's limit, when set, becomes the `size` of the search. A raw
    /// query callback replaces body construction and its output is returned as-is.
    pub async fn search(&self, request: &SearchRequest) -> Result<RawResults, SearchIndexError> {
        self.perform_search(request, None).await
    }

    /// Run a search request for one page of results.
    ///
    /// Pages are 1-based; page `0` is treated as the first page.
    pub async fn paginate(
        &self,
        request: &SearchRequest,
        per_page: usize,
        page: usize,
    ) -> Result<RawResults, SearchIndexError> {
        self.perform_search(request, Some(Pagination::new(per_page, page)))
            .await
    }

    async fn perform_search(
        &self,
        request: &SearchRequest,
        page: Option<Pagination>,
    ) -> Result<RawResults, SearchIndexError> {
        if let Some(callback) = &request.callback {
            debug!(index = %request.index, "Running raw query callback");
            let options = build_search_options(request, page);
            let raw = callback(self.transport(), request.query.clone(), options).await?;
            return Ok(RawResults::new(Some(raw)));
        }

        let body = build_search_body(request, page, self.config.soft_delete);
        debug!(index = %request.index, query = %request.query, "Running search");

        let raw = self.transport.search(&request.index, body).await?;
        Ok(RawResults::new(raw))
    }

    /// Hit ids of a search result, in relevance order.
    pub fn map_ids(&self, results: &RawResults) -> Vec<ScoutKey> {
        mapper::map_ids(results)
    }

    /// Total number of matching documents. Zero for empty or absent results.
    pub fn total_count(&self, results: &RawResults) -> u64 {
        mapper::total_count(results)
    }

    /// Load the records behind a search result, in relevance order.
    ///
    /// Ids the store no longer knows are dropped.
    pub async fn map<S>(
        &self,
        results: &RawResults,
        store: &S,
    ) -> Result<Vec<S::Record>, SearchIndexError>
    where
        S: RecordStore + ?Sized,
    {
        mapper::map_records(results, store).await
    }

    /// Lazily load the records behind a search result.
    pub fn lazy_map<'a, S>(&self, results: &RawResults, store: &'a S) -> LazyResults<'a, S>
    where
        S: RecordStore + ?Sized,
    {
        mapper::lazy_map_records(results, store)
    }

    /// Create an index.
    ///
    /// `options` is the index body (settings, mappings, aliases) and is sent as-is.
    /// Returns the backend acknowledgment. An existing index is an error.
    pub async fn create_index(&self, name: &str, options: Value) -> Result<Value, SearchIndexError> {
        self.admin(IndexAdminRequest::Create {
            name: name.to_string(),
            options,
        })
        .await
    }

    /// Delete an index. Returns the backend acknowledgment. A missing index is an error.
    pub async fn delete_index(&self, name: &str) -> Result<Value, SearchIndexError> {
        self.admin(IndexAdminRequest::Delete {
            name: name.to_string(),
        })
        .await
    }

    /// Run an administrative index request.
    pub async fn admin(&self, request: IndexAdminRequest) -> Result<Value, SearchIndexError> {
        if request.name().trim().is_empty() {
            return Err(SearchIndexError::validation("Index name is required"));
        }

        match request {
            IndexAdminRequest::Create { name, options } => {
                let ack = self.transport.create_index(&name, options).await?;
                info!(index = %name, "Index created");
                Ok(ack)
            }
            IndexAdminRequest::Delete { name } => {
                let ack = self.transport.delete_index(&name).await?;
                info!(index = %name, "Index deleted");
                Ok(ack)
            }
        }
    }

    /// Send an arbitrary request to the backend.
    ///
    /// Unchecked: the path and body are forwarded without validation.
    pub async fn invoke(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SearchIndexError> {
        debug!(method = ?method, path = %path, "Invoking raw request");
        self.transport.invoke(method, path, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};
    use serde_json::{json, Map};
    use tokio::sync::Mutex;

    /// Mock transport for testing
    #[derive(Default)]
    struct MockTransport {
        searches: Arc<Mutex<Vec<(String, Value)>>>,
        bulks: Arc<Mutex<Vec<(String, Vec<BulkOperation>)>>>,
        admin: Arc<Mutex<Vec<String>>>,
        search_response: Option<Value>,
        bulk_response: Option<Value>,
        should_fail: bool,
    }

    #[async_trait]
    impl SearchTransport for MockTransport {
        async fn search(&self, index: &str, body: Value) -> Result<Option<Value>, SearchIndexError> {
            if self.should_fail {
                return Err(SearchIndexError::connection("Mock failure"));
            }
            self.searches.lock().await.push((index.to_string(), body));
            Ok(self.search_response.clone())
        }

        async fn bulk(
            &self,
            index: &str,
            operations: Vec<BulkOperation>,
        ) -> Result<Value, SearchIndexError> {
            if self.should_fail {
                return Err(SearchIndexError::bulk("Mock failure"));
            }
            self.bulks.lock().await.push((index.to_string(), operations));
            Ok(self
                .bulk_response
                .clone()
                .unwrap_or_else(|| json!({ "errors": false, "items": [] })))
        }

        async fn create_index(&self, name: &str, _options: Value) -> Result<Value, SearchIndexError> {
            if self.should_fail {
                return Err(SearchIndexError::index_creation("400: resource_already_exists"));
            }
            self.admin.lock().await.push(format!("create:{}", name));
            Ok(json!({ "acknowledged": true, "index": name }))
        }

        async fn delete_index(&self, name: &str) -> Result<Value, SearchIndexError> {
            if self.should_fail {
                return Err(SearchIndexError::index_deletion("404: index_not_found"));
            }
            self.admin.lock().await.push(format!("delete:{}", name));
            Ok(json!({ "acknowledged": true }))
        }

        async fn invoke(
            &self,
            method: HttpMethod,
            path: &str,
            _body: Option<Value>,
        ) -> Result<Value, SearchIndexError> {
            self.admin.lock().await.push(format!("{:?}:{}", method, path));
            Ok(json!({ "status": "green" }))
        }
    }

    #[derive(Debug, Clone)]
    struct Post {
        id: i64,
        title: String,
    }

    impl Searchable for Post {
        fn searchable_as(&self) -> String {
            "posts".to_string()
        }

        fn scout_key(&self) -> ScoutKey {
            ScoutKey::Int(self.id)
        }

        fn to_searchable_array(&self) -> Map<String, Value> {
            let mut fields = Map::new();
            if !self.title.is_empty() {
                fields.insert("title".to_string(), json!(self.title));
            }
            fields
        }
    }

    struct KeyStore {
        keys: Vec<i64>,
    }

    #[async_trait]
    impl RecordStore for KeyStore {
        type Record = Post;

        async fn fetch_by_ids(&self, ids: &[ScoutKey]) -> Result<Vec<Post>, SearchIndexError> {
            Ok(self
                .keys
                .iter()
                .filter(|key| ids.iter().any(|id| id.same_document(&ScoutKey::Int(**key))))
                .map(|&id| Post {
                    id,
                    title: format!("post {}", id),
                })
                .collect())
        }

        fn stream_by_ids(
            &self,
            _ids: Vec<ScoutKey>,
        ) -> BoxStream<'_, Result<Post, SearchIndexError>> {
            stream::empty().boxed()
        }

        fn all_keys(&self) -> BoxStream<'_, Result<ScoutKey, SearchIndexError>> {
            stream::iter(self.keys.iter().map(|&key| Ok(ScoutKey::Int(key)))).boxed()
        }
    }

    fn post(id: i64, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
        }
    }

    fn engine(transport: MockTransport) -> (ScoutEngine, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        (ScoutEngine::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_update_sends_one_bulk_request() {
        let (engine, transport) = engine(MockTransport::default());

        engine
            .update(&[post(1, "a"), post(2, "b")])
            .await
            .unwrap();

        let bulks = transport.bulks.lock().await;
        assert_eq!(bulks.len(), 1);
        assert_eq!(bulks[0].0, "posts");
        assert_eq!(bulks[0].1.len(), 2);
        assert_eq!(
            bulks[0].1[0].to_lines(),
            vec![
                json!({ "index": { "_index": "posts", "_id": 1 } }),
                json!({ "id": 1, "title": "a" })
            ]
        );
    }

    #[tokio::test]
    async fn test_update_empty_batch_makes_no_call() {
        let (engine, transport) = engine(MockTransport::default());

        engine.update::<Post>(&[]).await.unwrap();
        engine.update(&[post(1, "")]).await.unwrap();

        assert!(transport.bulks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_batch_size_exceeded() {
        let transport = Arc::new(MockTransport::default());
        let engine = ScoutEngine::with_config(
            transport.clone(),
            EngineConfig::default().with_max_batch_size(1),
        );

        let result = engine.update(&[post(1, "a"), post(2, "b")]).await;

        assert!(matches!(
            result,
            Err(SearchIndexError::BatchSizeExceeded { provided: 2, max: 1 })
        ));
        assert!(transport.bulks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_tolerates_item_failures() {
        let (engine, _) = engine(MockTransport {
            bulk_response: Some(json!({ "errors": true, "items": [] })),
            ..Default::default()
        });

        assert!(engine.update(&[post(1, "a")]).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_propagates_failure() {
        let (engine, _) = engine(MockTransport {
            should_fail: true,
            ..Default::default()
        });

        let err = engine.update(&[post(1, "a")]).await.unwrap_err();
        assert!(matches!(err, SearchIndexError::BulkError(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let (engine, transport) = engine(MockTransport::default());

        engine.delete::<Post>(&[]).await.unwrap();
        engine.delete(&[post(5, ""), post(6, "x")]).await.unwrap();

        let bulks = transport.bulks.lock().await;
        assert_eq!(bulks.len(), 1);
        assert_eq!(
            bulks[0].1,
            vec![
                BulkOperation::Delete {
                    index: "posts".to_string(),
                    id: ScoutKey::Int(5)
                },
                BulkOperation::Delete {
                    index: "posts".to_string(),
                    id: ScoutKey::Int(6)
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_flush_chunks_keys() {
        let transport = Arc::new(MockTransport::default());
        let engine = ScoutEngine::with_config(
            transport.clone(),
            EngineConfig::default().with_flush_chunk_size(2),
        );
        let store = KeyStore {
            keys: vec![1, 2, 3, 4, 5],
        };

        let flushed = engine.flush(&store, "posts").await.unwrap();

        assert_eq!(flushed, 5);
        let bulks = transport.bulks.lock().await;
        let sizes: Vec<usize> = bulks.iter().map(|(_, ops)| ops.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_flush_empty_store() {
        let (engine, transport) = engine(MockTransport::default());

        let flushed = engine.flush(&KeyStore { keys: vec![] }, "posts").await.unwrap();

        assert_eq!(flushed, 0);
        assert!(transport.bulks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_search_builds_body() {
        let (engine, transport) = engine(MockTransport::default());
        let request = SearchRequest::new("table", "zonda").where_eq("foo", 1);

        let results = engine.search(&request).await.unwrap();

        assert_eq!(results, RawResults::none());
        assert_eq!(engine.total_count(&results), 0);
        let searches = transport.searches.lock().await;
        assert_eq!(searches[0].0, "table");
        assert_eq!(
            searches[0].1["query"]["bool"]["must"][0],
            json!({ "query_string": { "query": "zonda" } })
        );
    }

    #[tokio::test]
    async fn test_paginate_sets_window() {
        let (engine, transport) = engine(MockTransport::default());
        let request = SearchRequest::new("table", "zonda");

        engine.paginate(&request, 15, 3).await.unwrap();

        let searches = transport.searches.lock().await;
        assert_eq!(searches[0].1["from"], 30);
        assert_eq!(searches[0].1["size"], 15);
    }

    #[tokio::test]
    async fn test_soft_delete_config_reaches_query() {
        let transport = Arc::new(MockTransport::default());
        let engine = ScoutEngine::with_config(
            transport.clone(),
            EngineConfig::default().with_soft_delete(true),
        );

        engine
            .search(&SearchRequest::new("table", "zonda"))
            .await
            .unwrap();

        let searches = transport.searches.lock().await;
        assert_eq!(
            searches[0].1["query"]["bool"]["filter"][0],
            json!({ "term": { "__soft_deleted": 0 } })
        );
    }

    #[tokio::test]
    async fn test_raw_query_callback_replaces_search() {
        let (engine, transport) = engine(MockTransport::default());
        let request = SearchRequest::new("table", "zonda").with_raw_query(
            |_transport, query, options| async move {
                Ok(json!({ "query": query, "options": options }))
            },
        );

        let results = engine.paginate(&request, 10, 2).await.unwrap();

        assert_eq!(
            results.as_value(),
            Some(&json!({
                "query": "zonda",
                "options": { "index": "table", "from": 10, "size": 10 }
            }))
        );
        assert!(transport.searches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_search_and_map() {
        let (engine, _) = engine(MockTransport {
            search_response: Some(json!({
                "hits": {
                    "total": { "value": 3 },
                    "hits": [{ "_id": "3" }, { "_id": "9" }, { "_id": "1" }]
                }
            })),
            ..Default::default()
        });
        let store = KeyStore { keys: vec![1, 2, 3] };

        let results = engine
            .search(&SearchRequest::new("posts", "post"))
            .await
            .unwrap();
        let records = engine.map(&results, &store).await.unwrap();

        let ids: Vec<i64> = records.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(engine.total_count(&results), 3);
        assert_eq!(engine.map_ids(&results).len(), 3);
    }

    #[tokio::test]
    async fn test_index_admin() {
        let (engine, transport) = engine(MockTransport::default());

        let ack = engine.create_index("posts", json!({})).await.unwrap();
        assert_eq!(ack["acknowledged"], true);
        engine.delete_index("posts").await.unwrap();

        assert_eq!(
            *transport.admin.lock().await,
            vec!["create:posts".to_string(), "delete:posts".to_string()]
        );
    }

    #[tokio::test]
    async fn test_index_admin_errors() {
        let (engine, _) = engine(MockTransport {
            should_fail: true,
            ..Default::default()
        });

        assert!(matches!(
            engine.create_index("posts", json!({})).await,
            Err(SearchIndexError::IndexCreationError(_))
        ));
        assert!(matches!(
            engine.delete_index("posts").await,
            Err(SearchIndexError::IndexDeletionError(_))
        ));
        assert!(matches!(
            engine.delete_index(" ").await,
            Err(SearchIndexError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_invoke_passes_through() {
        let (engine, transport) = engine(MockTransport::default());

        let response = engine
            .invoke(HttpMethod::Get, "_cluster/health", None)
            .await
            .unwrap();

        assert_eq!(response["status"], "green");
        assert_eq!(transport.admin.lock().await[0], "Get:_cluster/health");
    }
}
