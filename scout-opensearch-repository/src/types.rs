//! Request and response types for engine operations.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchTransport;
use scout_opensearch_shared::{ScoutKey, SearchResponse};

/// Future returned by a raw query callback.
pub type RawQueryFuture = BoxFuture<'static, Result<Value, SearchIndexError>>;

/// Escape hatch replacing query construction entirely.
///
/// Receives the transport handle, the free-text query and the already
/// materialised options (`index`, and `from`/`size` when paginating). Its
/// output is handed back to the caller unchanged.
pub type RawQueryCallback =
    Arc<dyn Fn(Arc<dyn SearchTransport>, String, Value) -> RawQueryFuture + Send + Sync>;

/// Sort direction for an ordering clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The wire representation (`"asc"` / `"desc"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A single `(column, direction)` sort pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: String,
    pub direction: SortDirection,
}

/// How soft-deleted records are treated when soft-delete support is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashedMode {
    /// Only live records (`__soft_deleted = 0`).
    #[default]
    Exclude,
    /// Live and trashed records.
    With,
    /// Only trashed records (`__soft_deleted = 1`).
    Only,
}

/// Page request with 1-based page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: usize,
    pub page: usize,
}

impl Pagination {
    /// Create a page request. Page `0` is treated as the first page.
    pub fn new(per_page: usize, page: usize) -> Self {
        Self {
            per_page,
            page: page.max(1),
        }
    }

    /// Number of documents to skip: `per_page × (page − 1)`, saturating at `usize::MAX`.
    pub fn offset(&self) -> usize {
        self.per_page.saturating_mul(self.page - 1)
    }
}

/// An abstract search request.
///
/// Equality and membership filters use map semantics: adding a filter for a
/// column that already has one replaces the value while keeping its original
/// position.
///
/// # Example
///
/// ```
/// use scout_opensearch_repository::types::{SearchRequest, SortDirection};
///
/// let request = SearchRequest::new("posts", "zonda")
///     .where_eq("foo", 1)
///     .where_in("bar", vec![1, 2])
///     .order_by("created_at", SortDirection::Asc)
///     .take(20);
///
/// assert_eq!(request.wheres.len(), 1);
/// assert_eq!(request.limit, Some(20));
/// ```
#[derive(Clone)]
pub struct SearchRequest {
    /// Target index.
    pub index: String,
    /// Free-text query. Blank matches everything.
    pub query: String,
    /// Column → value equality filters, in insertion order.
    pub wheres: Vec<(String, Value)>,
    /// Column → allowed values, in insertion order.
    pub where_ins: Vec<(String, Vec<Value>)>,
    /// Column → excluded values, in insertion order.
    pub where_not_ins: Vec<(String, Vec<Value>)>,
    /// Explicit sort pairs. Empty means the default key sort.
    pub orders: Vec<SortOrder>,
    /// Maximum number of hits for a plain search.
    pub limit: Option<usize>,
    /// Soft-delete visibility.
    pub trashed: TrashedMode,
    /// Optional raw query override.
    pub callback: Option<RawQueryCallback>,
}

impl SearchRequest {
    /// Create a request against `index` for the free-text `query`.
    pub fn new(index: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: query.into(),
            wheres: Vec::new(),
            where_ins: Vec::new(),
            where_not_ins: Vec::new(),
            orders: Vec::new(),
            limit: None,
            trashed: TrashedMode::default(),
            callback: None,
        }
    }

    /// Add an equality filter.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        upsert_entry(&mut self.wheres, column.into(), value.into());
        self
    }

    /// Add a set-membership filter. An empty set matches nothing.
    pub fn where_in<V: Into<Value>>(mut self, column: impl Into<String>, values: Vec<V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        upsert_entry(&mut self.where_ins, column.into(), values);
        self
    }

    /// Add a set-exclusion filter. An empty set excludes nothing.
    pub fn where_not_in<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: Vec<V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        upsert_entry(&mut self.where_not_ins, column.into(), values);
        self
    }

    /// Append a sort pair.
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.orders.push(SortOrder {
            column: column.into(),
            direction,
        });
        self
    }

    /// Limit the number of hits returned by a plain search.
    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Include soft-deleted records.
    pub fn with_trashed(mut self) -> Self {
        self.trashed = TrashedMode::With;
        self
    }

    /// Only return soft-deleted records.
    pub fn only_trashed(mut self) -> Self {
        self.trashed = TrashedMode::Only;
        self
    }

    /// Replace query construction with a raw callback.
    ///
    /// The callback is unchecked: its body is sent as-is and its output is
    /// passed through without interpretation.
    pub fn with_raw_query<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(Arc<dyn SearchTransport>, String, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, SearchIndexError>> + Send + 'static,
    {
        let callback: RawQueryCallback = Arc::new(
            move |transport: Arc<dyn SearchTransport>, query: String, options: Value| -> RawQueryFuture {
                Box::pin(callback(transport, query, options))
            },
        );
        self.callback = Some(callback);
        self
    }
}

impl fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("index", &self.index)
            .field("query", &self.query)
            .field("wheres", &self.wheres)
            .field("where_ins", &self.where_ins)
            .field("where_not_ins", &self.where_not_ins)
            .field("orders", &self.orders)
            .field("limit", &self.limit)
            .field("trashed", &self.trashed)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

fn upsert_entry<V>(entries: &mut Vec<(String, V)>, column: String, value: V) {
    match entries.iter_mut().find(|(existing, _)| *existing == column) {
        Some(entry) => entry.1 = value,
        None => entries.push((column, value)),
    }
}

/// Raw search body as returned by the transport or a raw query callback.
///
/// The body is kept unchanged; [`RawResults::response`] parses it on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResults(Option<Value>);

impl RawResults {
    /// Wrap a raw body.
    pub fn new(body: Option<Value>) -> Self {
        Self(body)
    }

    /// No body at all.
    pub fn none() -> Self {
        Self(None)
    }

    /// Borrow the raw body.
    pub fn as_value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    /// Take the raw body.
    pub fn into_inner(self) -> Option<Value> {
        self.0
    }

    /// Parse the body. Absent or malformed bodies yield `None`.
    pub fn response(&self) -> Option<SearchResponse> {
        self.0.as_ref().and_then(SearchResponse::from_raw)
    }
}

/// A single operation in a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// Index (create or replace) a document.
    Index {
        index: String,
        id: ScoutKey,
        document: Map<String, Value>,
    },
    /// Delete a document.
    Delete { index: String, id: ScoutKey },
}

impl BulkOperation {
    /// Target index of the operation.
    pub fn index_name(&self) -> &str {
        match self {
            Self::Index { index, .. } | Self::Delete { index, .. } => index,
        }
    }

    /// Document key of the operation.
    pub fn id(&self) -> &ScoutKey {
        match self {
            Self::Index { id, .. } | Self::Delete { id, .. } => id,
        }
    }

    /// Render the bulk body lines: a header, followed by the document for index operations.
    pub fn to_lines(&self) -> Vec<Value> {
        match self {
            Self::Index {
                index,
                id,
                document,
            } => vec![
                json!({ "index": { "_index": index, "_id": Value::from(id.clone()) } }),
                Value::Object(document.clone()),
            ],
            Self::Delete { index, id } => {
                vec![json!({ "delete": { "_index": index, "_id": Value::from(id.clone()) } })]
            }
        }
    }
}

/// An administrative index request.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexAdminRequest {
    /// Create an index with the given body (settings, mappings, aliases).
    Create { name: String, options: Value },
    /// Delete an index.
    Delete { name: String },
}

impl IndexAdminRequest {
    /// Name of the target index.
    pub fn name(&self) -> &str {
        match self {
            Self::Create { name, .. } | Self::Delete { name } => name,
        }
    }
}

/// HTTP method for raw requests sent through [`SearchTransport::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}
