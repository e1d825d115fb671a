//! OpenSearch query builders.
//!
//! This module translates a `SearchRequest` into an OpenSearch search body.
//!
//! The body handles:
//! - Free-text `query_string` matching across all indexed fields (`match_all` when blank)
//! - `term` filters for equality constraints and `terms` filters for set membership
//! - `must_not` exclusion for `where_not_in` constraints
//! - Soft-delete visibility when soft-delete support is enabled
//! - Explicit sort pairs, or a descending sort on the key column
//! - `from`/`size` pagination

use serde_json::{json, Map, Value};

use crate::types::{Pagination, SearchRequest, SortDirection, TrashedMode};
use super::index_config::KEY_FIELD;
use scout_opensearch_shared::SOFT_DELETED_FIELD;

/// Build an OpenSearch search body from a `SearchRequest`.
///
/// `page` takes precedence over the request's own limit. `soft_delete` enables
/// the `__soft_deleted` visibility filter derived from the request's trashed mode.
pub fn build_search_body(
    request: &SearchRequest,
    page: Option<Pagination>,
    soft_delete: bool,
) -> Value {
    let mut bool_query = Map::new();

    let filter = build_filter_clauses(request, soft_delete);
    if !filter.is_empty() {
        bool_query.insert("filter".to_string(), Value::Array(filter));
    }

    bool_query.insert(
        "must".to_string(),
        Value::Array(vec![build_text_query(&request.query)]),
    );

    let must_not = build_must_not_clauses(request);
    if !must_not.is_empty() {
        bool_query.insert("must_not".to_string(), Value::Array(must_not));
    }

    let mut body = Map::new();
    body.insert("query".to_string(), json!({ "bool": bool_query }));
    body.insert("sort".to_string(), Value::Array(build_sort(request)));
    insert_window(&mut body, request, page);

    Value::Object(body)
}

/// Build the options handed to a raw query callback.
///
/// Contains the target index and, when known, the `from`/`size` window.
pub fn build_search_options(request: &SearchRequest, page: Option<Pagination>) -> Value {
    let mut options = Map::new();
    options.insert("index".to_string(), json!(request.index));
    insert_window(&mut options, request, page);
    Value::Object(options)
}

fn insert_window(target: &mut Map<String, Value>, request: &SearchRequest, page: Option<Pagination>) {
    match page {
        Some(page) => {
            target.insert("from".to_string(), json!(page.offset()));
            target.insert("size".to_string(), json!(page.per_page));
        }
        None => {
            if let Some(limit) = request.limit {
                target.insert("size".to_string(), json!(limit));
            }
        }
    }
}

/// Build the free-text clause.
///
/// `query_string` rejects empty input, so a blank query matches everything.
fn build_text_query(query: &str) -> Value {
    if query.trim().is_empty() {
        return json!({ "match_all": {} });
    }

    json!({
        "query_string": {
            "query": query
        }
    })
}

/// Build the `filter` clauses: soft-delete visibility, then `term`, then `terms`.
///
/// An empty membership set still produces a `terms` clause, which matches nothing.
fn build_filter_clauses(request: &SearchRequest, soft_delete: bool) -> Vec<Value> {
    let mut clauses = Vec::with_capacity(request.wheres.len() + request.where_ins.len() + 1);

    if soft_delete {
        if let Some(clause) = build_soft_delete_clause(request.trashed) {
            clauses.push(clause);
        }
    }

    clauses.extend(
        request
            .wheres
            .iter()
            .map(|(column, value)| json!({ "term": { column.as_str(): value } })),
    );

    clauses.extend(
        request
            .where_ins
            .iter()
            .map(|(column, values)| json!({ "terms": { column.as_str(): values } })),
    );

    clauses
}

fn build_soft_delete_clause(trashed: TrashedMode) -> Option<Value> {
    match trashed {
        TrashedMode::Exclude => Some(json!({ "term": { SOFT_DELETED_FIELD: 0 } })),
        TrashedMode::Only => Some(json!({ "term": { SOFT_DELETED_FIELD: 1 } })),
        TrashedMode::With => None,
    }
}

/// Build the `must_not` clauses. Empty exclusion sets exclude nothing and are dropped.
fn build_must_not_clauses(request: &SearchRequest) -> Vec<Value> {
    request
        .where_not_ins
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(column, values)| json!({ "terms": { column.as_str(): values } }))
        .collect()
}

/// Build the sort list, defaulting to a descending sort on the key field.
fn build_sort(request: &SearchRequest) -> Vec<Value> {
    if request.orders.is_empty() {
        return vec![sort_clause(KEY_FIELD, SortDirection::Desc)];
    }

    request
        .orders
        .iter()
        .map(|order| sort_clause(&order.column, order.direction))
        .collect()
}

fn sort_clause(column: &str, direction: SortDirection) -> Value {
    json!({ column: { "order": direction.as_str() } })
}
