//! Search result types for the engine.
//!
//! This module defines the response structures parsed from raw search bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::scout_key::ScoutKey;

/// A single matched document reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// The document key (`_id`).
    pub id: ScoutKey,

    /// Relevance score from the search engine, absent when sorting by field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Zero-based position in the response.
    pub position: usize,
}

/// Parsed search response with hits in relevance order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// The matched documents, ordered as returned by the engine.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents.
    /// May be greater than the number of returned hits due to pagination.
    pub total: u64,

    /// Time taken to execute the search in milliseconds.
    pub took_ms: u64,
}

impl SearchResponse {
    /// Create an empty search response.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            took_ms: 0,
        }
    }

    /// Parse a raw OpenSearch response body.
    ///
    /// Returns `None` when the body does not look like a search response
    /// (missing `hits.hits` array). Accepts both `hits.total.value` and the
    /// legacy numeric `hits.total`. Hits without a usable `_id` (or `_source.id`)
    /// are skipped; positions are assigned after skipping.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let hits_section = raw.get("hits")?;
        let raw_hits = hits_section.get("hits")?.as_array()?;

        let hits: Vec<SearchHit> = raw_hits
            .iter()
            .filter_map(|hit| {
                let id = hit
                    .get("_id")
                    .and_then(ScoutKey::from_json)
                    .or_else(|| {
                        hit.get("_source")
                            .and_then(|source| source.get("id"))
                            .and_then(ScoutKey::from_json)
                    })?;
                let score = hit.get("_score").and_then(Value::as_f64);
                Some((id, score))
            })
            .enumerate()
            .map(|(position, (id, score))| SearchHit {
                id,
                score,
                position,
            })
            .collect();

        let total = match hits_section.get("total") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::Object(obj)) => obj.get("value").and_then(Value::as_u64).unwrap_or(0),
            _ => hits.len() as u64,
        };

        let took_ms = raw.get("took").and_then(Value::as_u64).unwrap_or(0);

        Some(Self {
            hits,
            total,
            took_ms,
        })
    }

    /// The hit keys in response order.
    pub fn ids(&self) -> Vec<ScoutKey> {
        self.hits.iter().map(|hit| hit.id.clone()).collect()
    }

    /// Returns true if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits in this response.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_empty() {
        let response = SearchResponse::empty();
        assert!(response.is_empty());
        assert_eq!(response.len(), 0);
        assert_eq!(response.total, 0);
    }

    #[test]
    fn test_from_raw_preserves_order() {
        let raw = json!({
            "took": 4,
            "hits": {
                "total": { "value": 10, "relation": "eq" },
                "hits": [
                    { "_id": "1", "_score": 3.0 },
                    { "_id": "2", "_score": 2.0 },
                    { "_id": "4", "_score": 1.5 },
                    { "_id": "3", "_score": 1.0 }
                ]
            }
        });

        let response = SearchResponse::from_raw(&raw).unwrap();

        assert_eq!(
            response.ids(),
            vec![
                ScoutKey::Int(1),
                ScoutKey::Int(2),
                ScoutKey::Int(4),
                ScoutKey::Int(3)
            ]
        );
        assert_eq!(response.total, 10);
        assert_eq!(response.took_ms, 4);
        assert_eq!(response.hits[2].position, 2);
        assert_eq!(response.hits[0].score, Some(3.0));
    }

    #[test]
    fn test_from_raw_legacy_total() {
        let raw = json!({
            "hits": {
                "total": 2,
                "hits": [
                    { "_id": "my-opensearch-key.1", "_score": null },
                    { "_id": "my-opensearch-key.2", "_score": null }
                ]
            }
        });

        let response = SearchResponse::from_raw(&raw).unwrap();

        assert_eq!(response.total, 2);
        assert_eq!(response.hits[0].score, None);
        assert_eq!(
            response.hits[1].id,
            ScoutKey::Str("my-opensearch-key.2".to_string())
        );
    }

    #[test]
    fn test_from_raw_skips_hits_without_id() {
        let raw = json!({
            "hits": {
                "hits": [
                    { "_score": 1.0 },
                    { "_source": { "id": 7 } },
                    { "_id": "8" }
                ]
            }
        });

        let response = SearchResponse::from_raw(&raw).unwrap();

        assert_eq!(response.ids(), vec![ScoutKey::Int(7), ScoutKey::Int(8)]);
        assert_eq!(response.hits[1].position, 1);
        assert_eq!(response.total, 2);
    }

    #[test]
    fn test_from_raw_malformed() {
        assert!(SearchResponse::from_raw(&json!(null)).is_none());
        assert!(SearchResponse::from_raw(&json!({ "result": [] })).is_none());
        assert!(SearchResponse::from_raw(&json!({ "hits": { "hits": "nope" } })).is_none());
    }
}
