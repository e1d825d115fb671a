//! Record key types for the search index.
//!
//! This module defines the identifier used to address a record in the index
//! and to match search hits back to records in the authoritative store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The external identifier of a searchable record.
///
/// Keys are either integers (auto-increment primary keys) or strings (custom
/// keys, UUIDs). OpenSearch always reports `_id` as a string, so two keys are
/// considered the same document when their canonical string forms are equal;
/// see [`ScoutKey::same_document`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoutKey {
    /// Integer key.
    Int(i64),
    /// String key (custom keys, UUIDs).
    Str(String),
}

impl ScoutKey {
    /// Parse a hit `_id` into a key.
    ///
    /// Decimal integers become [`ScoutKey::Int`], anything else is kept as a string.
    ///
    /// # Example
    ///
    /// ```
    /// use scout_opensearch_shared::ScoutKey;
    ///
    /// assert_eq!(ScoutKey::parse("42"), ScoutKey::Int(42));
    /// assert_eq!(ScoutKey::parse("my-key.5"), ScoutKey::Str("my-key.5".to_string()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Self::Int(n),
            _ => Self::Str(raw.to_string()),
        }
    }

    /// Build a key from a JSON value, as found in `_id` or a document `id` field.
    ///
    /// Returns `None` for values that cannot identify a document (null, bool,
    /// floats, arrays, objects).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::parse(s)),
            Value::Number(n) => n.as_i64().map(Self::Int),
            _ => None,
        }
    }

    /// The canonical string form used as the document `_id`.
    pub fn as_document_id(&self) -> String {
        self.to_string()
    }

    /// Whether two keys address the same document.
    pub fn same_document(&self, other: &ScoutKey) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for ScoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ScoutKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ScoutKey {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ScoutKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Uuid> for ScoutKey {
    fn from(value: Uuid) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<ScoutKey> for Value {
    fn from(key: ScoutKey) -> Self {
        match key {
            ScoutKey::Int(n) => Value::from(n),
            ScoutKey::Str(s) => Value::String(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_integer_and_string() {
        assert_eq!(ScoutKey::parse("1"), ScoutKey::Int(1));
        assert_eq!(ScoutKey::parse("-7"), ScoutKey::Int(-7));
        assert_eq!(
            ScoutKey::parse("my-opensearch-key.5"),
            ScoutKey::Str("my-opensearch-key.5".to_string())
        );
    }

    #[test]
    fn test_parse_keeps_leading_zeros_as_string() {
        // "007" would not round-trip through an integer
        assert_eq!(ScoutKey::parse("007"), ScoutKey::Str("007".to_string()));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(ScoutKey::from_json(&json!(3)), Some(ScoutKey::Int(3)));
        assert_eq!(ScoutKey::from_json(&json!("3")), Some(ScoutKey::Int(3)));
        assert_eq!(ScoutKey::from_json(&json!(1.5)), None);
        assert_eq!(ScoutKey::from_json(&json!(null)), None);
    }

    #[test]
    fn test_same_document_across_representations() {
        let int_key = ScoutKey::Int(12);
        let str_key = ScoutKey::Str("12".to_string());

        assert!(int_key.same_document(&str_key));
        assert!(str_key.same_document(&int_key));
        assert!(!int_key.same_document(&ScoutKey::Int(13)));
    }

    #[test]
    fn test_uuid_key() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let key = ScoutKey::from(id);

        assert_eq!(key.as_document_id(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(ScoutKey::parse(&key.as_document_id()), key);
    }

    #[test]
    fn test_serialization_is_untagged() {
        assert_eq!(serde_json::to_value(ScoutKey::Int(1)).unwrap(), json!(1));
        assert_eq!(
            serde_json::to_value(ScoutKey::from("abc")).unwrap(),
            json!("abc")
        );
        let key: ScoutKey = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(key, ScoutKey::Str("abc".to_string()));
    }
}
