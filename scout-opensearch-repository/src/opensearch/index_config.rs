//! OpenSearch index configuration and mappings.
//!
//! This module builds the body used when creating an index for searchable records.

use serde_json::{json, Map, Value};

use scout_opensearch_shared::SOFT_DELETED_FIELD;

/// Document field holding the record key.
pub const KEY_FIELD: &str = "id";

/// Field type of the key column.
///
/// The default search sort is on the key, and OpenSearch cannot sort on
/// `text` fields, so the key is never left to dynamic mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    /// String keys (UUIDs, custom keys). Mapped as `keyword`.
    #[default]
    Keyword,
    /// Integer keys. Mapped as `long`.
    Long,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Long => "long",
        }
    }
}

/// Settings for a new search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Number of primary shards.
    pub shards: u32,
    /// Number of replicas per shard.
    pub replicas: u32,
    /// Map the `__soft_deleted` flag as an integer.
    pub soft_delete: bool,
    /// Mapping of the `id` field.
    pub key_type: KeyType,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            shards: 1,
            replicas: 1,
            soft_delete: false,
            key_type: KeyType::default(),
        }
    }
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `shards` - Number of primary shards
    /// * `replicas` - Number of replicas per shard
    pub fn new(shards: u32, replicas: u32) -> Self {
        Self {
            shards,
            replicas,
            ..Self::default()
        }
    }

    pub fn with_soft_delete(mut self, enabled: bool) -> Self {
        self.soft_delete = enabled;
        self
    }

    pub fn with_key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self
    }

    /// Get the index body (settings and mappings) for `create_index`.
    ///
    /// Record fields are left to dynamic mapping. The key is always mapped so
    /// the default key sort is valid. The soft-delete flag is mapped when
    /// enabled, so that filtering on it works before any trashed record has
    /// been indexed.
    pub fn to_options(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            KEY_FIELD.to_string(),
            json!({ "type": self.key_type.as_str() }),
        );
        if self.soft_delete {
            properties.insert(SOFT_DELETED_FIELD.to_string(), json!({ "type": "integer" }));
        }

        json!({
            "settings": {
                "number_of_shards": self.shards,
                "number_of_replicas": self.replicas
            },
            "mappings": {
                "properties": properties
            }
        })
    }
}
