//! Physical item model for the single-table store
//!
//! Every logical record (entity sub-record, suggestion edge, saved profile)
//! is one `StoreItem` addressed by a `(hash_key, range_key)` pair.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form attribute map carried by an item.
pub type Attributes = serde_json::Map<String, Value>;

/// Composite primary key of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub hash_key: String,
    pub range_key: String,
}

impl ItemKey {
    pub fn new(hash_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            hash_key: hash_key.into(),
            range_key: range_key.into(),
        }
    }
}

impl From<(String, String)> for ItemKey {
    fn from((hash_key, range_key): (String, String)) -> Self {
        Self {
            hash_key,
            range_key,
        }
    }
}

/// A raw item as stored in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    pub hash_key: String,
    pub range_key: String,
    /// Secondary-index partition; only profile sub-records carry it.
    #[serde(default)]
    pub gsi1pk: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl StoreItem {
    pub fn new(hash_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            hash_key: hash_key.into(),
            range_key: range_key.into(),
            gsi1pk: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_gsi1pk(mut self, gsi1pk: impl Into<String>) -> Self {
        self.gsi1pk = Some(gsi1pk.into());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Merge every field of a JSON object into the attribute map.
    /// Null fields are dropped so sparse records stay sparse.
    pub fn with_object(mut self, value: Value) -> Self {
        if let Value::Object(map) = value {
            for (k, v) in map {
                if !v.is_null() {
                    self.attributes.insert(k, v);
                }
            }
        }
        self
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.hash_key.clone(), self.range_key.clone())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// The attribute map as a JSON object, for typed decoding.
    pub fn attributes_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}
