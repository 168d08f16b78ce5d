//! Catalog entry model: one cone search service listed in a catalog database.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A cone search catalog as described in a catalog database.
///
/// `title` and `url` are required; any other keys in the registry document
/// (capability class, publisher, validation results, ...) are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Human-readable catalog title
    pub title: String,

    /// Access URL of the cone search service
    pub url: String,

    /// Remaining keys from the registry document, in document order
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    /// Create an entry with only a title and access URL.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            extra: Map::new(),
        }
    }

    /// The entry as a JSON tree, exactly as it would appear in the registry document.
    pub fn tree(&self) -> Value {
        let mut tree = Map::new();
        tree.insert("title".to_string(), Value::String(self.title.clone()));
        tree.insert("url".to_string(), Value::String(self.url.clone()));
        for (key, value) in &self.extra {
            tree.insert(key.clone(), value.clone());
        }
        Value::Object(tree)
    }

    /// Look up an additional registry field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
