//! In-memory catalog database: the parsed form of a registry JSON document.
//!
//! A registry document looks like
//!
//! ```json
//! {
//!     "__version__": 1,
//!     "catalogs": {"foo": {"title": "bar", "url": "bar.foo"}},
//!     "content": ["A", "B", "C"]
//! }
//! ```
//!
//! Catalogs keep the order they appear in the document, so unsorted listings
//! and the URL tie-break rule are deterministic.

use crate::catalog::CatalogEntry;
use crate::error::{VoError, VoResult};
use crate::matching::{suggest_names, CatalogPattern};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Top-level keys of a registry document.
pub const DATABASE_KEYS: [&str; 3] = ["__version__", "catalogs", "content"];

/// Raw registry document, before entry shapes are checked.
#[derive(Debug, Deserialize)]
struct RawDatabase {
    #[serde(rename = "__version__")]
    version: Value,

    catalogs: Map<String, Value>,

    #[serde(default)]
    content: Vec<String>,
}

/// A named set of cone search catalogs.
///
/// Immutable once built. Names are unique; several catalogs may share one
/// access URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogDatabase {
    version: String,
    content: Vec<String>,
    catalogs: Vec<(String, CatalogEntry)>,
    index: HashMap<String, usize>,
}

impl CatalogDatabase {
    /// Build a database from entries. A repeated name keeps its first position
    /// and the last entry given for it.
    pub fn new<I>(version: impl Into<String>, content: Vec<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, CatalogEntry)>,
    {
        let mut catalogs: Vec<(String, CatalogEntry)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (name, entry) in entries {
            match index.get(&name) {
                Some(&pos) => catalogs[pos].1 = entry,
                None => {
                    index.insert(name.clone(), catalogs.len());
                    catalogs.push((name, entry));
                }
            }
        }

        Self {
            version: version.into(),
            content,
            catalogs,
            index,
        }
    }

    /// Parse a registry JSON document.
    ///
    /// Every catalog must carry string `title` and `url` fields; the first
    /// malformed entry fails the whole document.
    pub fn from_json(json: &str) -> VoResult<Self> {
        let raw: RawDatabase = serde_json::from_str(json)?;

        let version = match raw.version {
            Value::String(s) => s,
            other => other.to_string(),
        };

        let mut entries = Vec::with_capacity(raw.catalogs.len());
        for (name, value) in raw.catalogs {
            let entry: CatalogEntry = serde_json::from_value(value).map_err(|e| {
                VoError::JsonError(format!("catalog '{}' is malformed: {}", name, e))
            })?;
            entries.push((name, entry));
        }

        Ok(Self::new(version, raw.content, entries))
    }

    /// Serialise back into the registry document format.
    pub fn to_json(&self) -> VoResult<String> {
        let mut catalogs = Map::new();
        for (name, entry) in &self.catalogs {
            catalogs.insert(name.clone(), entry.tree());
        }

        let mut root = Map::new();
        root.insert(
            DATABASE_KEYS[0].to_string(),
            Value::String(self.version.clone()),
        );
        root.insert(DATABASE_KEYS[1].to_string(), Value::Object(catalogs));
        root.insert(
            DATABASE_KEYS[2].to_string(),
            Value::Array(self.content.iter().cloned().map(Value::String).collect()),
        );

        Ok(serde_json::to_string_pretty(&Value::Object(root))?)
    }

    /// Top-level keys of the underlying document.
    pub fn keys(&self) -> [&'static str; 3] {
        DATABASE_KEYS
    }

    /// Database version string (`__version__`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Column names documented by the registry (`content`).
    pub fn content(&self) -> &[String] {
        &self.content
    }

    /// Number of catalogs.
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    /// True when the database lists no catalogs.
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// True when a catalog with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// List catalog names.
    ///
    /// With a pattern, only names matching the case-insensitive glob
    /// `*pattern*` are returned. `sort` gives lexicographic order, otherwise
    /// document order.
    pub fn list_catalogs(&self, pattern: Option<&str>, sort: bool) -> Vec<String> {
        let mut names: Vec<String> = match pattern {
            None => self.catalogs.iter().map(|(name, _)| name.clone()).collect(),
            Some(pattern) => {
                let pattern = CatalogPattern::new(pattern);
                self.catalogs
                    .iter()
                    .filter(|(name, _)| pattern.matches(name))
                    .map(|(name, _)| name.clone())
                    .collect()
            }
        };

        if sort {
            names.sort();
        }
        names
    }

    /// Get a catalog by name.
    pub fn get_catalog(&self, name: &str) -> VoResult<&CatalogEntry> {
        match self.index.get(name) {
            Some(&pos) => Ok(&self.catalogs[pos].1),
            None => Err(VoError::CatalogNotFound {
                key: name.to_string(),
                suggestions: suggest_names(name, self.catalogs.iter().map(|(n, _)| n.as_str())),
            }),
        }
    }

    /// Iterate over all `(name, entry)` pairs in document order.
    pub fn get_catalogs(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> + '_ {
        self.catalogs
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Get the catalog served at an access URL.
    ///
    /// When several catalogs share the URL, the first one in document order is
    /// returned.
    pub fn get_catalog_by_url(&self, url: &str) -> VoResult<(&str, &CatalogEntry)> {
        self.catalogs
            .iter()
            .find(|(_, entry)| entry.url == url)
            .map(|(name, entry)| (name.as_str(), entry))
            .ok_or_else(|| VoError::catalog_not_found(url))
    }

    /// Iterate over every `(name, entry)` pair whose access URL equals `url`.
    pub fn get_catalogs_by_url<'a>(
        &'a self,
        url: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a CatalogEntry)> + 'a {
        self.get_catalogs().filter(move |(_, entry)| entry.url == url)
    }

    /// Distinct access URLs, in document order unless `sort` is set.
    pub fn list_catalogs_by_url(&self, sort: bool) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for (_, entry) in &self.catalogs {
            if !urls.contains(&entry.url) {
                urls.push(entry.url.clone());
            }
        }

        if sort {
            urls.sort();
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASIC: &str = r#"{
        "__version__": 1,
        "catalogs": {"foo": {"title": "bar", "url": "bar.foo"}},
        "content": ["A", "B", "C"]
    }"#;

    fn simple_db() -> CatalogDatabase {
        let names = ["USNO-B1", "USNO-A2", "BROKEN", "USNO NOMAD", "USNO ACT"];
        CatalogDatabase::new(
            "1",
            vec![],
            names.iter().map(|name| {
                (
                    name.to_string(),
                    CatalogEntry::new(*name, format!("http://cone.example/{}?", name)),
                )
            }),
        )
    }

    #[test]
    fn test_basic_document() {
        let db = CatalogDatabase::from_json(BASIC).unwrap();

        let mut keys = db.keys().to_vec();
        keys.sort();
        assert_eq!(keys, vec!["__version__", "catalogs", "content"]);
        assert_eq!(db.content(), &["A", "B", "C"]);
        assert_eq!(db.version(), "1");

        assert_eq!(db.list_catalogs(None, false), vec!["foo"]);
        assert!(db.list_catalogs(Some("whatever"), true).is_empty());

        let foo = db.get_catalog("foo").unwrap();
        assert_eq!(foo.tree(), json!({"title": "bar", "url": "bar.foo"}));

        for (name, entry) in db.get_catalogs() {
            assert_eq!(name, "foo");
            assert_eq!(entry.tree(), foo.tree());
        }

        let (name, by_url) = db.get_catalog_by_url("bar.foo").unwrap();
        assert_eq!(name, "foo");
        assert_eq!(by_url.tree(), foo.tree());
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let db = CatalogDatabase::from_json(BASIC).unwrap();
        let err = db.get_catalog("not_there").unwrap_err();
        assert!(matches!(err, VoError::CatalogNotFound { ref key, .. } if key == "not_there"));

        let err = db.get_catalog_by_url("nowhere.example").unwrap_err();
        assert!(matches!(err, VoError::CatalogNotFound { .. }));
    }

    #[test]
    fn test_missing_catalog_suggests_close_names() {
        let db = simple_db();
        match db.get_catalog("USNO-A3") {
            Err(VoError::CatalogNotFound { suggestions, .. }) => {
                assert!(suggestions.contains(&"USNO-A2".to_string()));
            }
            other => panic!("Expected CatalogNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_pattern_listing() {
        let db = simple_db();
        assert_eq!(
            db.list_catalogs(None, true),
            vec!["BROKEN", "USNO ACT", "USNO NOMAD", "USNO-A2", "USNO-B1"]
        );
        assert_eq!(
            db.list_catalogs(Some("usno*a"), true),
            vec!["USNO ACT", "USNO NOMAD", "USNO-A2"]
        );
        // Document order when unsorted
        assert_eq!(
            db.list_catalogs(Some("usno*a"), false),
            vec!["USNO-A2", "USNO NOMAD", "USNO ACT"]
        );
    }

    #[test]
    fn test_shared_url_first_in_document_order_wins() {
        let db = CatalogDatabase::new(
            "1",
            vec![],
            vec![
                ("zeta".to_string(), CatalogEntry::new("z", "http://shared/")),
                ("alpha".to_string(), CatalogEntry::new("a", "http://shared/")),
                ("other".to_string(), CatalogEntry::new("o", "http://other/")),
            ],
        );

        let (name, _) = db.get_catalog_by_url("http://shared/").unwrap();
        assert_eq!(name, "zeta");

        let all: Vec<&str> = db
            .get_catalogs_by_url("http://shared/")
            .map(|(name, _)| name)
            .collect();
        assert_eq!(all, vec!["zeta", "alpha"]);

        assert_eq!(
            db.list_catalogs_by_url(false),
            vec!["http://shared/", "http://other/"]
        );
    }

    #[test]
    fn test_duplicate_names_keep_last_entry() {
        let db = CatalogDatabase::new(
            "1",
            vec![],
            vec![
                ("a".to_string(), CatalogEntry::new("first", "u1")),
                ("b".to_string(), CatalogEntry::new("b", "u2")),
                ("a".to_string(), CatalogEntry::new("second", "u3")),
            ],
        );

        assert_eq!(db.len(), 2);
        assert_eq!(db.list_catalogs(None, false), vec!["a", "b"]);
        assert_eq!(db.get_catalog("a").unwrap().title, "second");
    }

    #[test]
    fn test_malformed_entry_fails_document() {
        let json = r#"{"__version__": "2", "catalogs": {"bad": {"title": "t"}}, "content": []}"#;
        let err = CatalogDatabase::from_json(json).unwrap_err();
        match err {
            VoError::JsonError(message) => assert!(message.contains("bad")),
            other => panic!("Expected JsonError, got: {:?}", other),
        }
    }

    #[test]
    fn test_to_json_reparses_to_same_database() {
        let db = CatalogDatabase::from_json(BASIC).unwrap();
        let reparsed = CatalogDatabase::from_json(&db.to_json().unwrap()).unwrap();
        assert_eq!(db, reparsed);
    }
}
