//! Thread-safe cache of fetched catalog databases.
//!
//! Databases are stored behind `Arc` so readers share one parsed copy. Entries
//! live for the process lifetime unless a TTL is configured.

use crate::catalog::CatalogDatabase;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// A cached database with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry {
    database: Arc<CatalogDatabase>,
    inserted_at: Instant,
}

/// Registry-name → database cache.
///
/// Cloning is cheap and clones share the same storage. Concurrent readers never
/// block each other; fetching happens outside the lock, so two threads missing
/// at the same time may both fetch and the later insert wins.
#[derive(Clone)]
pub struct DatabaseCache {
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Option<Duration>,
}

impl DatabaseCache {
    /// Create a cache. `None` keeps entries until cleared.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.duration_since(entry.inserted_at) < ttl,
            None => true,
        }
    }

    /// Insert a database, replacing any previous one under the same name.
    pub fn insert(&self, name: &str, database: Arc<CatalogDatabase>) {
        let entry = CacheEntry {
            database,
            inserted_at: Instant::now(),
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(name.to_string(), entry);
        }
    }

    /// Get a database if it is cached and has not expired.
    pub fn get(&self, name: &str) -> Option<Arc<CatalogDatabase>> {
        let now = Instant::now();

        if let Ok(cache) = self.cache.read() {
            if let Some(entry) = cache.get(name) {
                if self.is_fresh(entry, now) {
                    return Some(Arc::clone(&entry.database));
                }
            }
        }

        None
    }

    /// Check if a fresh entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove one database.
    pub fn remove(&self, name: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(name);
        }
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Drop expired entries. Expired entries are already ignored by `get()`.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();

        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| self.is_fresh(entry, now));
        }
    }

    /// Number of entries (including expired ones).
    pub fn len(&self) -> usize {
        if let Ok(cache) = self.cache.read() {
            cache.len()
        } else {
            0
        }
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured TTL.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

impl Default for DatabaseCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for DatabaseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}
