//! Named catalog databases fetched from a remote service and cached.

use crate::cache::DatabaseCache;
use crate::catalog::CatalogDatabase;
use crate::client::{VoClient, VoService};
use crate::config::Config;
use crate::error::{VoError, VoResult};
use std::sync::Arc;

/// Process-lifetime set of catalog databases ("basic", "conesearch_simple", ...).
///
/// Each database is fetched on first use and then served from the cache.
/// Safe to share between threads; concurrent first lookups of the same name
/// may fetch twice, and the cache keeps whichever finished last.
#[derive(Clone)]
pub struct CatalogRegistry {
    service: Arc<dyn VoService>,
    cache: DatabaseCache,
}

impl CatalogRegistry {
    /// Registry backed by an HTTP client built from the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(VoClient::new(config)), config)
    }

    /// Registry backed by any service implementation.
    pub fn new(service: Arc<dyn VoService>, config: &Config) -> Self {
        Self {
            service,
            cache: DatabaseCache::new(config.cache_ttl()),
        }
    }

    /// The underlying service.
    pub fn service(&self) -> &Arc<dyn VoService> {
        &self.service
    }

    /// Fetch (or return the cached) database called `name`.
    ///
    /// Any failure, including an unknown name, is reported as `VoError::Registry`.
    pub fn get_remote_catalog_db(&self, name: &str) -> VoResult<Arc<CatalogDatabase>> {
        if let Some(database) = self.cache.get(name) {
            tracing::debug!("Catalog database '{}' served from cache", name);
            return Ok(database);
        }

        let database = self.service.fetch_database(name).map_err(|e| {
            let reason = match e {
                VoError::Status { status: 404, .. } => "no such catalog database".to_string(),
                other => other.to_string(),
            };
            VoError::Registry {
                name: name.to_string(),
                reason,
            }
        })?;

        let database = Arc::new(database);
        self.cache.insert(name, Arc::clone(&database));
        tracing::info!(
            "Loaded catalog database '{}' (version {}, {} catalogs)",
            name,
            database.version(),
            database.len()
        );
        Ok(database)
    }

    /// Catalog names of database `name`, in document order.
    pub fn list_catalogs(&self, name: &str) -> VoResult<Vec<String>> {
        Ok(self.get_remote_catalog_db(name)?.list_catalogs(None, false))
    }

    /// Forget every cached database.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of databases currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for CatalogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogRegistry")
            .field("cache", &self.cache)
            .finish()
    }
}
