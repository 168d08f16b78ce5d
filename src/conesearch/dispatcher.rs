//! Cone search dispatch over one or many candidate catalogs.

use crate::catalog::{CatalogDatabase, CatalogRegistry};
use crate::client::{AsyncVoService, AsyncVoServiceImpl, VoService};
use crate::config::Config;
use crate::error::{CandidateFailure, VoError, VoResult};
use crate::models::{ConeQuery, SearchResult};
use crate::votable::VoTable;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

/// Which catalogs a cone search may use.
#[derive(Debug, Clone, Default)]
pub enum CatalogSelector {
    /// Every catalog of the configured default database, in order
    #[default]
    Default,

    /// One catalog name or access URL
    Single(String),

    /// Catalog names and/or access URLs, tried in order
    Many(Vec<String>),

    /// Every catalog of an already fetched database, in order
    Database(Arc<CatalogDatabase>),
}

impl From<&str> for CatalogSelector {
    fn from(value: &str) -> Self {
        CatalogSelector::Single(value.to_string())
    }
}

impl From<String> for CatalogSelector {
    fn from(value: String) -> Self {
        CatalogSelector::Single(value)
    }
}

impl From<Vec<String>> for CatalogSelector {
    fn from(value: Vec<String>) -> Self {
        CatalogSelector::Many(value)
    }
}

impl From<Vec<&str>> for CatalogSelector {
    fn from(value: Vec<&str>) -> Self {
        CatalogSelector::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Arc<CatalogDatabase>> for CatalogSelector {
    fn from(value: Arc<CatalogDatabase>) -> Self {
        CatalogSelector::Database(value)
    }
}

impl From<CatalogDatabase> for CatalogSelector {
    fn from(value: CatalogDatabase) -> Self {
        CatalogSelector::Database(Arc::new(value))
    }
}

/// Per-search switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Reject any response that deviates from the Cone Search standard
    pub pedantic: bool,

    /// Ask services for all columns and log every candidate at info level
    pub verbose: bool,
}

impl SearchOptions {
    /// `VERB` parameter sent to the service.
    pub fn verb(&self) -> u8 {
        if self.verbose {
            3
        } else {
            1
        }
    }
}

/// A resolved catalog to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Catalog name, when the candidate came from a database
    pub name: Option<String>,

    /// Access URL
    pub url: String,
}

/// Does this string name an access URL rather than a catalog?
fn is_access_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Cone search entry point.
///
/// Holds the configuration and the catalog registry; cheap to clone and safe
/// to share with background tasks.
#[derive(Clone, Debug)]
pub struct ConeSearch {
    config: Config,
    registry: Arc<CatalogRegistry>,
}

impl ConeSearch {
    /// Cone search over HTTP, configured by `config`.
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(CatalogRegistry::from_config(&config));
        Self { config, registry }
    }

    /// Cone search over any service implementation.
    pub fn with_service(config: Config, service: Arc<dyn VoService>) -> Self {
        let registry = Arc::new(CatalogRegistry::new(service, &config));
        Self { config, registry }
    }

    /// Cone search sharing an existing registry (and its cache).
    pub fn with_registry(config: Config, registry: Arc<CatalogRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    /// The configured default database.
    pub fn default_database(&self) -> VoResult<Arc<CatalogDatabase>> {
        self.registry
            .get_remote_catalog_db(&self.config.conesearch_dbname)
    }

    /// Catalog names in the default database, optionally filtered and sorted.
    pub fn list_catalogs(&self, pattern: Option<&str>, sort: bool) -> VoResult<Vec<String>> {
        Ok(self.default_database()?.list_catalogs(pattern, sort))
    }

    /// Turn a selector into the ordered list of catalogs to try.
    ///
    /// Access URLs are used as-is without touching the registry; names are
    /// looked up in the default database and fail immediately if unknown.
    pub fn resolve_candidates(&self, selector: &CatalogSelector) -> VoResult<Vec<Candidate>> {
        match selector {
            CatalogSelector::Default => {
                let database = self.default_database()?;
                Ok(Self::database_candidates(&database))
            }
            CatalogSelector::Database(database) => Ok(Self::database_candidates(database)),
            CatalogSelector::Single(value) => Ok(vec![self.resolve_one(value)?]),
            CatalogSelector::Many(values) => values.iter().map(|v| self.resolve_one(v)).collect(),
        }
    }

    fn database_candidates(database: &CatalogDatabase) -> Vec<Candidate> {
        database
            .get_catalogs()
            .map(|(name, entry)| Candidate {
                name: Some(name.to_string()),
                url: entry.url.clone(),
            })
            .collect()
    }

    fn resolve_one(&self, value: &str) -> VoResult<Candidate> {
        if is_access_url(value) {
            return Ok(Candidate {
                name: None,
                url: value.to_string(),
            });
        }

        let database = self.default_database()?;
        let entry = database.get_catalog(value)?;
        Ok(Candidate {
            name: Some(value.to_string()),
            url: entry.url.clone(),
        })
    }

    /// Query one access URL and apply the compliance policy.
    pub(crate) fn search_url(
        &self,
        url: &str,
        query: &ConeQuery,
        options: SearchOptions,
    ) -> VoResult<VoTable> {
        let table = self
            .registry
            .service()
            .cone_search(url, query, options.verb())?;
        table.check_compliance(options.pedantic)?;
        Ok(table)
    }

    /// Run a cone search.
    ///
    /// Candidates are tried in order and the first success is returned. If
    /// every candidate fails, the error lists each one's failure.
    pub fn conesearch(
        &self,
        query: &ConeQuery,
        catalog_db: impl Into<CatalogSelector>,
        options: SearchOptions,
    ) -> VoResult<SearchResult> {
        let candidates = self.resolve_candidates(&catalog_db.into())?;
        let mut failures = Vec::new();

        for candidate in candidates {
            if options.verbose {
                tracing::info!(
                    "Trying {} ({})",
                    candidate.name.as_deref().unwrap_or("<url>"),
                    candidate.url
                );
            } else {
                tracing::debug!("Trying {}", candidate.url);
            }

            match self.search_url(&candidate.url, query, options) {
                Ok(array) => {
                    tracing::debug!("{} returned {} rows", candidate.url, array.size());
                    return Ok(SearchResult {
                        url: candidate.url,
                        array,
                    });
                }
                Err(error) => {
                    tracing::warn!("Cone search on {} failed: {}", candidate.url, error);
                    failures.push(CandidateFailure {
                        url: candidate.url,
                        error,
                    });
                }
            }
        }

        Err(VoError::ConeSearch { failures })
    }

    /// Time a cone search with a monotonic clock.
    ///
    /// Returns the elapsed seconds (always strictly positive) and the result.
    pub fn conesearch_timer(
        &self,
        query: &ConeQuery,
        catalog_db: impl Into<CatalogSelector>,
        options: SearchOptions,
    ) -> VoResult<(f64, SearchResult)> {
        let start = Instant::now();
        let result = self.conesearch(query, catalog_db, options)?;
        let elapsed = start.elapsed().as_secs_f64().max(f64::MIN_POSITIVE);
        Ok((elapsed, result))
    }

    /// Query every candidate concurrently and keep all successes.
    ///
    /// Results come back in candidate order with duplicate access URLs
    /// queried once. Fails only when no candidate succeeds.
    pub async fn search_all_async(
        &self,
        query: &ConeQuery,
        catalog_db: impl Into<CatalogSelector>,
        options: SearchOptions,
    ) -> VoResult<Vec<SearchResult>> {
        let mut urls: Vec<String> = Vec::new();
        for candidate in self.resolve_candidates(&catalog_db.into())? {
            if !urls.contains(&candidate.url) {
                urls.push(candidate.url);
            }
        }

        let service = AsyncVoServiceImpl::new(Arc::clone(self.registry.service()));
        let verb = options.verb();
        let searches = urls.iter().map(|url| {
            let service = service.clone();
            async move {
                let table = service.cone_search(url, query, verb).await?;
                table.check_compliance(options.pedantic)?;
                Ok::<VoTable, VoError>(table)
            }
        });
        let outcomes = join_all(searches).await;

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (url, outcome) in urls.into_iter().zip(outcomes) {
            match outcome {
                Ok(array) => results.push(SearchResult { url, array }),
                Err(error) => {
                    tracing::warn!("Cone search on {} failed: {}", url, error);
                    failures.push(CandidateFailure { url, error });
                }
            }
        }

        if results.is_empty() {
            return Err(VoError::ConeSearch { failures });
        }

        tracing::debug!(
            "search_all: {} succeeded, {} failed",
            results.len(),
            failures.len()
        );
        Ok(results)
    }
}
