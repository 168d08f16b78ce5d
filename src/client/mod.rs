//! HTTP client for VO registries and Simple Cone Search services.
//!
//! This module provides a synchronous HTTP client that can be used from async contexts
//! via `tokio::task::spawn_blocking` (see [`AsyncVoServiceImpl`]). The client fetches
//! catalog database documents and cone search VOTables, mapping transport failures
//! onto [`VoError`].

mod async_wrapper;
pub use async_wrapper::{AsyncVoService, AsyncVoServiceImpl};

use crate::catalog::CatalogDatabase;
use crate::config::Config;
use crate::error::{VoError, VoResult};
use crate::metrics::{HttpTimer, Metrics, RequestKind};
use crate::models::ConeQuery;
use crate::votable::VoTable;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

/// The remote side of the library: where databases and search results come from.
///
/// [`VoClient`] is the HTTP implementation; tests and offline tools can supply
/// their own.
pub trait VoService: Send + Sync {
    /// Fetch and parse the catalog database called `name`.
    fn fetch_database(&self, name: &str) -> VoResult<CatalogDatabase>;

    /// Run one cone search against an access URL.
    ///
    /// The returned table is not yet checked for compliance; a service error
    /// embedded in the VOTable is reported as `VoError::VoTable`.
    fn cone_search(&self, url: &str, query: &ConeQuery, verb: u8) -> VoResult<VoTable>;
}

/// HTTP client for VO services.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct VoClient {
    /// Base URL the catalog databases live under
    base_url: String,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,
}

impl VoClient {
    /// Create a new VoClient from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.remote_timeout())
            .build();

        Self {
            base_url: config.vos_baseurl.clone(),
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Create a VoClient with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// URL of the JSON document for a catalog database.
    pub fn database_url(&self, name: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}/{}.json", base, urlencoding::encode(name))
    }

    /// Append cone search parameters to an access URL.
    ///
    /// Access URLs are published ready for parameters to be appended, e.g.
    /// `...vo_cone.cgi?CAT=USNO-A2&`; a missing `?` or `&` is added.
    pub fn cone_search_url(access_url: &str, query: &ConeQuery, verb: u8) -> String {
        let separator = if access_url.ends_with('?') || access_url.ends_with('&') {
            ""
        } else if access_url.contains('?') {
            "&"
        } else {
            "?"
        };
        format!("{}{}{}", access_url, separator, query.to_params(verb))
    }

    /// Execute a GET request and return the response body.
    fn get(&self, url: &str, kind: RequestKind) -> VoResult<String> {
        tracing::debug!("GET {}", url);
        let timer = HttpTimer::start(self.metrics.clone(), kind);

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(e) => {
                let error = self.map_error(e);
                let elapsed = timer.complete_with_error();
                tracing::debug!("GET {} - Error after {:?}: {}", url, elapsed, error);
                return Err(error);
            }
        };

        // Read the whole body; into_string() caps responses at 10 MB
        let status = response.status();
        let mut body = String::new();
        match response.into_reader().read_to_string(&mut body) {
            Ok(_) => {
                let elapsed = timer.complete();
                tracing::debug!(
                    "GET {} - Success (status: {}, {} bytes, {:?})",
                    url,
                    status,
                    body.len(),
                    elapsed
                );
                Ok(body)
            }
            Err(e) => {
                timer.complete_with_error();
                Err(VoError::HttpError(format!("reading response body: {}", e)))
            }
        }
    }

    /// Map a ureq error to a VoError.
    fn map_error(&self, error: ureq::Error) -> VoError {
        match error {
            ureq::Error::Status(code, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                VoError::Status {
                    status: code,
                    message,
                }
            }
            ureq::Error::Transport(transport) => match transport.kind() {
                ureq::ErrorKind::ConnectionFailed => {
                    VoError::HttpError("Connection failed".to_string())
                }
                _ => VoError::HttpError(transport.to_string()),
            },
        }
    }
}

impl VoService for VoClient {
    fn fetch_database(&self, name: &str) -> VoResult<CatalogDatabase> {
        let body = self.get(&self.database_url(name), RequestKind::Registry)?;
        let database = CatalogDatabase::from_json(&body)?;

        tracing::debug!(
            "Fetched catalog database '{}' ({} catalogs)",
            name,
            database.len()
        );
        Ok(database)
    }

    fn cone_search(&self, url: &str, query: &ConeQuery, verb: u8) -> VoResult<VoTable> {
        let body = self.get(
            &Self::cone_search_url(url, query, verb),
            RequestKind::ConeSearch,
        )?;
        let table = VoTable::parse(&body)?;
        table.ensure_no_service_error()?;

        self.metrics.record_rows_fetched(table.size());
        Ok(table)
    }
}
