//! VO Conesearch - a client for Virtual Observatory Simple Cone Search services.
//!
//! The crate fetches catalog databases (JSON lists of cone search services)
//! from a registry, resolves catalogs by name or access URL, and runs cone
//! searches with fallback across candidates, in the background, or
//! concurrently against all of them.
//!
//! # Architecture
//!
//! - **catalog**: Catalog entries, databases and the cached registry
//! - **conesearch**: Search dispatch, background searches and cost prediction
//! - **client**: Blocking HTTP client for registries and cone search services
//! - **votable**: Minimal VOTable reader with Cone Search compliance checks
//! - **models**: Cone queries and search results
//! - **matching**: Catalog name patterns and "did you mean" suggestions
//! - **cache**: TTL cache for fetched databases
//! - **metrics**: HTTP request counters
//! - **config**: Configuration from environment variables
//! - **error**: Error types

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod conesearch;
pub mod error;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod votable;

pub use catalog::{CatalogDatabase, CatalogEntry, CatalogRegistry};
pub use client::{AsyncVoService, AsyncVoServiceImpl, VoClient, VoService};
pub use config::Config;
pub use conesearch::{
    AsyncConeSearch, AsyncSearchAll, CatalogSelector, ConeSearch, SearchOptions, TaskState,
};
pub use error::{CandidateFailure, ConfigError, VoError, VoResult};
pub use metrics::{HttpTimer, Metrics, MetricsSummary, RequestKind, RequestStats};
pub use models::{ConeQuery, SearchResult};
pub use votable::VoTable;
