//! Async wrapper around a synchronous [`VoService`].
//!
//! This module provides an async interface to the blocking HTTP client by using
//! `tokio::task::spawn_blocking` to run requests on a dedicated thread pool,
//! preventing blocking of the async runtime.

use crate::catalog::CatalogDatabase;
use crate::client::VoService;
use crate::error::{VoError, VoResult};
use crate::models::ConeQuery;
use crate::votable::VoTable;
use async_trait::async_trait;
use std::sync::Arc;

/// Async counterpart of [`VoService`].
#[async_trait]
pub trait AsyncVoService: Send + Sync {
    async fn fetch_database(&self, name: &str) -> VoResult<CatalogDatabase>;
    async fn cone_search(&self, url: &str, query: &ConeQuery, verb: u8) -> VoResult<VoTable>;
}

/// Async wrapper around a synchronous service.
///
/// Uses `tokio::task::spawn_blocking` to run synchronous HTTP
/// operations on a dedicated thread pool, preventing blocking
/// the async runtime.
#[derive(Clone)]
pub struct AsyncVoServiceImpl {
    service: Arc<dyn VoService>,
}

impl AsyncVoServiceImpl {
    pub fn new(service: Arc<dyn VoService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AsyncVoService for AsyncVoServiceImpl {
    async fn fetch_database(&self, name: &str) -> VoResult<CatalogDatabase> {
        let service = self.service.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || service.fetch_database(&name))
            .await
            .map_err(|e| VoError::Task(format!("Task join error: {}", e)))?
    }

    async fn cone_search(&self, url: &str, query: &ConeQuery, verb: u8) -> VoResult<VoTable> {
        let service = self.service.clone();
        let url = url.to_string();
        let query = *query;

        tokio::task::spawn_blocking(move || service.cone_search(&url, &query, verb))
            .await
            .map_err(|e| VoError::Task(format!("Task join error: {}", e)))?
    }
}
