//! Caching utilities for fetched catalog databases.

pub mod database_cache;

pub use database_cache::DatabaseCache;
