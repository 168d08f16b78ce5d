//! Data models for cone search requests and results.

pub mod query;
pub mod result;

pub use query::ConeQuery;
pub use result::SearchResult;
