//! Catalog databases: entries, the in-memory database, and the cached registry
//! of named databases.

pub mod database;
pub mod entry;
pub mod registry;

pub use database::CatalogDatabase;
pub use entry::CatalogEntry;
pub use registry::CatalogRegistry;
