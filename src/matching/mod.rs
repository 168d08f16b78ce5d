//! Catalog name matching: glob filtering for listings and close-name
//! suggestions for failed lookups.

pub mod pattern;
pub mod suggest;

pub use pattern::CatalogPattern;
pub use suggest::{normalize_name, suggest_names};
