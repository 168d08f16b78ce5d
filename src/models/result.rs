//! Result of a cone search.

use crate::votable::VoTable;

/// Rows returned by one cone search service, and the access URL that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Access URL that answered the search
    pub url: String,

    /// Returned table
    pub array: VoTable,
}

impl SearchResult {
    /// Number of rows returned.
    pub fn size(&self) -> usize {
        self.array.size()
    }
}
