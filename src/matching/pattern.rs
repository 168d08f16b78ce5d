//! Case-insensitive glob filtering of catalog names.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A catalog name filter.
///
/// The user pattern is wrapped as `*pattern*`, so `usno*a` matches any name
/// containing "usno" followed somewhere later by "a". A pattern that is not a
/// valid glob (for example an unclosed `[`) is matched literally.
#[derive(Debug, Clone)]
pub struct CatalogPattern {
    pattern: Pattern,
}

impl CatalogPattern {
    /// Compile a user-supplied pattern.
    pub fn new(pattern: &str) -> Self {
        let pattern = Pattern::new(&format!("*{}*", pattern)).unwrap_or_else(|_| {
            let literal = format!("*{}*", Pattern::escape(pattern));
            Pattern::new(&literal).unwrap_or_default()
        });
        Self { pattern }
    }

    /// Does the catalog name match?
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches_with(name, MATCH_OPTIONS)
    }
}
