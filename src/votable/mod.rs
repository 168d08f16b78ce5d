//! Minimal VOTable support for cone search responses.
//!
//! Only what a cone search client needs is read: the `FIELD` definitions and
//! `TABLEDATA` rows of the first table, the `VOTABLE` version, and any
//! `INFO`/`PARAM` named `Error` through which a service reports a failed query.
//! Deviations from the Cone Search standard are collected as warnings; in
//! pedantic mode any warning fails the search.

mod compliance;
mod parser;

pub use parser::parse;

use crate::error::{VoError, VoResult};

/// A column definition from a `FIELD` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    pub name: String,
    pub id: Option<String>,
    pub datatype: Option<String>,
    pub ucd: Option<String>,
    pub unit: Option<String>,
}

/// The first table of a VOTable document.
///
/// Cells are kept as the text the service sent. Equality compares fields and
/// rows only.
#[derive(Debug, Clone, Default)]
pub struct VoTable {
    pub(crate) version: Option<String>,
    pub(crate) fields: Vec<Field>,
    pub(crate) rows: Vec<Vec<String>>,
    pub(crate) warnings: Vec<String>,
    pub(crate) service_error: Option<String>,
}

impl PartialEq for VoTable {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.rows == other.rows
    }
}

impl VoTable {
    /// Parse a VOTable document.
    pub fn parse(xml: &str) -> VoResult<Self> {
        parser::parse(xml)
    }

    /// Build a table directly (useful for services that are not HTTP backed).
    pub fn from_rows(fields: Vec<Field>, rows: Vec<Vec<String>>) -> Self {
        Self {
            version: Some("1.1".to_string()),
            fields,
            rows,
            warnings: Vec::new(),
            service_error: None,
        }
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `version` attribute of the `VOTABLE` element.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Column definitions.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Table rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Standard deviations found while reading.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Error message the service embedded in the response, if any.
    pub fn service_error(&self) -> Option<&str> {
        self.service_error.as_deref()
    }

    /// All values of a column, looked up by `name` or `ID`.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self
            .fields
            .iter()
            .position(|f| f.name == name || f.id.as_deref() == Some(name))?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Fail if the service reported an error inside the document.
    pub fn ensure_no_service_error(&self) -> VoResult<()> {
        match &self.service_error {
            Some(message) => Err(VoError::VoTable(format!(
                "service reported an error: {}",
                message
            ))),
            None => Ok(()),
        }
    }

    /// Apply the compliance policy.
    ///
    /// Pedantic mode turns collected warnings into a `Validation` error;
    /// otherwise they are logged and the table is accepted.
    pub fn check_compliance(&self, pedantic: bool) -> VoResult<()> {
        if self.warnings.is_empty() {
            return Ok(());
        }

        if pedantic {
            return Err(VoError::Validation(self.warnings.join("; ")));
        }

        for warning in &self.warnings {
            tracing::warn!("VOTable deviation tolerated: {}", warning);
        }
        Ok(())
    }
}
