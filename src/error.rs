//! Error types for the VO cone search client.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A single candidate catalog that failed during a multi-catalog cone search.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    /// Access URL that was queried
    pub url: String,

    /// Why the query failed
    pub error: VoError,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.error)
    }
}

/// Errors that can occur when talking to VO registries and cone search services.
///
/// Every variant owns plain data so a result can be handed out more than once
/// (see `AsyncConeSearch::get`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoError {
    /// Registry name is unknown or its document could not be fetched or parsed
    #[error("Registry '{name}' unavailable: {reason}")]
    Registry { name: String, reason: String },

    /// Lookup by catalog name or access URL found nothing
    #[error("Catalog not found: {key}{}", format_suggestions(.suggestions))]
    CatalogNotFound {
        key: String,
        suggestions: Vec<String>,
    },

    /// Response deviates from the Cone Search standard (pedantic mode)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Every candidate catalog failed
    #[error("{}", format_failures(.failures))]
    ConeSearch { failures: Vec<CandidateFailure> },

    /// Waiting on a background search exceeded the timeout
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Service returned an error status code
    #[error("Service error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Failed to parse a JSON document
    #[error("JSON parse error: {0}")]
    JsonError(String),

    /// Failed to read a VOTable document, or the service reported an error in it
    #[error("VOTable error: {0}")]
    VoTable(String),

    /// Search position or radius is out of range
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Background task could not complete
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<serde_json::Error> for VoError {
    fn from(error: serde_json::Error) -> Self {
        VoError::JsonError(error.to_string())
    }
}

impl VoError {
    /// Build a `CatalogNotFound` error without suggestions.
    pub fn catalog_not_found(key: impl Into<String>) -> Self {
        VoError::CatalogNotFound {
            key: key.into(),
            suggestions: Vec::new(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

fn format_failures(failures: &[CandidateFailure]) -> String {
    let details = failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "None of the {} candidate catalogs returned a result: {}",
        failures.len(),
        details
    )
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Convenience type alias for Results with VoError
pub type VoResult<T> = Result<T, VoError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoError::catalog_not_found("not_there");
        assert_eq!(err.to_string(), "Catalog not found: not_there");

        let err = VoError::CatalogNotFound {
            key: "USNO-A3".to_string(),
            suggestions: vec!["USNO-A2".to_string(), "USNO-B1".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Catalog not found: USNO-A3 (did you mean: USNO-A2, USNO-B1?)"
        );

        let err = ConfigError::InvalidValue {
            var: "REMOTE_TIMEOUT".to_string(),
            reason: "Must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for REMOTE_TIMEOUT: Must be greater than zero"
        );
    }

    #[test]
    fn test_cone_search_error_aggregates_failures() {
        let err = VoError::ConeSearch {
            failures: vec![
                CandidateFailure {
                    url: "http://a.example/cone?".to_string(),
                    error: VoError::HttpError("Request timeout".to_string()),
                },
                CandidateFailure {
                    url: "http://b.example/cone?".to_string(),
                    error: VoError::Status {
                        status: 500,
                        message: "boom".to_string(),
                    },
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("None of the 2 candidate catalogs"));
        assert!(message.contains("http://a.example/cone?: HTTP request failed: Request timeout"));
        assert!(message.contains("status 500"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: VoError = parse.into();
        assert!(matches!(err, VoError::JsonError(_)));
    }
}
