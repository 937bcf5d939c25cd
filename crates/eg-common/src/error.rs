//! Error types for Entrygate.
//!
//! Errors carry stable numeric codes so that the CLI and embedding
//! collectors can report them without parsing messages:
//! - 20-29: Entry decoding errors
//! - 60-69: Serialization errors
//!
//! The filter and redactor themselves never fail; these errors only arise
//! while decoding entries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Entrygate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed telemetry entries.
    Entry,
    /// JSON serialization errors.
    Json,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Entry => write!(f, "entry"),
            ErrorCategory::Json => write!(f, "json"),
        }
    }
}

/// Unified error type for Entrygate.
#[derive(Error, Debug)]
pub enum Error {
    // Entry errors (20-29)
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    #[error("entry content must be a JSON object, got {found}")]
    ContentNotObject { found: String },

    #[error("entry is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    // Serialization errors (60-69)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidEntry(_) => 20,
            Error::ContentNotObject { .. } => 21,
            Error::InvalidUtf8(_) => 22,
            Error::Json(_) => 60,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidEntry(_) | Error::ContentNotObject { .. } | Error::InvalidUtf8(_) => {
                ErrorCategory::Entry
            }
            Error::Json(_) => ErrorCategory::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_by_category() {
        assert_eq!(Error::InvalidEntry("x".into()).code(), 20);
        assert_eq!(
            Error::ContentNotObject {
                found: "array".into()
            }
            .category(),
            ErrorCategory::Entry
        );
        let bytes = vec![0xffu8];
        let utf8 = Error::from(std::str::from_utf8(&bytes).unwrap_err());
        assert_eq!(utf8.code(), 22);
        assert_eq!(utf8.category(), ErrorCategory::Entry);
        let json = Error::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert_eq!(json.code(), 60);
        assert_eq!(json.category(), ErrorCategory::Json);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Entry.to_string(), "entry");
        assert_eq!(ErrorCategory::Json.to_string(), "json");
    }
}
