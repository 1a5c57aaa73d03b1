//! Error types for the QC test-case pipeline.
//!
//! - [`CsvError`] - CSV reading and parsing errors
//! - [`IngestError`] - Ingestion run errors
//! - [`ValidateError`] - Errors that stop the validator before any check runs
//!
//! Data-quality findings are not errors; they live in
//! [`crate::validation::ValidationReport`].

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or parsing a CSV file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode file content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Malformed CSV.
    #[error("Line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file (no header row).
    #[error("CSV file is empty")]
    EmptyFile,

    /// Invalid cell value.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        message: String,
    },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => CsvError::IoError(e),
            _ => CsvError::ParseError { line, message },
        }
    }
}

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Raw input file absent.
    #[error("Input file not found at: {}", .path.display())]
    InputNotFound {
        path: PathBuf,
        /// CSV files that do exist in the input directory.
        available: Vec<String>,
    },

    /// Required raw columns absent.
    #[error("Missing required column(s) in input file: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Raw input could not be parsed.
    #[error("Failed to read input file: {0}")]
    Read(#[source] CsvError),

    /// Existing combined dataset could not be parsed.
    #[error("Failed to read combined file: {0}")]
    Combined(#[source] CsvError),

    /// Directory creation or file write failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("Failed to write CSV: {0}")]
    Write(#[from] csv::Error),
}

impl IngestError {
    /// Whether the run aborted before mutating any state.
    ///
    /// Recoverable errors are reported and the process still exits zero.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound { .. } | Self::Schema { .. } | Self::Read(_) | Self::Combined(_)
        )
    }
}

// =============================================================================
// Validator Errors
// =============================================================================

/// Errors that prevent the validator from running its checks.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Combined file absent.
    #[error("Combined file not found at: {}", .0.display())]
    NotFound(PathBuf),

    /// Combined file could not be parsed.
    #[error("Failed to read CSV file: {0}")]
    Read(#[from] CsvError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for ingestion runs.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for validator runs.
pub type ValidateResult<T> = Result<T, ValidateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = IngestError::Schema {
            missing: vec!["Purpose".into(), "소분류".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Purpose"));
        assert!(msg.contains("소분류"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_error_not_recoverable() {
        let err: IngestError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_value_format() {
        let err = CsvError::InvalidValue {
            line: 5,
            column: "Roku".into(),
            value: "maybe".into(),
            message: "not a boolean".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'Roku'"));
        assert!(msg.contains("value 'maybe'"));
    }
}
