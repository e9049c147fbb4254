//! Error types for sensor preprocessing operations.
//!
//! Every failure is a caller contract violation detected before any numeric
//! work starts, so no operation ever returns partial output.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for preprocessing operations.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// Window, filter or imputation parameters are out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A referenced column does not exist, or name lists disagree.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Data has the wrong dimensionality or inconsistent lengths.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Reading a recording from disk failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected a recording.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV cell could not be parsed as a number.
    #[error("Cannot parse {value:?} as a number (row {row}, column {column:?})")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessError>;

impl PreprocessError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a schema mismatch error.
    #[must_use]
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create an invalid shape error.
    #[must_use]
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Create an I/O error bound to the path that failed.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a cell parse error.
    #[must_use]
    pub fn parse(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parse {
            row,
            column: column.into(),
            value: value.into(),
        }
    }
}
