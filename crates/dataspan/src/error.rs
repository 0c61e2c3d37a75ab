//! Error types for the dataspan library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dataspan operations.
///
/// Only file-level failures surface here. Individual cells that fail to parse
/// are absorbed by the aggregators and never become errors.
#[derive(Debug, Error)]
pub enum DataspanError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error opening or reading a spreadsheet workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Invalid configuration, such as a header pattern that does not compile.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for dataspan operations.
pub type Result<T> = std::result::Result<T, DataspanError>;
