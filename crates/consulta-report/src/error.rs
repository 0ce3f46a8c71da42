//! Error types for import, export and reporting.

use thiserror::Error;

/// Errors from reading or writing report files.
#[derive(Error, Debug)]
pub enum ReportError {
    /// CSV encoding or decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The import file is not valid UTF-8 text
    #[error("file {path} is not UTF-8 text")]
    NotText {
        /// Offending file
        path: String,
    },

    /// A date argument could not be parsed
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate {
        /// Raw input
        input: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
