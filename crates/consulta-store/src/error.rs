//! Errors raised by the key-value medium and the record store.

use thiserror::Error;

/// Everything that can fail while loading or saving the record collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened or created.
    #[error("failed to open database: {0}")]
    Open(String),

    /// The embedded schema could not be applied.
    #[error("schema migration failed: {0}")]
    Migration(String),

    /// A value could not be written to the medium.
    #[error("write to '{key}' failed: {reason}")]
    Write {
        /// Key being written
        key: String,
        /// Why the write failed
        reason: String,
    },

    /// The record list could not be encoded or decoded as JSON.
    #[error("record JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored collection is not a JSON array.
    #[error("stored value under '{key}' is not a record list")]
    NotARecordList {
        /// Key that was read
        key: String,
    },

    /// A query against the `SQLite` medium failed.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Creating the data directory failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
