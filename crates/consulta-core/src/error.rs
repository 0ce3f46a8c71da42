//! Core error types for the consultation console.
//!
//! `CoreError` covers everything that can go wrong before a record reaches the
//! queue: identifier validation, malformed ids and configuration problems.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The submitted identifier does not normalize to exactly 11 digits.
    #[error("invalid CPF '{input}': expected 11 digits, got '{normalized}'")]
    InvalidIdentifier {
        /// Raw input as submitted
        input: String,
        /// Result of stripping and padding the input
        normalized: String,
    },

    /// A record id was empty or otherwise unusable.
    #[error("invalid record id: {0}")]
    InvalidRecordId(String),

    /// Settings could not be loaded or saved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before it reached the queue.
    #[error("validation error: {0}")]
    Validation(String),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems loading, validating or saving `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home or data directory could be resolved for this user.
    #[error("no per-user config directory available on this platform")]
    NoConfigDir,

    /// `config.toml` is not valid TOML or has fields of the wrong type.
    #[error("malformed config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The in-memory settings could not be written back as TOML.
    #[error("could not encode settings as TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Reading or writing the config file failed.
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A setting parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Dotted setting name, e.g. `queue.max_retries`
        field: String,
        /// Why it was refused
        reason: String,
    },
}

/// Shorthand for results carrying a [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Shorthand for config loading and saving.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
