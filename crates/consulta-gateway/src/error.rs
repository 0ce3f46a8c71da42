//! Error types for the lookup gateway.
//!
//! Every variant is a transport-level failure. A well-formed negative answer
//! from the webhook is not an error; it is classified as
//! [`LookupOutcome::Rejected`](crate::LookupOutcome::Rejected).

use thiserror::Error;

/// Errors that can occur while calling the lookup webhook.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The webhook answered with a non-2xx status
    #[error("API error: status {status}, {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The response body was not JSON
    #[error("failed to parse response: {message}")]
    ParseError {
        /// What the decoder complained about
        message: String,
    },

    /// The call did not complete within the configured timeout
    #[error("request timed out after {seconds}s")]
    Timeout {
        /// Configured limit
        seconds: u64,
    },

    /// The request never got an HTTP answer (DNS, connect, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The HTTP client could not be built
    #[error("internal error: {0}")]
    Internal(String),
}

/// Shorthand for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;
