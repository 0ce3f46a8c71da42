//! Error types for consultation processing.

use consulta_core::CoreError;
use consulta_store::StoreError;
use thiserror::Error;

/// Errors surfaced by [`Consultation`](crate::Consultation).
///
/// Gateway problems never appear here: they are absorbed into the record's
/// status by the reconciler.
#[derive(Error, Debug)]
pub enum ConsultationError {
    /// Identifier validation or other core failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The record collection could not be persisted
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for consultation operations.
pub type Result<T> = std::result::Result<T, ConsultationError>;
