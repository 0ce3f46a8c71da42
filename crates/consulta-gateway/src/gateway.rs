//! The lookup gateway trait.

use crate::error::Result;
use crate::response::LookupResponse;
use async_trait::async_trait;
use consulta_core::Cpf;

/// A single-call interface to the remote lookup service.
///
/// Implementations should be thread-safe (Send + Sync) for use in async
/// contexts. A call either yields the webhook's answer, whatever its shape,
/// or a [`GatewayError`](crate::GatewayError) for transport-level failures.
#[async_trait]
pub trait LookupGateway: Send + Sync {
    /// Look up one normalized identifier.
    ///
    /// # Errors
    /// Returns error on network failure, timeout, non-2xx status or a body
    /// that is not JSON.
    async fn lookup(&self, cpf: &Cpf) -> Result<LookupResponse>;

    /// Short name used in logs.
    fn gateway_id(&self) -> &str;
}
