//! Consulta Gateway - client for the remote CPF lookup webhook.
//!
//! - [`LookupGateway`]: the single-call trait the consultation queue depends on
//! - [`HttpLookupGateway`]: `reqwest` implementation with a bounded timeout
//! - [`LookupResponse`] / [`LookupOutcome`]: raw answers and their classification

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod gateway;
pub mod http;
pub mod response;

pub use error::{GatewayError, Result};
pub use gateway::LookupGateway;
pub use http::HttpLookupGateway;
pub use response::{LookupFields, LookupOutcome, LookupResponse, APPROVED_MARKER};
