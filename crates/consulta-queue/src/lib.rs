//! Consulta Queue - paced consultation of queued identifiers.
//!
//! [`Consultation`] owns the record store, a FIFO [`ConsultationQueue`] and a
//! [`LookupGateway`](consulta_gateway::LookupGateway). It dispatches one
//! lookup at a time, at least [`QueuePolicy::interval`] apart, and merges
//! each answer into the record with [`reconcile`].
//!
//! # Example
//!
//! ```rust,no_run
//! use consulta_core::ConsultationContext;
//! use consulta_gateway::HttpLookupGateway;
//! use consulta_queue::{Consultation, QueuePolicy};
//! use consulta_store::{MemoryKvStore, RecordStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RecordStore::load(Arc::new(MemoryKvStore::new()), "clients").await?;
//! let gateway = HttpLookupGateway::new(&Default::default())?;
//! let mut consultation = Consultation::new(store, Arc::new(gateway), QueuePolicy::default());
//!
//! consultation.submit("123.456.789-09", ConsultationContext::Individual).await?;
//! let summary = consultation.run().await?;
//! println!("{} processed", summary.processed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod consultation;
pub mod error;
pub mod queue;
pub mod reconcile;

pub use consultation::{Consultation, ImportReport, RunSummary};
pub use error::{ConsultationError, Result};
pub use queue::{ConsultationQueue, QueuePolicy};
pub use reconcile::{reconcile, ReconcileOutcome, Reconciliation};
