//! Consulta Core - Foundation crate for the CPF consultation console.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other Consulta crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`Cpf`, `RecordId`, `RecordStatus`, `Timestamp`)
//! - [`record`] - The persisted consultation [`Record`]
//!
//! # Example
//!
//! ```rust
//! use consulta_core::{ConsultationContext, Cpf, Record};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cpf = Cpf::parse("123.456.789-09")?;
//! assert_eq!(cpf.as_str(), "12345678909");
//!
//! let record = Record::new(cpf, ConsultationContext::Individual);
//! assert!(record.is_pending());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod record;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, ExportConfig, GatewayConfig, QueueConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use record::Record;
pub use types::{ConsultationContext, Cpf, RecordId, RecordStatus, Timestamp, CPF_WIDTH};
