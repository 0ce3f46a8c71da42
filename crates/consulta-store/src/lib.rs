//! Consulta Store - persistence for consultation records.
//!
//! Records are kept as one JSON array under a single key of a string
//! key-value medium. Every save rewrites the whole array.
//!
//! # Architecture
//!
//! - **Medium** ([`kv`]): the [`KeyValueStore`] trait with `get`/`set` semantics
//! - **Backends**: [`SqliteKvStore`] (file-backed, `SQLx` migrations) and [`MemoryKvStore`]
//! - **Records** ([`records`]): the write-through [`RecordStore`]
//! - **Legacy** ([`legacy`]): load-time upgrade of collections from older versions
//!
//! # Example
//!
//! ```ignore
//! use consulta_store::{RecordStore, SqliteKvStore};
//! use std::sync::Arc;
//!
//! let kv = Arc::new(SqliteKvStore::open("consulta.db").await?);
//! let store = RecordStore::load(kv, "clients").await?;
//! println!("{} records on file", store.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod kv;
pub mod legacy;
pub mod memory;
pub mod records;
pub mod sqlite;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use kv::KeyValueStore;
pub use memory::MemoryKvStore;
pub use records::RecordStore;
pub use sqlite::SqliteKvStore;
