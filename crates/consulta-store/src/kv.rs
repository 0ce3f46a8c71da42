//! The key-value medium the record collection is persisted to.

use crate::error::Result;
use async_trait::async_trait;

/// String key-value storage with whole-value overwrite semantics.
///
/// Implementations must be thread-safe (Send + Sync); the record store holds
/// them behind an `Arc` and may be moved into a background task.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
