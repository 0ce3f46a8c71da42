//! In-process key-value medium for tests and throwaway runs.

use crate::error::Result;
use crate::kv::KeyValueStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// `HashMap`-backed [`KeyValueStore`]. Contents vanish with the value.
///
/// A poisoned lock is recovered; each entry is replaced whole, so a panic
/// elsewhere cannot leave one half-written.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        store
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("clients").await.expect("get"), None);

        store.set("clients", "[]").await.expect("set");
        assert_eq!(store.get("clients").await.expect("get"), Some("[]".to_string()));

        store.set("clients", "[1]").await.expect("overwrite");
        assert_eq!(store.get("clients").await.expect("get"), Some("[1]".to_string()));
    }

    #[tokio::test]
    async fn test_with_entry() {
        let store = MemoryKvStore::with_entry("k", "v");
        assert_eq!(store.get("k").await.expect("get"), Some("v".to_string()));
    }
}
