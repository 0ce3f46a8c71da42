//! Write-through record collection.
//!
//! The whole collection is serialized as one JSON array under a single key.
//! It is read once when the store is loaded and rewritten in full after every
//! accepted mutation; a mutation only sticks in memory once the write succeeded.

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;
use crate::legacy;
use consulta_core::{ConsultationContext, Cpf, Record, RecordId};
use serde_json::Value;
use std::sync::Arc;

/// Ordered, persisted collection of consultation records.
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    records: Vec<Record>,
    unreadable: Vec<Value>,
}

impl RecordStore {
    /// Load the collection stored under `key`, upgrading legacy records.
    ///
    /// A missing key yields an empty collection. When legacy records were
    /// upgraded, the collection is written back immediately. Entries that
    /// cannot be read are kept verbatim and written after the records on
    /// every save.
    ///
    /// # Errors
    /// Returns error if the medium cannot be read, the value is not a JSON
    /// array, or the write-back fails.
    pub async fn load(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();

        let entries = match kv.get(&key).await? {
            Some(raw) => match serde_json::from_str::<Value>(&raw)? {
                Value::Array(entries) => entries,
                Value::Null => Vec::new(),
                _ => return Err(StoreError::NotARecordList { key }),
            },
            None => Vec::new(),
        };

        let migration = legacy::migrate(entries);
        let write_back = migration.needs_write_back();
        let store = Self {
            kv,
            key,
            records: migration.records,
            unreadable: migration.unreadable,
        };

        if write_back {
            store.persist().await?;
        }

        tracing::debug!("Loaded {} record(s) from '{}'", store.records.len(), store.key);
        Ok(store)
    }

    /// All records in stored order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look a record up by id.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// The record for `identifier` within one consultation context.
    #[must_use]
    pub fn find_in_context(&self, identifier: &Cpf, context: ConsultationContext) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| &r.identifier == identifier && r.consultation_context == context)
    }

    /// Any record for `identifier`, preferring one in `preferred` context.
    #[must_use]
    pub fn find_any(&self, identifier: &Cpf, preferred: ConsultationContext) -> Option<&Record> {
        self.find_in_context(identifier, preferred)
            .or_else(|| self.records.iter().find(|r| &r.identifier == identifier))
    }

    /// Records submitted in one context, in stored order.
    pub fn in_context(&self, context: ConsultationContext) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(move |r| r.consultation_context == context)
    }

    /// Insert `record`, or replace the stored record with the same id, and persist.
    ///
    /// # Errors
    /// Returns error if the collection cannot be written; the in-memory
    /// collection is left as it was.
    pub async fn upsert(&mut self, record: Record) -> Result<()> {
        let id = record.id.clone();

        match self.records.iter().position(|r| r.id == id) {
            Some(index) => {
                let previous = std::mem::replace(&mut self.records[index], record);
                if let Err(e) = self.persist().await {
                    self.records[index] = previous;
                    return Err(e);
                }
                tracing::trace!("Replaced record {}", id);
            }
            None => {
                self.records.push(record);
                if let Err(e) = self.persist().await {
                    self.records.pop();
                    return Err(e);
                }
                tracing::trace!("Inserted record {}", id);
            }
        }

        Ok(())
    }

    /// Number of stored entries that could not be read as records.
    #[must_use]
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    /// Serialize the full collection, unreadable entries last, to the medium.
    async fn persist(&self) -> Result<()> {
        let mut entries = self
            .records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<Value>, _>>()?;
        entries.extend(self.unreadable.iter().cloned());

        let value = serde_json::to_string(&entries)?;
        self.kv.set(&self.key, &value).await
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("key", &self.key)
            .field("records", &self.records.len())
            .field("unreadable", &self.unreadable.len())
            .finish_non_exhaustive()
    }
}
