//! FIFO of records awaiting a gateway attempt, with the pacing state.

use consulta_core::{QueueConfig, Record, RecordId};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Pacing and retry limits applied by the consultation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Minimum spacing between two gateway calls
    pub interval: Duration,
    /// Automatic attempts allowed before a pending record is left exhausted
    pub max_retries: u32,
}

impl QueuePolicy {
    /// Policy built from the `[queue]` configuration section.
    #[must_use]
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            interval: config.request_interval(),
            max_retries: config.max_retries,
        }
    }
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self::from_config(&QueueConfig::default())
    }
}

/// Records waiting for the gateway, in arrival order.
///
/// The queue holds snapshots; the loop re-reads the stored record by id when
/// it dispatches, so a reset made while queued is honored.
#[derive(Debug, Default)]
pub struct ConsultationQueue {
    items: VecDeque<Record>,
    last_attempt_at: Option<Instant>,
    is_processing: bool,
}

impl ConsultationQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless one with the same id is already queued.
    ///
    /// Returns whether the record was added.
    pub fn enqueue(&mut self, record: Record) -> bool {
        if self.contains(&record.id) {
            tracing::trace!("Record {} already queued", record.id);
            return false;
        }
        tracing::debug!("Queued CPF {} (record {})", record.identifier, record.id);
        self.items.push_back(record);
        true
    }

    /// Remaining wait before the next gateway call may start.
    ///
    /// `None` when no attempt has been made yet or `interval` has already
    /// elapsed since the last one.
    #[must_use]
    pub fn ready_in(&self, now: Instant, interval: Duration) -> Option<Duration> {
        let last = self.last_attempt_at?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < interval).then(|| interval - elapsed)
    }

    /// Take the oldest queued record.
    pub fn pop_front(&mut self) -> Option<Record> {
        self.items.pop_front()
    }

    /// Record that a gateway call completed at `now`.
    pub fn mark_attempt(&mut self, now: Instant) {
        self.last_attempt_at = Some(now);
    }

    /// Time of the last completed gateway call.
    #[must_use]
    pub fn last_attempt_at(&self) -> Option<Instant> {
        self.last_attempt_at
    }

    /// Number of queued records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a record with `id` is queued.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.items.iter().any(|r| &r.id == id)
    }

    /// Drop every queued record. Pacing state is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the consultation loop is draining this queue.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub(crate) fn set_processing(&mut self, processing: bool) {
        self.is_processing = processing;
    }
}
