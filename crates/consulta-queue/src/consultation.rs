//! The consultation loop: submission, batch merge, paced dispatch.

use crate::error::Result;
use crate::queue::{ConsultationQueue, QueuePolicy};
use crate::reconcile::{reconcile, ReconcileOutcome};
use consulta_core::{ConsultationContext, Cpf, Record, Timestamp};
use consulta_gateway::LookupGateway;
use consulta_store::RecordStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counts reported by [`Consultation::import_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// New records created
    pub inserted: usize,
    /// Existing records reset for another round
    pub reconsulted: usize,
    /// Candidates repeating an identifier seen earlier in the same import
    pub duplicates: usize,
}

impl ImportReport {
    /// Records queued by the import.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.inserted + self.reconsulted
    }
}

/// Counts reported by one [`Consultation::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Gateway steps performed
    pub processed: usize,
    /// Records that now hold a result
    pub succeeded: usize,
    /// Records marked `error` by a negative answer
    pub rejected: usize,
    /// Records marked `error` by a gateway failure
    pub gateway_failures: usize,
    /// Pending answers sent back into the queue
    pub requeued: usize,
    /// Pending answers that hit the retry cap
    pub exhausted: usize,
    /// Whether the run ended because of [`Consultation::stop`]
    pub stopped: bool,
}

impl RunSummary {
    fn count(&mut self, outcome: ReconcileOutcome) {
        self.processed += 1;
        match outcome {
            ReconcileOutcome::Succeeded => self.succeeded += 1,
            ReconcileOutcome::Rejected => self.rejected += 1,
            ReconcileOutcome::GatewayFailure => self.gateway_failures += 1,
            ReconcileOutcome::Retry => self.requeued += 1,
            ReconcileOutcome::Exhausted => self.exhausted += 1,
        }
    }
}

/// Owns the record collection, the queue and the gateway.
///
/// Every mutation goes through `&mut self`, so only one step runs at a time
/// and the store needs no locking. Gateway calls are spaced by at least
/// [`QueuePolicy::interval`].
pub struct Consultation {
    store: RecordStore,
    queue: ConsultationQueue,
    gateway: Arc<dyn LookupGateway>,
    policy: QueuePolicy,
    cancel: CancellationToken,
}

impl Consultation {
    /// Create a consultation over a loaded store.
    #[must_use]
    pub fn new(store: RecordStore, gateway: Arc<dyn LookupGateway>, policy: QueuePolicy) -> Self {
        Self {
            store,
            queue: ConsultationQueue::new(),
            gateway,
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// The record collection.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The queue.
    #[must_use]
    pub fn queue(&self) -> &ConsultationQueue {
        &self.queue
    }

    /// Active pacing and retry policy.
    #[must_use]
    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }

    /// Submit one identifier typed by the user.
    ///
    /// An existing record for the same identifier and context is reset for a
    /// new round; otherwise a new record is created. The record is persisted
    /// and queued but not processed until [`run`](Self::run).
    ///
    /// # Errors
    /// Returns `InvalidIdentifier` for input that does not normalize to 11
    /// digits (nothing is created), or a store error if persisting fails.
    pub async fn submit(&mut self, raw: &str, context: ConsultationContext) -> Result<Record> {
        let cpf = Cpf::parse(raw)?;

        let record = match self.store.find_in_context(&cpf, context) {
            Some(existing) => {
                let mut record = existing.clone();
                record.reset_for_reconsultation(context);
                info!("Resubmitting CPF {} (record {})", cpf, record.id);
                record
            }
            None => {
                let record = Record::new(cpf, context);
                info!("New {} consultation for CPF {}", context, record.identifier);
                record
            }
        };

        self.store.upsert(record.clone()).await?;
        self.queue.enqueue(record.clone());
        Ok(record)
    }

    /// Merge batch candidates into the collection and queue them.
    ///
    /// A candidate whose identifier already has a record (a `batch` record is
    /// preferred over an `individual` one) resets that record instead of
    /// creating a second one.
    ///
    /// # Errors
    /// Returns error if persisting a record fails; candidates merged before
    /// the failure stay merged.
    pub async fn import_batch(
        &mut self,
        candidates: impl IntoIterator<Item = Record>,
    ) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut seen = HashSet::new();

        for candidate in candidates {
            if !seen.insert(candidate.identifier.clone()) {
                debug!("CPF {} repeated in batch, skipping", candidate.identifier);
                report.duplicates += 1;
                continue;
            }

            let record = match self
                .store
                .find_any(&candidate.identifier, ConsultationContext::Batch)
            {
                Some(existing) => {
                    let mut record = existing.clone();
                    record.reset_for_reconsultation(ConsultationContext::Batch);
                    report.reconsulted += 1;
                    record
                }
                None => {
                    report.inserted += 1;
                    candidate
                }
            };

            self.store.upsert(record.clone()).await?;
            self.queue.enqueue(record);
        }

        info!(
            "Batch import: {} new, {} reconsulted, {} duplicate(s)",
            report.inserted, report.reconsulted, report.duplicates
        );
        Ok(report)
    }

    /// Queue every stored `pending` record that still has attempts left.
    ///
    /// Returns the number of records queued.
    pub fn resume_pending(&mut self) -> usize {
        let max_retries = self.policy.max_retries;
        let waiting: Vec<Record> = self
            .store
            .records()
            .iter()
            .filter(|r| r.is_pending() && r.retry_count < max_retries)
            .cloned()
            .collect();

        let mut queued = 0;
        for record in waiting {
            if self.queue.enqueue(record) {
                queued += 1;
            }
        }

        if queued > 0 {
            info!("Resuming {} pending record(s)", queued);
        }
        queued
    }

    /// Drain the queue, pacing gateway calls.
    ///
    /// Returns when the queue is empty or the cancellation token fires.
    /// Gateway failures are recorded on the affected record and never end the
    /// run.
    ///
    /// # Errors
    /// Returns error only if a reconciled record cannot be persisted.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        self.queue.set_processing(true);
        let result = self.drain(&mut summary).await;
        self.queue.set_processing(false);

        result?;
        info!(
            "Run finished: {} processed, {} succeeded, {} left queued{}",
            summary.processed,
            summary.succeeded,
            self.queue.len(),
            if summary.stopped { " (stopped)" } else { "" }
        );
        Ok(summary)
    }

    /// Abandon any scheduled resumption. A gateway call already in flight
    /// completes and is reconciled first.
    pub fn stop(&self) {
        debug!("Stop requested");
        self.cancel.cancel();
    }

    /// Handle that stops the loop from another task while `run` holds `&mut self`.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn drain(&mut self, summary: &mut RunSummary) -> Result<()> {
        loop {
            if self.cancel.is_cancelled() {
                summary.stopped = true;
                return Ok(());
            }

            if self.queue.is_empty() {
                return Ok(());
            }

            if let Some(wait) = self.queue.ready_in(Instant::now(), self.policy.interval) {
                debug!("Deferring next consultation by {:?}", wait);
                if !self.pause(wait).await {
                    summary.stopped = true;
                    return Ok(());
                }
                continue;
            }

            let Some(queued) = self.queue.pop_front() else {
                return Ok(());
            };

            let outcome = self.step(queued).await?;
            summary.count(outcome);

            if !self.queue.is_empty() && !self.pause(self.policy.interval).await {
                summary.stopped = true;
                return Ok(());
            }
        }
    }

    /// One gateway call plus reconciliation and persistence.
    async fn step(&mut self, queued: Record) -> Result<ReconcileOutcome> {
        let record = self.store.get(&queued.id).cloned().unwrap_or(queued);

        info!("Consulting CPF {} via {}", record.identifier, self.gateway.gateway_id());
        let result = self.gateway.lookup(&record.identifier).await;
        self.queue.mark_attempt(Instant::now());

        if let Err(e) = &result {
            warn!("Lookup for CPF {} failed: {}", record.identifier, e);
        }

        let reconciliation = reconcile(record, result, Timestamp::now(), self.policy.max_retries);
        let outcome = reconciliation.outcome;
        let record = reconciliation.record;

        debug!(
            "CPF {} -> {} ({:?}, attempt {})",
            record.identifier, record.status, outcome, record.retry_count
        );

        self.store.upsert(record.clone()).await?;

        match outcome {
            ReconcileOutcome::Retry => {
                self.queue.enqueue(record);
            }
            ReconcileOutcome::Exhausted => {
                warn!(
                    "CPF {} still pending after {} attempts, giving up",
                    record.identifier, record.retry_count
                );
            }
            _ => {}
        }

        Ok(outcome)
    }

    /// Sleep for `duration` unless stopped first. Returns false when stopped.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => {
                debug!("Pending resumption cancelled");
                false
            }
            () = tokio::time::sleep(duration) => true,
        }
    }
}

impl std::fmt::Debug for Consultation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consultation")
            .field("store", &self.store)
            .field("queue", &self.queue)
            .field("gateway", &self.gateway.gateway_id())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
