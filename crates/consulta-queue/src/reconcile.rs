//! Merging one gateway answer into a record.
//!
//! [`reconcile`] is pure: it takes the record as it was before the call and
//! returns the updated record together with what the loop should do next.
//! Result fields are sticky: a new value replaces the old one, a missing
//! value never erases a known one.

use consulta_core::{Record, RecordStatus, Timestamp};
use consulta_gateway::{GatewayError, LookupFields, LookupOutcome, LookupResponse};

/// Error message stored when the gateway rejects without saying why.
pub const DEFAULT_REJECTION: &str = "CPF não encontrado na base de dados.";

/// Situation stored for approved lookups that carry none.
pub const DEFAULT_SITUATION: &str = "Regular";

/// Approved value stored for approved lookups that carry none.
pub const DEFAULT_APPROVED_VALUE: &str = "R$ 0,00";

/// What happened to a record after one gateway step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Record now holds a result
    Succeeded,
    /// Gateway answered negatively
    Rejected,
    /// Result not ready; the record goes back into the queue
    Retry,
    /// Result not ready and the retry cap is reached
    Exhausted,
    /// The gateway could not be reached or answered garbage
    GatewayFailure,
}

/// Updated record plus the follow-up decision.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Record to persist
    pub record: Record,
    /// Follow-up decision
    pub outcome: ReconcileOutcome,
}

/// Apply a gateway result to `record`.
#[must_use]
pub fn reconcile(
    mut record: Record,
    result: Result<LookupResponse, GatewayError>,
    now: Timestamp,
    max_retries: u32,
) -> Reconciliation {
    record.consultation_timestamp = now;

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            let message = err.to_string();
            record.status = RecordStatus::Error;
            record.response_log = Some(
                serde_json::json!({
                    "error": message,
                    "timestamp": now.to_rfc3339(),
                })
                .to_string(),
            );
            record.error_message = Some(message);
            bump_retry(&mut record, max_retries);
            return Reconciliation {
                record,
                outcome: ReconcileOutcome::GatewayFailure,
            };
        }
    };

    record.response_log = Some(response.to_log());

    let outcome = match response.classify() {
        LookupOutcome::Approved(fields) => {
            apply_fields(&mut record, fields);
            record
                .situation
                .get_or_insert_with(|| DEFAULT_SITUATION.to_string());
            record
                .approved_value
                .get_or_insert_with(|| DEFAULT_APPROVED_VALUE.to_string());
            record.status = RecordStatus::Success;
            record.error_message = None;
            ReconcileOutcome::Succeeded
        }
        LookupOutcome::Found(fields) => {
            apply_fields(&mut record, fields);
            record.status = RecordStatus::Success;
            record.error_message = None;
            bump_retry(&mut record, max_retries);
            ReconcileOutcome::Succeeded
        }
        LookupOutcome::Pending => {
            record.status = RecordStatus::Pending;
            bump_retry(&mut record, max_retries);
            if record.retry_count < max_retries {
                ReconcileOutcome::Retry
            } else {
                ReconcileOutcome::Exhausted
            }
        }
        LookupOutcome::Rejected { message } => {
            record.status = RecordStatus::Error;
            record.error_message = Some(message.unwrap_or_else(|| DEFAULT_REJECTION.to_string()));
            bump_retry(&mut record, max_retries);
            ReconcileOutcome::Rejected
        }
    };

    Reconciliation { record, outcome }
}

fn bump_retry(record: &mut Record, max_retries: u32) {
    record.retry_count = record.retry_count.saturating_add(1).min(max_retries);
}

fn apply_fields(record: &mut Record, fields: LookupFields) {
    keep_or_replace(&mut record.name, fields.name);
    keep_or_replace(&mut record.birth_date, fields.birth_date);
    keep_or_replace(&mut record.situation, fields.situation);
    keep_or_replace(&mut record.approved_value, fields.approved_value);
    keep_or_replace(&mut record.bank, fields.bank);
}

fn keep_or_replace(slot: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}
