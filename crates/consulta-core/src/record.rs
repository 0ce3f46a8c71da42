//! The consultation record persisted for every identifier.

use crate::types::{ConsultationContext, Cpf, RecordId, RecordStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// One identifier's consultation history in a given context.
///
/// Serialized with camelCase field names, the layout stored collections
/// already use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Assigned at creation, never reassigned
    pub id: RecordId,
    /// Normalized CPF, immutable after creation
    #[serde(rename = "cpf")]
    pub identifier: Cpf,
    /// Current status
    pub status: RecordStatus,
    /// Submission origin
    #[serde(rename = "consultationType")]
    pub consultation_context: ConsultationContext,
    /// Time of the most recent attempt
    #[serde(rename = "consultationDate")]
    pub consultation_timestamp: Timestamp,
    /// Failed or still-pending attempts since the last (re)submission
    #[serde(default)]
    pub retry_count: u32,
    /// Holder name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Holder birth date as returned by the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Registration situation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    /// Approved credit value, formatted text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_value: Option<String>,
    /// Bank offering the credit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    /// Failure description for `error` records
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Raw payload of the most recent attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_log: Option<String>,
}

impl Record {
    /// A fresh `pending` record.
    #[must_use]
    pub fn new(identifier: Cpf, context: ConsultationContext) -> Self {
        Self {
            id: RecordId::generate(),
            identifier,
            status: RecordStatus::Pending,
            consultation_context: context,
            consultation_timestamp: Timestamp::now(),
            retry_count: 0,
            name: None,
            birth_date: None,
            situation: None,
            approved_value: None,
            bank: None,
            error_message: None,
            response_log: None,
        }
    }

    /// A batch-import candidate, optionally carrying a display name from the file.
    #[must_use]
    pub fn batch_candidate(identifier: Cpf, name: Option<String>) -> Self {
        Self {
            name,
            ..Self::new(identifier, ConsultationContext::Batch)
        }
    }

    /// Put the record back into `pending` for a fresh round of attempts.
    ///
    /// Result fields are kept; they are only replaced when a new result arrives.
    pub fn reset_for_reconsultation(&mut self, context: ConsultationContext) {
        self.status = RecordStatus::Pending;
        self.retry_count = 0;
        self.consultation_context = context;
    }

    /// Whether the record is waiting for a gateway attempt.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RecordStatus::Pending
    }

    /// Whether the record holds a usable result.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }
}
