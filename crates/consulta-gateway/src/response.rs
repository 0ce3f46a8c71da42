//! Webhook responses and their classification.
//!
//! The webhook answers with a loosely-typed JSON object. [`LookupResponse`]
//! keeps the raw value for the response log; [`LookupResponse::classify`]
//! turns it into a [`LookupOutcome`] by checking, in order: the `codigo`
//! marker, the `success` flag, the `pending` flag. Anything else is a
//! rejection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of `codigo` that marks an approved lookup.
pub const APPROVED_MARKER: &str = "SIM";

/// Raw answer from the lookup webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupResponse(Value);

impl LookupResponse {
    /// Wrap a decoded JSON body.
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The decoded body as received.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Compact JSON rendering for the record's response log.
    #[must_use]
    pub fn to_log(&self) -> String {
        self.0.to_string()
    }

    /// Classify the response into one of the recognized outcome shapes.
    #[must_use]
    pub fn classify(&self) -> LookupOutcome {
        let Some(body) = self.body() else {
            return LookupOutcome::Rejected { message: None };
        };

        let codigo = text_field(body, &["codigo"]);
        if codigo.as_deref().map(str::trim) == Some(APPROVED_MARKER) {
            return LookupOutcome::Approved(LookupFields::from_body(body));
        }

        if flag_field(body, "success") {
            return LookupOutcome::Found(LookupFields::from_body(body));
        }

        if flag_field(body, "pending") {
            return LookupOutcome::Pending;
        }

        LookupOutcome::Rejected {
            message: text_field(body, &["message", "error"]),
        }
    }

    /// The object carrying the fields. Webhook tooling sometimes wraps a
    /// single object in an array.
    fn body(&self) -> Option<&serde_json::Map<String, Value>> {
        match &self.0 {
            Value::Object(map) => Some(map),
            Value::Array(items) => items.first().and_then(Value::as_object),
            _ => None,
        }
    }
}

/// Result fields a successful lookup may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFields {
    /// Holder name
    pub name: Option<String>,
    /// Holder birth date
    pub birth_date: Option<String>,
    /// Registration situation
    pub situation: Option<String>,
    /// Approved credit value (`approvedValue` or `valorliberado`)
    pub approved_value: Option<String>,
    /// Bank (`bank` or `banco`)
    pub bank: Option<String>,
}

impl LookupFields {
    fn from_body(body: &serde_json::Map<String, Value>) -> Self {
        Self {
            name: text_field(body, &["name"]),
            birth_date: text_field(body, &["birthDate"]),
            situation: text_field(body, &["situation"]),
            approved_value: text_field(body, &["approvedValue", "valorliberado"]),
            bank: text_field(body, &["bank", "banco"]),
        }
    }
}

/// Recognized response shapes, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// `codigo == "SIM"`: approved, defaults apply to missing fields
    Approved(LookupFields),
    /// `success == true`: result found
    Found(LookupFields),
    /// `pending == true`: result not ready yet
    Pending,
    /// Anything else: not found or failed validation
    Rejected {
        /// Message supplied by the webhook, if any
        message: Option<String>,
    },
}

impl LookupOutcome {
    /// Whether the outcome carries a usable result.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Approved(_) | Self::Found(_))
    }
}

/// First non-empty textual value among `keys`. Numbers are rendered as text.
fn text_field(body: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn flag_field(body: &serde_json::Map<String, Value>, key: &str) -> bool {
    match body.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: Value) -> LookupOutcome {
        LookupResponse::new(value).classify()
    }

    #[test]
    fn test_codigo_marker_wins_over_success_flag() {
        let outcome = classify(json!({ "codigo": "SIM", "success": false, "name": "Ana" }));
        match outcome {
            LookupOutcome::Approved(fields) => assert_eq!(fields.name.as_deref(), Some("Ana")),
            other => panic!("expected Approved, got {other:?}"),
        }
    }

    #[test]
    fn test_success_flag() {
        let outcome = classify(json!({ "success": true, "name": "Maria", "bank": "X" }));
        assert_eq!(
            outcome,
            LookupOutcome::Found(LookupFields {
                name: Some("Maria".to_string()),
                bank: Some("X".to_string()),
                ..LookupFields::default()
            })
        );
    }

    #[test]
    fn test_success_wins_over_pending() {
        let outcome = classify(json!({ "success": true, "pending": true }));
        assert!(matches!(outcome, LookupOutcome::Found(_)));
    }

    #[test]
    fn test_pending_flag() {
        assert_eq!(classify(json!({ "pending": true })), LookupOutcome::Pending);
        assert_eq!(classify(json!({ "pending": "true" })), LookupOutcome::Pending);
    }

    #[test]
    fn test_rejected_with_message() {
        assert_eq!(
            classify(json!({ "success": false, "message": "CPF inexistente" })),
            LookupOutcome::Rejected {
                message: Some("CPF inexistente".to_string())
            }
        );
        assert_eq!(
            classify(json!({ "error": "limite excedido" })),
            LookupOutcome::Rejected {
                message: Some("limite excedido".to_string())
            }
        );
    }

    #[test]
    fn test_rejected_without_message() {
        assert_eq!(
            classify(json!({ "codigo": "NAO" })),
            LookupOutcome::Rejected { message: None }
        );
        assert_eq!(classify(json!("ok")), LookupOutcome::Rejected { message: None });
        assert_eq!(classify(json!([])), LookupOutcome::Rejected { message: None });
    }

    #[test]
    fn test_alternate_field_names() {
        let outcome = classify(json!({ "codigo": "SIM", "valorliberado": 1500.5, "banco": "Y" }));
        match outcome {
            LookupOutcome::Approved(fields) => {
                assert_eq!(fields.approved_value.as_deref(), Some("1500.5"));
                assert_eq!(fields.bank.as_deref(), Some("Y"));
            }
            other => panic!("expected Approved, got {other:?}"),
        }
    }

    #[test]
    fn test_array_wrapped_body() {
        let outcome = classify(json!([{ "success": true, "name": "Maria" }]));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let outcome = classify(json!({ "success": true, "name": "  ", "bank": "" }));
        assert_eq!(outcome, LookupOutcome::Found(LookupFields::default()));
    }

    #[test]
    fn test_log_is_raw_json() {
        let response = LookupResponse::new(json!({ "pending": true }));
        assert_eq!(response.to_log(), r#"{"pending":true}"#);
    }
}
