//! Shared types used across the consultation console.
//!
//! This module defines the validated identifier newtypes and the small enums
//! that every other crate speaks in.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Number of digits in a CPF.
pub const CPF_WIDTH: usize = 11;

/// A normalized CPF: exactly 11 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Strip every character but ASCII `0-9` and left-pad with zeros to 11 digits.
    ///
    /// Inputs with more than 11 digits come back unchanged in length; they are
    /// rejected by [`Cpf::parse`], never truncated.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        static NON_DIGIT: OnceLock<Regex> = OnceLock::new();
        let regex = NON_DIGIT.get_or_init(|| Regex::new(r"[^0-9]").expect("valid regex"));

        let digits = regex.replace_all(raw, "");
        format!("{digits:0>CPF_WIDTH$}")
    }

    /// Normalize and validate a raw identifier.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidIdentifier` when the normalized form is not
    /// exactly 11 digits long.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized = Self::normalize(raw);
        if normalized.len() == CPF_WIDTH {
            Ok(Self(normalized))
        } else {
            Err(CoreError::InvalidIdentifier {
                input: raw.to_string(),
                normalized,
            })
        }
    }

    /// Get the 11-digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as `000.000.000-00`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }
}

impl TryFrom<String> for Cpf {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque record identifier.
///
/// New records get a UUID v4. Records written by earlier versions of the
/// console carry other formats (millisecond timestamps, `batch-` prefixes),
/// so any non-empty string is accepted when loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing id.
    ///
    /// # Errors
    /// Returns error if the id is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidRecordId(
                "record id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Fresh UUID v4 id for a new record.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a record was submitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationContext {
    /// Single manual entry
    Individual,
    /// Bulk CSV import
    Batch,
}

impl ConsultationContext {
    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for ConsultationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consultation status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Waiting for (another) gateway attempt
    Pending,
    /// Gateway returned a usable result
    Success,
    /// Gateway failed or returned a negative result
    Error,
}

impl RecordStatus {
    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Portuguese label shown in listings and exports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Success => "Sucesso",
            Self::Error => "Erro",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UTC instant of a consultation.
///
/// Serialized as an RFC3339 string, the form stored collections use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wall-clock time now.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap a UTC datetime.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Borrow the UTC datetime.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse RFC3339 with any offset, normalizing to UTC.
    pub fn from_rfc3339(s: &str) -> Result<Self, CoreError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| CoreError::Validation(format!("invalid timestamp: {e}")))
    }

    /// RFC3339 rendering.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get milliseconds since Unix epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pads_short_input() {
        assert_eq!(Cpf::normalize("123"), "00000000123");
        assert_eq!(Cpf::normalize(""), "00000000000");
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(Cpf::normalize("123.456.789-09"), "12345678909");
        assert_eq!(Cpf::normalize(" 123 456 789 09 "), "12345678909");
    }

    #[test]
    fn test_normalize_drops_non_ascii_digits() {
        assert_eq!(Cpf::normalize("123.456.789-0٣9"), "12345678909");
        assert!(Cpf::parse("١٢٣٤٥٦٧٨٩٠٩").is_ok_and(|cpf| cpf.as_str() == "00000000000"));
    }

    #[test]
    fn test_normalize_does_not_truncate() {
        assert_eq!(Cpf::normalize("123456789012"), "123456789012");
    }

    #[test]
    fn test_parse_valid() {
        let cpf = Cpf::parse("123.456.789-09").expect("valid CPF");
        assert_eq!(cpf.as_str(), "12345678909");
        assert_eq!(Cpf::parse("123").expect("padded CPF").as_str(), "00000000123");
    }

    #[test]
    fn test_parse_rejects_long_input() {
        let err = Cpf::parse("1234.5678.9012").expect_err("12 digits rejected");
        match err {
            CoreError::InvalidIdentifier { normalized, .. } => {
                assert_eq!(normalized, "123456789012");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_always_yields_eleven_digits() {
        let inputs = ["", "1", "abc", "12-34", "999.999.999-99", "000000000000", "x1y2z3"];
        for input in inputs {
            match Cpf::parse(input) {
                Ok(cpf) => {
                    assert_eq!(cpf.as_str().len(), CPF_WIDTH, "input: {input}");
                    assert!(cpf.as_str().chars().all(|c| c.is_ascii_digit()));
                }
                Err(e) => assert!(matches!(e, CoreError::InvalidIdentifier { .. })),
            }
        }
    }

    #[test]
    fn test_cpf_formatted() {
        let cpf = Cpf::parse("12345678909").expect("valid CPF");
        assert_eq!(cpf.formatted(), "123.456.789-09");
    }

    #[test]
    fn test_cpf_serde_validates() {
        let cpf: Cpf = serde_json::from_str("\"12345678909\"").expect("deserialize CPF");
        assert_eq!(cpf.as_str(), "12345678909");
        assert!(serde_json::from_str::<Cpf>("\"123456789012\"").is_err());
    }

    #[test]
    fn test_record_id_generate() {
        let id1 = RecordId::generate();
        let id2 = RecordId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_id_accepts_legacy_formats() {
        assert!(RecordId::new("1714564800000").is_ok());
        assert!(RecordId::new("batch-1714564800000-3").is_ok());
        assert!(RecordId::new("").is_err());
        assert!(RecordId::new("   ").is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&RecordStatus::Success).expect("serialize status");
        assert_eq!(json, "\"success\"");
        let parsed: RecordStatus = serde_json::from_str("\"pending\"").expect("parse status");
        assert_eq!(parsed, RecordStatus::Pending);
        assert_eq!(RecordStatus::Error.label(), "Erro");
    }

    #[test]
    fn test_context_serialization() {
        let json = serde_json::to_string(&ConsultationContext::Batch).expect("serialize context");
        assert_eq!(json, "\"batch\"");
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::now();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::from_rfc3339(&s).expect("parse RFC3339 timestamp");
        assert_eq!(ts, parsed);
    }

    #[test]
    fn test_timestamp_accepts_javascript_iso_strings() {
        let ts = Timestamp::from_rfc3339("2024-05-01T12:30:00.000Z").expect("parse ISO string");
        assert_eq!(ts.timestamp_millis(), 1_714_566_600_000);
    }
}
