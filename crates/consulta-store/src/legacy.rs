//! One-time upgrade of record collections written by older console versions.
//!
//! Early collections lack `consultationType`, and the first prototype stored
//! `regular`/`irregular` statuses and a `lastConsultation` date. Records are
//! upgraded in place at load time so the rest of the system only ever sees the
//! current shape.

use consulta_core::Record;
use serde_json::{Map, Value};

/// Result of upgrading a raw collection.
#[derive(Debug, Default)]
pub struct Migration {
    /// Records that parsed (after upgrade), in stored order
    pub records: Vec<Record>,
    /// Number of records that needed an upgrade
    pub upgraded: usize,
    /// Entries that could not be read, kept verbatim so they survive rewrites
    pub unreadable: Vec<Value>,
}

impl Migration {
    /// Whether upgraded records should be rewritten right away.
    ///
    /// Unreadable entries alone never trigger a rewrite.
    #[must_use]
    pub fn needs_write_back(&self) -> bool {
        self.upgraded > 0
    }
}

/// Upgrade and parse every entry of a stored JSON array.
#[must_use]
pub fn migrate(entries: Vec<Value>) -> Migration {
    let mut migration = Migration::default();

    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(mut object) = entry else {
            tracing::warn!("Keeping unreadable stored entry {} as is (not an object)", index);
            migration.unreadable.push(entry);
            continue;
        };

        let original = object.clone();
        let upgraded = upgrade(&mut object);

        match serde_json::from_value::<Record>(Value::Object(object)) {
            Ok(record) => {
                if upgraded {
                    migration.upgraded += 1;
                }
                migration.records.push(record);
            }
            Err(e) => {
                tracing::warn!("Keeping unreadable stored record {} as is: {}", index, e);
                migration.unreadable.push(Value::Object(original));
            }
        }
    }

    if migration.upgraded > 0 {
        tracing::info!("Upgraded {} legacy record(s)", migration.upgraded);
    }

    migration
}

/// Bring one raw record up to the current shape. Returns whether anything changed.
fn upgrade(object: &mut Map<String, Value>) -> bool {
    let mut changed = false;

    if is_missing(object, "consultationType") {
        let context = infer_context(object.get("id").and_then(Value::as_str));
        object.insert("consultationType".to_string(), Value::from(context));
        changed = true;
    }

    if is_missing(object, "consultationDate") {
        if let Some(date) = object.get("lastConsultation").cloned() {
            object.insert("consultationDate".to_string(), date);
            changed = true;
        }
    }

    let legacy_status = match object.get("status").and_then(Value::as_str) {
        Some("regular") => Some("success"),
        Some("irregular") => Some("error"),
        _ => None,
    };
    if let Some(status) = legacy_status {
        object.insert("status".to_string(), Value::from(status));
        changed = true;
    }

    changed
}

fn is_missing(object: &Map<String, Value>, field: &str) -> bool {
    object.get(field).map_or(true, Value::is_null)
}

/// Context implied by the id naming convention of older versions.
fn infer_context(id: Option<&str>) -> &'static str {
    match id {
        Some(id) if id.to_ascii_lowercase().starts_with("batch") => "batch",
        _ => "individual",
    }
}
