//! Reading batch files of identifiers.
//!
//! One identifier per line, optionally followed by a display name, separated
//! by `,` or `;`. A first line mentioning "cpf" is treated as a header.

use crate::error::{ReportError, Result};
use consulta_core::{Cpf, Record};
use std::path::Path;

/// One accepted line of a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// Normalized identifier
    pub cpf: Cpf,
    /// Display name from the second column, if present
    pub name: Option<String>,
}

impl BatchEntry {
    /// A `pending` batch record for this entry.
    #[must_use]
    pub fn into_candidate(self) -> Record {
        Record::batch_candidate(self.cpf, self.name)
    }
}

/// A line that did not yield an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number in the file
    pub line: u64,
    /// First field as written
    pub input: String,
    /// Why it was rejected
    pub reason: String,
}

/// Parsed batch file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFile {
    /// Accepted entries in file order
    pub entries: Vec<BatchEntry>,
    /// Lines skipped because of an unusable identifier
    pub rejected: Vec<RejectedLine>,
}

impl BatchFile {
    /// Batch candidates for every accepted entry.
    #[must_use]
    pub fn into_candidates(self) -> Vec<Record> {
        self.entries.into_iter().map(BatchEntry::into_candidate).collect()
    }
}

/// Read and parse a batch file.
///
/// # Errors
/// Returns error if the file cannot be read or is not UTF-8.
pub fn read_batch_file(path: &Path) -> Result<BatchFile> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| ReportError::NotText {
        path: path.display().to_string(),
    })?;
    let batch = parse_batch(&text)?;

    tracing::info!(
        "Read {} identifier(s) from {} ({} rejected)",
        batch.entries.len(),
        path.display(),
        batch.rejected.len()
    );
    Ok(batch)
}

/// Parse batch file contents.
///
/// # Errors
/// Returns error only on malformed CSV quoting.
pub fn parse_batch(text: &str) -> Result<BatchFile> {
    let mut batch = BatchFile::default();
    let mut first = true;

    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = index as u64 + 1;
        let Some(row) = split_line(raw)? else {
            continue;
        };

        if std::mem::take(&mut first) && row.iter().any(|f| f.to_lowercase().contains("cpf")) {
            tracing::debug!("Skipping header line");
            continue;
        }

        let input = row.get(0).unwrap_or_default();
        if !input.chars().any(|c| c.is_ascii_digit()) {
            batch.rejected.push(RejectedLine {
                line,
                input: input.to_string(),
                reason: "missing CPF".to_string(),
            });
            continue;
        }

        match Cpf::parse(input) {
            Ok(cpf) => batch.entries.push(BatchEntry {
                cpf,
                name: row.get(1).filter(|n| !n.is_empty()).map(str::to_string),
            }),
            Err(e) => {
                tracing::warn!("Line {}: {}", line, e);
                batch.rejected.push(RejectedLine {
                    line,
                    input: input.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(batch)
}

/// Split one line on the delimiter it uses: `;` when present, `,` otherwise.
///
/// Each line is read on its own, so a file may mix both separators.
fn split_line(line: &str) -> Result<Option<csv::StringRecord>> {
    let delimiter = if line.contains(';') { b';' } else { b',' };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());

    Ok(reader.records().next().transpose()?)
}
