//! Spreadsheet export of consultation records.

use crate::error::Result;
use chrono::NaiveDate;
use consulta_core::Record;
use std::io::Write;
use std::path::Path;

/// Column headers, in output order.
pub const HEADERS: [&str; 10] = [
    "CPF",
    "Status",
    "Data da Consulta",
    "Nome",
    "Data de Nascimento",
    "Situação",
    "Log de Resposta",
    "Valor Liberado",
    "Banco",
    "Erro",
];

/// Default export file name for `date`, e.g. `consulta-cpf-2026-10-18.csv`.
#[must_use]
pub fn default_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.csv", date.format("%Y-%m-%d"))
}

/// Write `records` as CSV: a header row, every field quoted, `\n` line ends.
///
/// # Errors
/// Returns error if the writer fails.
pub fn write_records<'a, W: Write>(
    records: impl IntoIterator<Item = &'a Record>,
    writer: W,
) -> Result<usize> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(HEADERS)?;

    let mut rows = 0;
    for record in records {
        csv.write_record(row(record))?;
        rows += 1;
    }

    csv.flush()?;
    Ok(rows)
}

/// Render `records` to a CSV string.
///
/// # Errors
/// Returns error if encoding fails.
pub fn export_to_string<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(records, &mut buffer)?;
    // The csv writer only emits the UTF-8 text it was given.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write `records` to `path`, creating parent directories.
///
/// Returns the number of data rows written.
///
/// # Errors
/// Returns error if the file cannot be created or written.
pub fn export_to_file<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    path: &Path,
) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let rows = write_records(records, std::io::BufWriter::new(file))?;
    tracing::info!("Exported {} record(s) to {}", rows, path.display());
    Ok(rows)
}

fn row(record: &Record) -> [String; 10] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        record.identifier.as_str().to_string(),
        record.status.label().to_string(),
        record.consultation_timestamp.to_rfc3339(),
        text(&record.name),
        text(&record.birth_date),
        text(&record.situation),
        text(&record.response_log),
        text(&record.approved_value),
        text(&record.bank),
        text(&record.error_message),
    ]
}
