//! Commands that submit identifiers and drive the consultation loop.

use crate::cli::ContextArg;
use crate::state::AppState;
use anyhow::Context;
use consulta_core::Record;
use consulta_queue::{Consultation, RunSummary};
use consulta_report::read_batch_file;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Submit one CPF and process the queue until it is empty.
pub async fn lookup(state: &AppState, cpf: &str, context: ContextArg) -> anyhow::Result<String> {
    let mut consultation = state.consultation().await?;
    let submitted = consultation.submit(cpf, context.into()).await?;
    let summary = process(&mut consultation).await?;

    let mut out = String::new();
    if let Some(record) = consultation.store().get(&submitted.id) {
        out.push_str(&describe(record));
    }
    out.push_str(&format_summary(&summary));
    Ok(out)
}

/// Import a CSV batch file, then process the queue.
pub async fn import(state: &AppState, file: &Path) -> anyhow::Result<String> {
    let batch = read_batch_file(file).with_context(|| format!("failed to read {}", file.display()))?;

    let mut out = String::new();
    for rejected in &batch.rejected {
        let _ = writeln!(
            out,
            "line {}: skipped '{}': {}",
            rejected.line, rejected.input, rejected.reason
        );
    }

    let mut consultation = state.consultation().await?;
    let report = consultation.import_batch(batch.into_candidates()).await?;
    let _ = writeln!(
        out,
        "Imported: {} new, {} reconsulted, {} duplicate(s) ignored",
        report.inserted, report.reconsulted, report.duplicates
    );

    let summary = process(&mut consultation).await?;
    out.push_str(&format_summary(&summary));
    Ok(out)
}

/// Re-queue records an earlier run left pending and process them.
pub async fn resume(state: &AppState) -> anyhow::Result<String> {
    let mut consultation = state.consultation().await?;
    let queued = consultation.resume_pending();
    if queued == 0 {
        return Ok("Nothing pending.\n".to_string());
    }

    let summary = process(&mut consultation).await?;
    Ok(format!("Resumed {queued} record(s)\n{}", format_summary(&summary)))
}

/// Run the queue until it drains or Ctrl-C is pressed.
///
/// On Ctrl-C the scheduled resumption is abandoned; unprocessed records stay
/// stored as `pending` for `consulta resume`.
pub async fn process(consultation: &mut Consultation) -> anyhow::Result<RunSummary> {
    let token = consultation.cancel_token();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping after the current lookup");
            token.cancel();
        }
    });

    info!(
        "Processing {} queued record(s), one every {:?}",
        consultation.queue().len(),
        consultation.policy().interval
    );
    let summary = consultation.run().await;
    signal.abort();

    Ok(summary?)
}

/// Human-readable summary of one run.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = format!(
        "Processed {}: {} succeeded, {} rejected, {} gateway failure(s), {} still pending\n",
        summary.processed,
        summary.succeeded,
        summary.rejected,
        summary.gateway_failures,
        summary.exhausted
    );
    if summary.stopped {
        out.push_str("Stopped before the queue drained; run `consulta resume` to continue.\n");
    }
    out
}

/// Multi-line description of a record.
pub fn describe(record: &Record) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "CPF:        {}", record.identifier.formatted());
    let _ = writeln!(out, "Status:     {}", record.status.label());
    let fields = [
        ("Name", &record.name),
        ("Birth date", &record.birth_date),
        ("Situation", &record.situation),
        ("Approved", &record.approved_value),
        ("Bank", &record.bank),
        ("Error", &record.error_message),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "{:<11} {}", format!("{label}:"), value);
        }
    }
    let _ = writeln!(out, "Attempts:   {}", record.retry_count);
    out
}
