//! Results table and CSV export commands.

use crate::cli::{ContextArg, ListArgs};
use crate::state::AppState;
use anyhow::Context;
use chrono::Local;
use consulta_core::{ConsultationContext, Record};
use consulta_report::{default_file_name, export_to_file, query, PageItem, ResultsPage, ResultsQuery, SortOrder};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Render one page of the results table.
pub async fn list(state: &AppState, args: &ListArgs) -> anyhow::Result<String> {
    let store = state.open_store().await?;

    let results_query = ResultsQuery {
        search: args.search.clone(),
        status: args.status.map(Into::into),
        context: args.context.map(Into::into),
        sort: args.sort.into(),
        order: if args.asc { SortOrder::Asc } else { SortOrder::Desc },
        page: args.page,
        page_size: state.config.export.page_size,
    };

    Ok(render_page(&query(store.records(), &results_query)))
}

/// Export records to CSV. Returns a confirmation line.
pub async fn export(
    state: &AppState,
    output: Option<&Path>,
    context: Option<ContextArg>,
) -> anyhow::Result<String> {
    let store = state.open_store().await?;
    let context: Option<ConsultationContext> = context.map(Into::into);

    let path = output.map_or_else(
        || {
            PathBuf::from(default_file_name(
                &state.config.export.file_prefix,
                Local::now().date_naive(),
            ))
        },
        Path::to_path_buf,
    );

    let records = store
        .records()
        .iter()
        .filter(|r| context.map_or(true, |c| r.consultation_context == c));
    let rows = export_to_file(records, &path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(format!("Exported {rows} record(s) to {}\n", path.display()))
}

/// Plain-text table for a results page.
pub fn render_page(page: &ResultsPage<'_>) -> String {
    if page.total == 0 {
        return "No results.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14}  {:<8}  {:<16}  {:<28}  {:<12}  {}",
        "CPF", "Status", "Date", "Name", "Bank", "Approved"
    );
    for record in &page.rows {
        let _ = writeln!(out, "{}", render_row(record));
    }

    let window: Vec<String> = page
        .window
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == page.page => format!("[{n}]"),
            PageItem::Page(n) => n.to_string(),
            PageItem::Gap => "...".to_string(),
        })
        .collect();
    let _ = writeln!(
        out,
        "\nPage {} of {} ({} result(s))  {}",
        page.page,
        page.total_pages,
        page.total,
        window.join(" ")
    );
    out
}

fn render_row(record: &Record) -> String {
    let date = record
        .consultation_timestamp
        .as_datetime()
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M");
    format!(
        "{:<14}  {:<8}  {:<16}  {:<28}  {:<12}  {}",
        record.identifier.formatted(),
        record.status.label(),
        date.to_string(),
        truncate(record.name.as_deref().unwrap_or("-"), 28),
        truncate(record.bank.as_deref().unwrap_or("-"), 12),
        record.approved_value.as_deref().unwrap_or("-"),
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
