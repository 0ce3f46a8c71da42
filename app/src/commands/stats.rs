//! Dashboard command.

use crate::cli::StatsArgs;
use crate::state::AppState;
use consulta_report::dashboard::today;
use consulta_report::{compute, distinct_banks, parse_date, DashboardFilter, DashboardStats};
use std::fmt::Write as _;

/// Show dashboard figures for the requested bank and period.
pub async fn stats(state: &AppState, args: &StatsArgs) -> anyhow::Result<String> {
    let store = state.open_store().await?;
    let filter = build_filter(args)?;

    let figures = compute(store.records(), &filter);
    let banks = distinct_banks(store.records());
    Ok(render(&figures, &filter, &banks))
}

/// Translate command-line options into a dashboard filter.
pub fn build_filter(args: &StatsArgs) -> anyhow::Result<DashboardFilter> {
    let filter = DashboardFilter {
        bank: args.bank.clone(),
        start: args.from.as_deref().map(parse_date).transpose()?,
        end: args.to.as_deref().map(parse_date).transpose()?,
    };

    Ok(match args.range {
        Some(range) => filter.with_range(range.into(), today()),
        None => filter,
    })
}

fn render(figures: &DashboardStats, filter: &DashboardFilter, banks: &[&str]) -> String {
    let mut out = String::new();

    let period = match (filter.start, filter.end) {
        (None, None) => "all time".to_string(),
        (start, end) => format!(
            "{} to {}",
            start.map_or_else(|| "...".to_string(), |d| d.format("%d/%m/%Y").to_string()),
            end.map_or_else(|| "...".to_string(), |d| d.format("%d/%m/%Y").to_string())
        ),
    };
    let _ = writeln!(out, "Period:                {period}");
    let _ = writeln!(
        out,
        "Bank:                  {}",
        filter.bank.as_deref().unwrap_or("all")
    );
    let _ = writeln!(out, "Consultations:         {}", figures.total_consultations);
    let _ = writeln!(out, "With approved value:   {}", figures.with_approved_value);
    let _ = writeln!(
        out,
        "Total approved:        {}",
        format_brl(figures.total_approved_value)
    );
    let _ = writeln!(out, "Average ticket:        {}", format_brl(figures.average_ticket));
    if !banks.is_empty() {
        let _ = writeln!(out, "Banks:                 {}", banks.join(", "));
    }
    out
}

/// Format as Brazilian currency: `1234.5` is `R$ 1.234,50`.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RangeArg;
    use chrono::NaiveDate;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(1_234_567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(999.0), "R$ 999,00");
    }

    #[test]
    fn test_build_filter_from_dates() {
        let args = StatsArgs {
            bank: Some("X".to_string()),
            from: Some("2026-10-01".to_string()),
            to: Some("2026-10-18".to_string()),
            range: None,
        };
        let filter = build_filter(&args).expect("filter");
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2026, 10, 1));
        assert_eq!(filter.end, NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(filter.bank.as_deref(), Some("X"));
    }

    #[test]
    fn test_range_overrides_dates() {
        let args = StatsArgs {
            from: Some("2020-01-01".to_string()),
            range: Some(RangeArg::Today),
            ..StatsArgs::default()
        };
        let filter = build_filter(&args).expect("filter");
        assert_eq!(filter.start, Some(today()));
        assert_eq!(filter.end, Some(today()));
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let args = StatsArgs {
            from: Some("01/10/2026".to_string()),
            ..StatsArgs::default()
        };
        assert!(build_filter(&args).is_err());
    }

    #[test]
    fn test_render_all_time() {
        let out = render(&DashboardStats::default(), &DashboardFilter::default(), &["X"]);
        assert!(out.contains("all time"));
        assert!(out.contains("R$ 0,00"));
        assert!(out.contains("Banks:                 X"));
    }
}
