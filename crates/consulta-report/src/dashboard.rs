//! Dashboard statistics over consultation records.

use crate::error::{ReportError, Result};
use chrono::{Days, Local, Months, NaiveDate, TimeZone};
use consulta_core::Record;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Preset date ranges relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickRange {
    /// Today only
    Today,
    /// Yesterday only
    Yesterday,
    /// The last seven days up to today
    LastWeek,
    /// The last month up to today
    LastMonth,
}

impl QuickRange {
    /// Inclusive `(start, end)` dates for this range as seen on `today`.
    #[must_use]
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Today => (today, today),
            Self::Yesterday => {
                let yesterday = today.pred_opt().unwrap_or(today);
                (yesterday, yesterday)
            }
            Self::LastWeek => (today.checked_sub_days(Days::new(7)).unwrap_or(today), today),
            Self::LastMonth => (today.checked_sub_months(Months::new(1)).unwrap_or(today), today),
        }
    }
}

impl FromStr for QuickRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "last-week" => Ok(Self::LastWeek),
            "last-month" => Ok(Self::LastMonth),
            other => Err(format!(
                "unknown range '{other}' (expected today, yesterday, last-week or last-month)"
            )),
        }
    }
}

/// Parse a `YYYY-MM-DD` date argument.
///
/// # Errors
/// Returns `ReportError::InvalidDate` for anything else.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| ReportError::InvalidDate {
        input: input.to_string(),
    })
}

/// Bank and date filters for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    /// Only records from this bank
    pub bank: Option<String>,
    /// First day included (from start of day)
    pub start: Option<NaiveDate>,
    /// Last day included (until end of day)
    pub end: Option<NaiveDate>,
}

impl DashboardFilter {
    /// Replace the date bounds with a preset range as seen on `today`.
    #[must_use]
    pub fn with_range(mut self, range: QuickRange, today: NaiveDate) -> Self {
        let (start, end) = range.bounds(today);
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Whether `record` passes the filter, judging days in `tz`.
    pub fn matches_in<Tz: TimeZone>(&self, record: &Record, tz: &Tz) -> bool {
        if let Some(bank) = &self.bank {
            if record.bank.as_deref() != Some(bank.as_str()) {
                return false;
            }
        }

        let day = record
            .consultation_timestamp
            .as_datetime()
            .with_timezone(tz)
            .date_naive();

        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Records passing the filter
    pub total_consultations: usize,
    /// Successful records carrying an approved value
    pub with_approved_value: usize,
    /// Sum of approved values
    pub total_approved_value: f64,
    /// Mean approved value over `with_approved_value`
    pub average_ticket: f64,
}

/// Compute statistics with days judged in the local time zone.
#[must_use]
pub fn compute(records: &[Record], filter: &DashboardFilter) -> DashboardStats {
    compute_in(records, filter, &Local)
}

/// Compute statistics with days judged in `tz`.
#[must_use]
pub fn compute_in<Tz: TimeZone>(records: &[Record], filter: &DashboardFilter, tz: &Tz) -> DashboardStats {
    let filtered: Vec<&Record> = records.iter().filter(|r| filter.matches_in(r, tz)).collect();

    let values: Vec<f64> = filtered
        .iter()
        .filter(|r| r.is_success())
        .filter_map(|r| r.approved_value.as_deref())
        .map(parse_currency)
        .collect();

    let total_approved_value: f64 = values.iter().sum();
    #[allow(clippy::cast_precision_loss)]
    let average_ticket = if values.is_empty() {
        0.0
    } else {
        total_approved_value / values.len() as f64
    };

    DashboardStats {
        total_consultations: filtered.len(),
        with_approved_value: values.len(),
        total_approved_value,
        average_ticket,
    }
}

/// Distinct banks of successful records, in first-seen order.
#[must_use]
pub fn distinct_banks(records: &[Record]) -> Vec<&str> {
    let mut banks: Vec<&str> = Vec::new();
    for bank in records
        .iter()
        .filter(|r| r.is_success())
        .filter_map(|r| r.bank.as_deref())
    {
        if !banks.contains(&bank) {
            banks.push(bank);
        }
    }
    banks
}

/// Parse an approved value: `"R$ 1.234,56"` is `1234.56`.
///
/// A comma marks the decimals and dots group thousands. Without a comma, a
/// single dot followed by one, two or four-plus digits is a decimal point,
/// the form the webhook's numeric values are stored in (`"1500.5"`). Text
/// without digits counts as zero.
#[must_use]
pub fn parse_currency(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let decimal = if cleaned.contains(',') {
        ','
    } else {
        match cleaned.split_once('.') {
            Some((_, tail)) if !tail.contains('.') && tail.len() != 3 => '.',
            _ => ',',
        }
    };

    let (whole, fraction) = cleaned.split_once(decimal).unwrap_or((cleaned.as_str(), ""));
    let whole: String = whole.chars().filter(char::is_ascii_digit).collect();
    let fraction: String = fraction.chars().take_while(char::is_ascii_digit).collect();

    if whole.is_empty() && fraction.is_empty() {
        return 0.0;
    }

    let whole = if whole.is_empty() { "0" } else { whole.as_str() };
    let fraction = if fraction.is_empty() { "0" } else { fraction.as_str() };
    format!("{whole}.{fraction}").parse().unwrap_or(0.0)
}

/// Today's date in the local time zone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
