//! Consulta Report - getting records in and out, and summarizing them.
//!
//! - [`csv_import`]: batch files of identifiers
//! - [`csv_export`]: spreadsheet export of records
//! - [`view`]: the results table (latest per identifier, search, sort, pages)
//! - [`dashboard`]: bank/date filtered statistics

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod csv_export;
pub mod csv_import;
pub mod dashboard;
pub mod error;
pub mod view;

pub use csv_export::{default_file_name, export_to_file, export_to_string, write_records};
pub use csv_import::{parse_batch, read_batch_file, BatchEntry, BatchFile, RejectedLine};
pub use dashboard::{
    compute, compute_in, distinct_banks, parse_currency, parse_date, DashboardFilter, DashboardStats,
    QuickRange,
};
pub use error::{ReportError, Result};
pub use view::{latest_per_identifier, page_window, query, PageItem, ResultsPage, ResultsQuery, SortKey, SortOrder};
