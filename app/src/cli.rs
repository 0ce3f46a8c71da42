//! Command-line interface definition.

use clap::{Args, Parser, Subcommand, ValueEnum};
use consulta_core::{ConsultationContext, RecordStatus};
use consulta_report::{QuickRange, SortKey};
use std::path::PathBuf;

/// Consulta - CPF lookups against the consultation webhook.
#[derive(Parser, Debug)]
#[command(name = "consulta", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Record database (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Consult one CPF and wait for the result.
    Lookup {
        /// CPF, with or without punctuation
        cpf: String,
        /// Submission context
        #[arg(long, value_enum, default_value_t = ContextArg::Individual)]
        context: ContextArg,
    },
    /// Import a CSV file of CPFs and consult them.
    Import {
        /// CSV file: one CPF per line, optional name in the second column
        file: PathBuf,
    },
    /// Consult records left pending by an earlier run.
    Resume,
    /// Show the results table.
    List(ListArgs),
    /// Export records to CSV.
    Export {
        /// Output file (defaults to consulta-cpf-YYYY-MM-DD.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Only records from this context
        #[arg(long, value_enum)]
        context: Option<ContextArg>,
    },
    /// Show dashboard statistics.
    Stats(StatsArgs),
    /// Print the effective configuration.
    Config {
        /// Also write it to the configuration file
        #[arg(long)]
        save: bool,
    },
}

/// Options for `list`.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only records from this context
    #[arg(long, value_enum)]
    pub context: Option<ContextArg>,
    /// Only records with this status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
    /// CPF digits or part of the name
    #[arg(long)]
    pub search: Option<String>,
    /// Sort column
    #[arg(long, value_enum, default_value_t = SortArg::Date)]
    pub sort: SortArg,
    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// Options for `stats`.
#[derive(Args, Debug, Clone, Default)]
pub struct StatsArgs {
    /// Only records from this bank
    #[arg(long)]
    pub bank: Option<String>,
    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<String>,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<String>,
    /// Preset range; overrides --from and --to
    #[arg(long, value_enum)]
    pub range: Option<RangeArg>,
}

/// `--context` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextArg {
    /// Typed in by hand
    Individual,
    /// From a CSV import
    Batch,
}

impl From<ContextArg> for ConsultationContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Individual => Self::Individual,
            ContextArg::Batch => Self::Batch,
        }
    }
}

/// `--status` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    /// Waiting for a result
    Pending,
    /// Result found
    Success,
    /// Lookup failed
    Error,
}

impl From<StatusArg> for RecordStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Success => Self::Success,
            StatusArg::Error => Self::Error,
        }
    }
}

/// `--sort` values.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortArg {
    /// Consultation date
    #[default]
    Date,
    /// CPF digits
    Cpf,
    /// Holder name
    Name,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => Self::Date,
            SortArg::Cpf => Self::Cpf,
            SortArg::Name => Self::Name,
        }
    }
}

/// `--range` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeArg {
    /// Today only
    Today,
    /// Yesterday only
    Yesterday,
    /// The last seven days
    LastWeek,
    /// The last month
    LastMonth,
}

impl From<RangeArg> for QuickRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::Today => Self::Today,
            RangeArg::Yesterday => Self::Yesterday,
            RangeArg::LastWeek => Self::LastWeek,
            RangeArg::LastMonth => Self::LastMonth,
        }
    }
}
