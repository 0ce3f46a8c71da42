//! Consulta application shell.
//!
//! Parses the command line, resolves configuration and hands off to the
//! command implementations. Business logic lives in the `crates/` directory.

pub mod cli;
pub mod commands;
pub mod state;

pub use cli::Cli;
pub use state::AppState;

use tracing::info;

/// Initialize tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,consulta=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Run a parsed command line.
///
/// # Errors
/// Returns error if configuration is invalid or the command fails.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("Starting Consulta v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::load(cli.config.as_deref(), cli.database.as_deref())?;
    let output = commands::dispatch(&state, cli.command).await?;
    print!("{output}");
    Ok(())
}
