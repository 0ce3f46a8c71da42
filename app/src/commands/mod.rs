//! Command implementations.
//!
//! Each command returns the text to print so it can be exercised without a
//! terminal.

pub mod consult;
pub mod results;
pub mod settings;
pub mod stats;

use crate::cli::Command;
use crate::state::AppState;

/// Run one parsed command.
pub async fn dispatch(state: &AppState, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Lookup { cpf, context } => consult::lookup(state, &cpf, context).await,
        Command::Import { file } => consult::import(state, &file).await,
        Command::Resume => consult::resume(state).await,
        Command::List(args) => results::list(state, &args).await,
        Command::Export { output, context } => {
            results::export(state, output.as_deref(), context).await
        }
        Command::Stats(args) => stats::stats(state, &args).await,
        Command::Config { save } => settings::show(state, save),
    }
}
