//! Configuration command.

use crate::state::AppState;
use anyhow::Context;

/// Print the effective configuration as TOML, optionally saving it.
pub fn show(state: &AppState, save: bool) -> anyhow::Result<String> {
    let mut out = format!("# {}\n", state.config_path.display());
    out.push_str(&toml::to_string_pretty(&state.config).context("failed to render configuration")?);

    if save {
        state
            .config
            .save_to(&state.config_path)
            .with_context(|| format!("failed to write {}", state.config_path.display()))?;
        out.push_str(&format!("\nSaved to {}\n", state.config_path.display()));
    }

    Ok(out)
}
