//! CLI configuration, a thin wrapper around `slotbook_config`.
//!
//! Adds `GlobalOpts`-aware resolution: `--config` and `--state` win over
//! the platform defaults and the config file.

use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use slotbook_config::{Config, config_path, save_config};

/// Config file path (flag > env > platform default).
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the active config file merged with `SLOTBOOK_*` env vars.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(slotbook_config::load_config_from(&active_config_path(global))?)
}

/// State file path (flag > env > config file > platform default).
pub fn state_path(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global.state.clone().unwrap_or_else(|| cfg.state_path())
}
