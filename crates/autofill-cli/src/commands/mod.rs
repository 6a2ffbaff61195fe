//! Subcommand implementations.

pub mod config;
pub mod extract;
pub mod fill;

use std::path::{Path, PathBuf};

use autofill_core::AutofillConfig;
use tracing::debug;

/// `<config dir>/autofill/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autofill")
        .join("config.json")
}

/// The explicit config file, else the default file if it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<AutofillConfig> {
    if let Some(path) = config_path {
        return Ok(AutofillConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(AutofillConfig::from_file(&path)?)
    } else {
        Ok(AutofillConfig::default())
    }
}
