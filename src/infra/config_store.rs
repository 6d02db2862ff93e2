// ============================================================
// Layer 6 — Config Store
// ============================================================
// Saves and loads PrepConfig as pretty JSON. A run saves its
// config next to the frozen split, so the loaders built later
// use the same text and tokenizer settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::prep_config::PrepConfig;

/// File name used when a config is stored beside a split record.
pub const CONFIG_FILE: &str = "prep_config.json";

pub fn save_config(cfg: &PrepConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

    tracing::debug!("Saved preparation config to '{}'", path.display());
    Ok(())
}

pub fn load_config(path: &Path) -> Result<PrepConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

    serde_json::from_str(&json)
        .with_context(|| format!("Config '{}' is not valid JSON", path.display()))
}
