//! Config file discovery and loading.

use crate::schema::HooksConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "hooks.yaml";

/// Explicit path to the config file.
pub const CONFIG_PATH_ENV_VAR: &str = "STREAMHOOK_CONFIG";

/// Directory holding `hooks.yaml`.
pub const CONFIG_DIR_ENV_VAR: &str = "STREAMHOOK_CONFIG_DIR";

/// Resolve the streamhook config directory.
/// Priority: `STREAMHOOK_CONFIG_DIR` env > `~/.streamhook/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".streamhook"),
        None => PathBuf::from(".streamhook"),
    }
}

/// Resolve the full path to the config file inside `config_dir`.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Resolve the config file to load at boot.
/// Priority: `STREAMHOOK_CONFIG` env > `<config_dir>/hooks.yaml`
pub fn resolve_config_path() -> PathBuf {
    match std::env::var(CONFIG_PATH_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => config_file_path(&config_dir()),
    }
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<HooksConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(HooksConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(HooksConfig::default());
    }

    let config: HooksConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded hooks config");
    Ok(config)
}
