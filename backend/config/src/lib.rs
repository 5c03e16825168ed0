//! `streamhook-config`: boot configuration for the hook registry.
//!
//! Provides:
//! - Typed config schema (`trace`, `logging`)
//! - YAML loading with config-dir discovery
//! - Environment overrides for the trace-all flag and log level

pub mod env;
pub mod io;
pub mod schema;

pub use env::{
    apply_env_overrides, apply_env_overrides_with, parse_flag, LOG_LEVEL_ENV_VAR, TRACE_ENV_VAR,
};
pub use io::{
    config_dir, config_file_path, load_config, resolve_config_path, CONFIG_DIR_ENV_VAR,
    CONFIG_PATH_ENV_VAR,
};
pub use schema::{HooksConfig, LoggingConfig, TraceConfig};

use anyhow::Result;
use std::path::Path;
use tracing::warn;

/// Load a config file and apply environment overrides.
pub fn load_and_prepare(path: &Path) -> Result<HooksConfig> {
    let config = load_config(path)?;
    Ok(apply_env_overrides(config))
}

/// Configuration read once at process start.
///
/// Never fails: an unreadable or malformed file is logged and replaced by
/// defaults, with environment overrides still applied.
pub fn load_boot_config() -> HooksConfig {
    let path = resolve_config_path();
    match load_and_prepare(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("[Config] {:#}; falling back to defaults", e);
            apply_env_overrides(HooksConfig::default())
        }
    }
}
