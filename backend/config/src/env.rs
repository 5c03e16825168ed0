//! Environment overrides for boot configuration.
//!
//! The trace-all flag follows the usual system-property convention: the
//! value `true` (any case) enables it, anything else disables it. Unset
//! variables leave the file value alone.

use std::collections::HashMap;

use crate::schema::HooksConfig;

/// Enables stack capture for every stage assembled in the process.
pub const TRACE_ENV_VAR: &str = "STREAMHOOK_TRACE_OPERATOR_STACKTRACE";

/// Overrides `logging.level`.
pub const LOG_LEVEL_ENV_VAR: &str = "STREAMHOOK_LOG_LEVEL";

/// Parse a boolean flag. Only `true`, case-insensitive and trimmed, is true.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: HooksConfig) -> HooksConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(
    mut config: HooksConfig,
    env: &HashMap<String, String>,
) -> HooksConfig {
    if let Some(raw) = env.get(TRACE_ENV_VAR) {
        config.trace.operator_stacktrace = parse_flag(raw);
    }
    if let Some(level) = env.get(LOG_LEVEL_ENV_VAR).filter(|l| !l.trim().is_empty()) {
        config.logging.level = Some(level.trim().to_string());
    }
    config
}
