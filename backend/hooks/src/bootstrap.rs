/// Boot-time defaults for the process-wide registry.
use std::path::Path;

use tracing::info;

use streamhook_config::HooksConfig;
use streamhook_core::HookError;

use crate::builtin;
use crate::registry::HookRegistry;

/// Pre-install the hooks the boot configuration asks for. Without the
/// trace-all flag every slot is left untouched.
pub fn install_defaults(registry: &HookRegistry, config: &HooksConfig) -> Result<(), HookError> {
    if config.trace_all() {
        info!("[Hooks] Trace-all enabled; capturing assembly stacks for every stage");
        registry.install_creation_hook(Some(builtin::trace_all()))?;
    }
    Ok(())
}

/// Set up the tracing subscriber as the boot configuration describes.
/// Host applications call this once; libraries never do.
pub fn init_logging(config: &HooksConfig) {
    streamhook_logging::init_logger(config.logging.dir.as_deref(), config.logging.level());
}

/// A fresh registry configured as the global one would be.
pub fn registry_from_config(config: &HooksConfig) -> Result<HookRegistry, HookError> {
    let registry = HookRegistry::new();
    install_defaults(&registry, config)?;
    Ok(registry)
}

/// A fresh registry configured from the file at `path`, with environment
/// overrides applied. Unlike the global boot path, a file that cannot be
/// read or parsed is an error.
pub fn registry_from_config_path(path: &Path) -> Result<HookRegistry, HookError> {
    let config = streamhook_config::load_and_prepare(path)
        .map_err(|e| HookError::Config(format!("{e:#}")))?;
    registry_from_config(&config)
}
