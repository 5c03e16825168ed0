/// Built-in creation hooks.
///
/// Ready-made hooks for the common cases. Each returns a shared callback
/// suitable for `HookRegistry::install_creation_hook`.
use std::sync::Arc;
use tracing::Level;

use crate::operator_hook::OperatorHook;
use crate::registry::CreationHook;

// ---------------------------------------------------------------------------
// Trace everything: stack capture on every stage
// ---------------------------------------------------------------------------

pub fn trace_all() -> Arc<CreationHook> {
    Arc::new(|hook: OperatorHook| Some(hook.mark_for_stack_capture()))
}

// ---------------------------------------------------------------------------
// Logging hooks
// ---------------------------------------------------------------------------

/// Log every signal of every stage.
pub fn log_all(category: impl Into<String>, level: Level) -> Arc<CreationHook> {
    let category = category.into();
    Arc::new(move |hook: OperatorHook| Some(hook.log_signals(&category, level, &[])))
}

/// Log every signal of stages whose operator name is `name`.
pub fn log_named(
    name: impl Into<String>,
    category: impl Into<String>,
    level: Level,
) -> Arc<CreationHook> {
    let name = name.into();
    let category = category.into();
    Arc::new(move |hook: OperatorHook| Some(hook.filter_by_name(&name).log_signals(&category, level, &[])))
}
