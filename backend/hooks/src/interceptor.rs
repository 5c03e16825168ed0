/// Assembly-time interception.
///
/// Runs synchronously on the thread constructing a stage, exactly once per
/// construction. Panics raised by a user hook or decoration callback are
/// not caught; they reach the code building the pipeline unchanged.
use tracing::trace;

use streamhook_core::{AssemblySite, HookError, Stage};

use crate::operator_hook::OperatorHook;
use crate::registry::HookRegistry;

#[derive(Clone)]
pub struct AssemblyInterceptor {
    registry: HookRegistry,
}

impl AssemblyInterceptor {
    pub fn new(registry: HookRegistry) -> Self {
        Self { registry }
    }

    /// Interceptor bound to the process-wide registry.
    pub fn global() -> Self {
        Self::new(HookRegistry::global().clone())
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Apply the installed creation hook to a freshly constructed stage and
    /// return the stage the builder should hand back to its caller.
    pub fn intercept(&self, stage: Stage) -> Result<Stage, HookError> {
        let Some(hook) = self.registry.creation_hook() else {
            return Ok(stage);
        };
        if stage.is_shared() {
            return Ok(stage);
        }

        let result = hook(OperatorHook::new(stage.clone())).ok_or_else(|| {
            HookError::MisconfiguredHook { stage: stage.tag().to_string() }
        })?;

        match result {
            OperatorHook::Ignored => Ok(stage),
            OperatorHook::Decorated { stage: decorated, traced: false } => Ok(decorated),
            OperatorHook::Decorated { stage: decorated, traced: true } => {
                trace!("[Assembly] Capturing assembly site of {}", stage.tag());
                Ok(decorated.capture_assembly(AssemblySite::capture(stage.tag())))
            }
        }
    }
}

/// Intercept against the process-wide registry.
pub fn intercept(stage: Stage) -> Result<Stage, HookError> {
    AssemblyInterceptor::global().intercept(stage)
}
