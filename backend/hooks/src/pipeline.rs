/// Pipeline assembly entry point.
///
/// Stage constructors go through here so that every stage passes the
/// interceptor exactly once. The registry is threaded explicitly; tests
/// use an isolated one, applications usually take the global default.
use tracing::debug;

use streamhook_core::{HookError, Stage, StageKind};

use crate::interceptor::AssemblyInterceptor;
use crate::registry::HookRegistry;

#[derive(Clone)]
pub struct PipelineAssembler {
    interceptor: AssemblyInterceptor,
}

impl PipelineAssembler {
    pub fn new(registry: HookRegistry) -> Self {
        Self { interceptor: AssemblyInterceptor::new(registry) }
    }

    pub fn global() -> Self {
        Self { interceptor: AssemblyInterceptor::global() }
    }

    pub fn registry(&self) -> &HookRegistry {
        self.interceptor.registry()
    }

    /// Construct a stage with no upstream.
    pub fn source(&self, tag: &str, kind: StageKind) -> Result<Stage, HookError> {
        debug!("[Pipeline] assemble source {}", tag);
        self.interceptor.intercept(Stage::source(tag, kind))
    }

    /// Construct a stage reading from `upstream`.
    pub fn then(&self, upstream: &Stage, tag: &str, kind: StageKind) -> Result<Stage, HookError> {
        debug!("[Pipeline] assemble {} after {}", tag, upstream.tag());
        self.interceptor.intercept(Stage::operator(upstream, tag, kind))
    }
}
