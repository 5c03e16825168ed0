/// Decorator/filter value handed to the creation hook.
///
/// Wraps the stage under construction. Every operation returns a new value;
/// filters collapse to [`OperatorHook::Ignored`], which absorbs whatever is
/// chained after it.
use tracing::Level;

use streamhook_core::{
    FaultCallback, RequestCallback, SignalCallbacks, SignalType, Stage, Task, ValueCallback,
};
use streamhook_logging::SignalLogger;

use crate::filter;

#[derive(Debug, Clone)]
pub enum OperatorHook {
    /// A stage, possibly already decorated, plus whether its construction
    /// site should be captured.
    Decorated { stage: Stage, traced: bool },
    /// Leave the stage exactly as it was constructed.
    Ignored,
}

impl OperatorHook {
    pub fn new(stage: Stage) -> Self {
        Self::Decorated { stage, traced: false }
    }

    /// The stage to decorate. `None` once ignored.
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            Self::Decorated { stage, .. } => Some(stage),
            Self::Ignored => None,
        }
    }

    pub fn into_stage(self) -> Option<Stage> {
        match self {
            Self::Decorated { stage, .. } => Some(stage),
            Self::Ignored => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    pub fn is_traced(&self) -> bool {
        matches!(self, Self::Decorated { traced: true, .. })
    }

    // -- decoration ---------------------------------------------------------

    /// Observe value emission and termination. All callbacks are optional.
    pub fn peek_values(
        self,
        on_value: Option<ValueCallback>,
        on_fault: Option<FaultCallback>,
        on_complete: Option<Task>,
        on_after_terminate: Option<Task>,
    ) -> Self {
        self.decorate_with(SignalCallbacks {
            on_value,
            on_fault,
            on_complete,
            on_after_terminate,
            ..SignalCallbacks::default()
        })
    }

    /// Observe attachment, demand and cancellation. All callbacks are optional.
    pub fn peek_subscription_lifecycle(
        self,
        on_subscribe: Option<Task>,
        on_request: Option<RequestCallback>,
        on_cancel: Option<Task>,
    ) -> Self {
        self.decorate_with(SignalCallbacks {
            on_subscribe,
            on_request,
            on_cancel,
            ..SignalCallbacks::default()
        })
    }

    /// Wrap the stage with all seven observers at once.
    ///
    /// No-op when ignored, or when the stage is shared: a hot stage feeds
    /// several independent observers and decorating it would repeat every
    /// side effect once per observer.
    pub fn decorate_with(self, callbacks: SignalCallbacks) -> Self {
        match self {
            Self::Decorated { stage, traced } if !stage.is_shared() => Self::Decorated {
                stage: stage.peek(callbacks),
                traced,
            },
            other => other,
        }
    }

    /// Log the selected signal kinds under `category` at `level`. An empty
    /// `kinds` slice logs everything.
    pub fn log_signals(self, category: &str, level: Level, kinds: &[SignalType]) -> Self {
        let logger = match self.stage() {
            Some(stage) => SignalLogger::new(stage.tag(), category, level, kinds),
            None => return Self::Ignored,
        };
        self.decorate_with(logger.callbacks())
    }

    /// Request stack capture at assembly. The capture layer itself is added
    /// by the interceptor once the hook returns.
    pub fn mark_for_stack_capture(self) -> Self {
        match self {
            Self::Decorated { stage, .. } => Self::Decorated { stage, traced: true },
            Self::Ignored => Self::Ignored,
        }
    }

    /// Discard this stage and every decoration built so far in the chain.
    pub fn ignore(self) -> Self {
        Self::Ignored
    }

    // -- filters ------------------------------------------------------------

    pub fn filter_if_multi(self) -> Self {
        self.keep_if(|stage| stage.kind().is_multi())
    }

    pub fn filter_if_single(self) -> Self {
        self.keep_if(|stage| !stage.kind().is_multi())
    }

    /// Keep only stages whose operator name equals `name`, ignoring case
    /// and the arity/fusability tokens of the tag.
    pub fn filter_by_name(self, name: &str) -> Self {
        self.keep_if(|stage| filter::name_matches(stage.tag(), name))
    }

    /// Keep only stages whose operator name contains `fragment`, ignoring case.
    pub fn filter_by_name_contains(self, fragment: &str) -> Self {
        self.keep_if(|stage| filter::name_contains(stage.tag(), fragment))
    }

    fn keep_if(self, predicate: impl FnOnce(&Stage) -> bool) -> Self {
        let keep = self.stage().is_some_and(predicate);
        if keep { self } else { Self::Ignored }
    }
}
