//! Pipeline stages and the decoration capability.
//!
//! A [`Stage`] is immutable. Decorating one produces a new stage wrapping
//! the previous one, so a chain of decorations reads from the outermost
//! layer down to the operator that was originally constructed.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::signal::{Signal, SignalCallbacks};
use crate::types::StageKind;

// ---------------------------------------------------------------------------
// Assembly site
// ---------------------------------------------------------------------------

/// Where and when a stage was constructed.
#[derive(Clone)]
pub struct AssemblySite {
    stage: String,
    thread: String,
    captured_at: DateTime<Utc>,
    backtrace: Arc<Backtrace>,
}

impl AssemblySite {
    /// Capture the current call stack. Always captures, independent of
    /// `RUST_BACKTRACE`, since the caller asked for it explicitly.
    pub fn capture(stage: impl Into<String>) -> Self {
        let current = std::thread::current();
        Self {
            stage: stage.into(),
            thread: current.name().unwrap_or("unnamed").to_string(),
            captured_at: Utc::now(),
            backtrace: Arc::new(Backtrace::force_capture()),
        }
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn thread(&self) -> &str {
        &self.thread
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Header line used when a fault is enriched with this origin.
    pub fn summary(&self) -> String {
        format!(
            "Assembly trace from producer [{}] on thread '{}' at {}",
            self.stage,
            self.thread,
            self.captured_at.to_rfc3339()
        )
    }

    pub fn describe(&self) -> String {
        format!("{}:\n{}", self.summary(), self.backtrace)
    }
}

impl fmt::Debug for AssemblySite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblySite")
            .field("stage", &self.stage)
            .field("thread", &self.thread)
            .field("captured_at", &self.captured_at)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

enum StageBody {
    Operator { upstream: Option<Stage> },
    Peek { source: Stage, callbacks: SignalCallbacks },
    Assembly { source: Stage, site: AssemblySite },
}

struct StageNode {
    tag: String,
    kind: StageKind,
    body: StageBody,
}

/// A node in a pipeline under construction.
#[derive(Clone)]
pub struct Stage {
    node: Arc<StageNode>,
}

impl Stage {
    fn from_parts(tag: String, kind: StageKind, body: StageBody) -> Self {
        Self { node: Arc::new(StageNode { tag, kind, body }) }
    }

    /// A stage with no upstream.
    pub fn source(tag: impl Into<String>, kind: StageKind) -> Self {
        Self::from_parts(tag.into(), kind, StageBody::Operator { upstream: None })
    }

    /// A stage reading from `upstream`.
    pub fn operator(upstream: &Stage, tag: impl Into<String>, kind: StageKind) -> Self {
        Self::from_parts(
            tag.into(),
            kind,
            StageBody::Operator { upstream: Some(upstream.clone()) },
        )
    }

    /// Structural type tag, e.g. `MultiMapFusable`.
    pub fn tag(&self) -> &str {
        &self.node.tag
    }

    pub fn kind(&self) -> StageKind {
        self.node.kind
    }

    pub fn is_shared(&self) -> bool {
        self.node.kind.shared
    }

    /// Upstream of the operator at the core of this stage.
    pub fn upstream(&self) -> Option<&Stage> {
        match &self.node.body {
            StageBody::Operator { upstream } => upstream.as_ref(),
            StageBody::Peek { source, .. } | StageBody::Assembly { source, .. } => {
                source.upstream()
            }
        }
    }

    /// The stage this decoration wraps, if any.
    pub fn inner(&self) -> Option<&Stage> {
        match &self.node.body {
            StageBody::Operator { .. } => None,
            StageBody::Peek { source, .. } | StageBody::Assembly { source, .. } => Some(source),
        }
    }

    /// The undecorated operator at the core of this stage.
    pub fn core(&self) -> &Stage {
        let mut current = self;
        while let Some(inner) = current.inner() {
            current = inner;
        }
        current
    }

    pub fn is_decorated(&self) -> bool {
        self.inner().is_some()
    }

    pub fn decoration_depth(&self) -> usize {
        self.inner().map_or(0, |inner| inner.decoration_depth() + 1)
    }

    /// Whether any layer captured an assembly site.
    pub fn is_traced(&self) -> bool {
        self.assembly_site().is_some()
    }

    /// The outermost captured assembly site.
    pub fn assembly_site(&self) -> Option<&AssemblySite> {
        match &self.node.body {
            StageBody::Operator { .. } => None,
            StageBody::Assembly { site, .. } => Some(site),
            StageBody::Peek { source, .. } => source.assembly_site(),
        }
    }

    /// Identity comparison.
    pub fn same_stage(&self, other: &Stage) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Wrap this stage with lifecycle observers, shape chosen by its kind.
    pub fn peek(&self, callbacks: SignalCallbacks) -> Stage {
        let tag = self.node.kind.shape().peek_tag();
        Self::from_parts(
            tag.to_string(),
            self.node.kind,
            StageBody::Peek { source: self.clone(), callbacks },
        )
    }

    /// Wrap this stage with an assembly-capture layer that enriches faults
    /// crossing it with `site`.
    pub fn capture_assembly(&self, site: AssemblySite) -> Stage {
        let tag = self.node.kind.shape().assembly_tag();
        Self::from_parts(
            tag.to_string(),
            self.node.kind,
            StageBody::Assembly { source: self.clone(), site },
        )
    }

    /// Replay one signal through this stage's observation layers, the way a
    /// delivery runtime does when the signal crosses the stage.
    ///
    /// Downstream signals reach the innermost layer first; `Request` and
    /// `Cancel` travel the other way. A terminal signal reaches every layer's
    /// observer before any after-terminate task runs, and those tasks then
    /// run outermost first. Returns the signal as it leaves the stage, which
    /// may carry extra fault context.
    pub fn observe(&self, signal: Signal) -> Signal {
        let terminal = signal.is_terminal();
        let signal = self.propagate(signal);
        if terminal {
            self.after_terminate();
        }
        signal
    }

    fn propagate(&self, signal: Signal) -> Signal {
        if signal.is_upstream() {
            let signal = self.apply_layer(signal);
            match self.inner() {
                Some(inner) => inner.propagate(signal),
                None => signal,
            }
        } else {
            let signal = match self.inner() {
                Some(inner) => inner.propagate(signal),
                None => signal,
            };
            self.apply_layer(signal)
        }
    }

    fn apply_layer(&self, signal: Signal) -> Signal {
        match &self.node.body {
            StageBody::Operator { .. } => signal,
            StageBody::Peek { callbacks, .. } => {
                callbacks.notify(&signal);
                signal
            }
            StageBody::Assembly { site, .. } => match signal {
                Signal::Fault(fault) => Signal::Fault(fault.with_suppressed(site.describe())),
                other => other,
            },
        }
    }

    fn after_terminate(&self) {
        if let StageBody::Peek { callbacks, .. } = &self.node.body {
            callbacks.after_terminate();
        }
        if let Some(inner) = self.inner() {
            inner.after_terminate();
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("tag", &self.node.tag)
            .field("kind", &self.node.kind)
            .field("depth", &self.decoration_depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fault;
    use std::sync::Mutex;

    #[test]
    fn peek_wraps_and_keeps_kind() {
        let map = Stage::source("MultiMapFusable", StageKind::multi().fused());
        let peeked = map.peek(SignalCallbacks::new());
        assert_eq!(peeked.tag(), "MultiPeekFusable");
        assert_eq!(peeked.kind(), map.kind());
        assert!(peeked.inner().unwrap().same_stage(&map));
        assert!(peeked.core().same_stage(&map));
        assert_eq!(peeked.decoration_depth(), 1);
        assert!(!map.is_decorated());
    }

    #[test]
    fn upstream_is_reachable_through_decorations() {
        let range = Stage::source("MultiRange", StageKind::multi());
        let filter = Stage::operator(&range, "MultiFilter", StageKind::multi());
        let decorated = filter.peek(SignalCallbacks::new());
        assert!(decorated.upstream().unwrap().same_stage(&range));
        assert!(range.upstream().is_none());
    }

    #[test]
    fn observe_order_follows_signal_direction() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (log.clone(), log.clone());
        let (c, d) = (log.clone(), log.clone());
        let stage = Stage::source("SingleJust", StageKind::single())
            .peek(
                SignalCallbacks::new()
                    .on_value(move |_| a.lock().unwrap().push("inner-value"))
                    .on_cancel(move || b.lock().unwrap().push("inner-cancel")),
            )
            .peek(
                SignalCallbacks::new()
                    .on_value(move |_| c.lock().unwrap().push("outer-value"))
                    .on_cancel(move || d.lock().unwrap().push("outer-cancel")),
            );

        stage.observe(Signal::Value(serde_json::json!(1)));
        stage.observe(Signal::Cancel);
        assert_eq!(
            *log.lock().unwrap(),
            ["inner-value", "outer-value", "outer-cancel", "inner-cancel"]
        );
    }

    #[test]
    fn after_terminate_runs_once_every_layer_saw_the_fault() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (log.clone(), log.clone());
        let (c, d) = (log.clone(), log.clone());
        let stage = Stage::source("MultiRange", StageKind::multi())
            .peek(
                SignalCallbacks::new()
                    .on_fault(move |_| a.lock().unwrap().push("inner-fault"))
                    .on_after_terminate(move || b.lock().unwrap().push("inner-after")),
            )
            .peek(
                SignalCallbacks::new()
                    .on_fault(move |_| c.lock().unwrap().push("outer-fault"))
                    .on_after_terminate(move || d.lock().unwrap().push("outer-after")),
            );

        stage.observe(Signal::Fault(Fault::msg("boom")));
        assert_eq!(
            *log.lock().unwrap(),
            ["inner-fault", "outer-fault", "outer-after", "inner-after"]
        );
    }

    #[test]
    fn assembly_layer_enriches_faults_only() {
        let stage = Stage::source("MultiMap", StageKind::multi());
        let traced = stage.capture_assembly(AssemblySite::capture(stage.tag()));
        assert_eq!(traced.tag(), "MultiOnAssembly");
        assert!(traced.is_traced());
        assert!(!stage.is_traced());

        let Signal::Fault(fault) = traced.observe(Signal::Fault(Fault::msg("boom"))) else {
            panic!("fault signal expected");
        };
        assert_eq!(fault.suppressed().len(), 1);
        assert!(fault.suppressed()[0].starts_with("Assembly trace from producer [MultiMap]"));

        assert!(matches!(traced.observe(Signal::Complete), Signal::Complete));
    }
}
