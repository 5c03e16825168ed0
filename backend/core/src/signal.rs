//! Lifecycle signals and the optional callbacks that observe them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{Element, Fault};

/// A signal crossing a stage.
#[derive(Debug, Clone)]
pub enum Signal {
    /// An observer attached.
    Subscribe,
    /// Demand for `n` more values, travelling upstream.
    Request(u64),
    /// Cancellation, travelling upstream.
    Cancel,
    Value(Element),
    Fault(Fault),
    Complete,
}

impl Signal {
    pub fn signal_type(&self) -> SignalType {
        match self {
            Self::Subscribe => SignalType::OnSubscribe,
            Self::Request(_) => SignalType::Request,
            Self::Cancel => SignalType::Cancel,
            Self::Value(_) => SignalType::OnNext,
            Self::Fault(_) => SignalType::OnError,
            Self::Complete => SignalType::OnComplete,
        }
    }

    /// Upstream signals flow from subscriber to source.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Cancel)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fault(_) | Self::Complete)
    }
}

/// The seven observable lifecycle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    OnSubscribe,
    OnNext,
    OnError,
    OnComplete,
    AfterTerminate,
    Request,
    Cancel,
}

impl SignalType {
    pub const ALL: [SignalType; 7] = [
        Self::OnSubscribe,
        Self::OnNext,
        Self::OnError,
        Self::OnComplete,
        Self::AfterTerminate,
        Self::Request,
        Self::Cancel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnSubscribe => "onSubscribe",
            Self::OnNext => "onNext",
            Self::OnError => "onError",
            Self::OnComplete => "onComplete",
            Self::AfterTerminate => "afterTerminate",
            Self::Request => "request",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

pub type Task = Arc<dyn Fn() + Send + Sync>;
pub type ValueCallback = Arc<dyn Fn(&Element) + Send + Sync>;
pub type FaultCallback = Arc<dyn Fn(&Fault) + Send + Sync>;
pub type RequestCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Up to seven optional lifecycle observers attached by one decoration.
#[derive(Clone, Default)]
pub struct SignalCallbacks {
    pub on_subscribe: Option<Task>,
    pub on_value: Option<ValueCallback>,
    pub on_fault: Option<FaultCallback>,
    pub on_complete: Option<Task>,
    pub on_after_terminate: Option<Task>,
    pub on_request: Option<RequestCallback>,
    pub on_cancel: Option<Task>,
}

impl SignalCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_subscribe(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_subscribe = Some(Arc::new(f));
        self
    }

    pub fn on_value(mut self, f: impl Fn(&Element) + Send + Sync + 'static) -> Self {
        self.on_value = Some(Arc::new(f));
        self
    }

    pub fn on_fault(mut self, f: impl Fn(&Fault) + Send + Sync + 'static) -> Self {
        self.on_fault = Some(Arc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    pub fn on_after_terminate(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_after_terminate = Some(Arc::new(f));
        self
    }

    pub fn on_request(mut self, f: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.on_request = Some(Arc::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(f));
        self
    }

    /// Whether an observer is attached for the given kind.
    pub fn observes(&self, kind: SignalType) -> bool {
        match kind {
            SignalType::OnSubscribe => self.on_subscribe.is_some(),
            SignalType::OnNext => self.on_value.is_some(),
            SignalType::OnError => self.on_fault.is_some(),
            SignalType::OnComplete => self.on_complete.is_some(),
            SignalType::AfterTerminate => self.on_after_terminate.is_some(),
            SignalType::Request => self.on_request.is_some(),
            SignalType::Cancel => self.on_cancel.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !SignalType::ALL.iter().any(|kind| self.observes(*kind))
    }

    /// Fire the observers matching `signal`. Terminal signals also run
    /// the after-terminate task once their own observer has run.
    pub fn fire(&self, signal: &Signal) {
        self.notify(signal);
        if signal.is_terminal() {
            self.after_terminate();
        }
    }

    /// Fire the observer matching `signal`, leaving after-terminate alone.
    pub fn notify(&self, signal: &Signal) {
        match signal {
            Signal::Subscribe => run(&self.on_subscribe),
            Signal::Request(n) => {
                if let Some(f) = &self.on_request {
                    f(*n);
                }
            }
            Signal::Cancel => run(&self.on_cancel),
            Signal::Value(value) => {
                if let Some(f) = &self.on_value {
                    f(value);
                }
            }
            Signal::Fault(fault) => {
                if let Some(f) = &self.on_fault {
                    f(fault);
                }
            }
            Signal::Complete => run(&self.on_complete),
        }
    }

    pub fn after_terminate(&self) {
        run(&self.on_after_terminate);
    }
}

fn run(task: &Option<Task>) {
    if let Some(task) = task {
        task();
    }
}

impl fmt::Debug for SignalCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observed: Vec<&str> = SignalType::ALL
            .iter()
            .filter(|kind| self.observes(**kind))
            .map(|kind| kind.as_str())
            .collect();
        f.debug_struct("SignalCallbacks").field("observed", &observed).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_by_default() {
        assert!(SignalCallbacks::new().is_empty());
        assert!(!SignalCallbacks::new().on_cancel(|| {}).is_empty());
    }

    #[test]
    fn terminal_signals_run_after_terminate() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let callbacks = SignalCallbacks::new().on_after_terminate(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        callbacks.fire(&Signal::Value(serde_json::json!("x")));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        callbacks.fire(&Signal::Complete);
        callbacks.fire(&Signal::Fault(Fault::msg("boom")));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn request_passes_demand() {
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        let callbacks = SignalCallbacks::new().on_request(move |n| {
            s.store(n as usize, Ordering::SeqCst);
        });
        callbacks.fire(&Signal::Request(32));
        assert_eq!(seen.load(Ordering::SeqCst), 32);
        assert!(callbacks.observes(SignalType::Request));
        assert!(!callbacks.observes(SignalType::OnNext));
    }
}
