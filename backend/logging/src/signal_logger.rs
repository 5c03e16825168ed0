//! Signal Logger
//!
//! Observes lifecycle signals of one stage and emits them as structured
//! tracing events, scoped to a category and level.

use std::sync::Arc;

use tracing::Level;

use streamhook_core::{SignalCallbacks, SignalType};

use crate::redact::render_element;

/// Logging observer for one stage.
#[derive(Debug, Clone)]
pub struct SignalLogger {
    category: Arc<str>,
    stage: Arc<str>,
    level: Level,
    kinds: Vec<SignalType>,
}

impl SignalLogger {
    /// An empty `kinds` slice logs every signal kind.
    pub fn new(
        stage: impl Into<String>,
        category: impl Into<String>,
        level: Level,
        kinds: &[SignalType],
    ) -> Self {
        let kinds = if kinds.is_empty() { SignalType::ALL.to_vec() } else { kinds.to_vec() };
        Self {
            category: Arc::from(category.into()),
            stage: Arc::from(stage.into()),
            level,
            kinds,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn logs(&self, kind: SignalType) -> bool {
        self.kinds.contains(&kind)
    }

    /// Callbacks for the enabled kinds only; the rest stay unset so the
    /// decoration observes nothing it will not log.
    pub fn callbacks(&self) -> SignalCallbacks {
        let mut callbacks = SignalCallbacks::new();

        if self.logs(SignalType::OnSubscribe) {
            let this = self.clone();
            callbacks = callbacks.on_subscribe(move || this.emit(SignalType::OnSubscribe, None));
        }
        if self.logs(SignalType::OnNext) {
            let this = self.clone();
            callbacks = callbacks
                .on_value(move |value| this.emit(SignalType::OnNext, Some(render_element(value))));
        }
        if self.logs(SignalType::OnError) {
            let this = self.clone();
            callbacks = callbacks
                .on_fault(move |fault| this.emit(SignalType::OnError, Some(fault.error().to_string())));
        }
        if self.logs(SignalType::OnComplete) {
            let this = self.clone();
            callbacks = callbacks.on_complete(move || this.emit(SignalType::OnComplete, None));
        }
        if self.logs(SignalType::AfterTerminate) {
            let this = self.clone();
            callbacks =
                callbacks.on_after_terminate(move || this.emit(SignalType::AfterTerminate, None));
        }
        if self.logs(SignalType::Request) {
            let this = self.clone();
            callbacks =
                callbacks.on_request(move |n| this.emit(SignalType::Request, Some(n.to_string())));
        }
        if self.logs(SignalType::Cancel) {
            let this = self.clone();
            callbacks = callbacks.on_cancel(move || this.emit(SignalType::Cancel, None));
        }

        callbacks
    }

    fn emit(&self, kind: SignalType, detail: Option<String>) {
        let category = &*self.category;
        let stage = &*self.stage;
        let detail = detail.unwrap_or_default();
        match self.level {
            Level::ERROR => tracing::error!(target: "stage_signals", category, stage, signal = %kind, detail = %detail, "[{stage}] {kind}({detail})"),
            Level::WARN => tracing::warn!(target: "stage_signals", category, stage, signal = %kind, detail = %detail, "[{stage}] {kind}({detail})"),
            Level::INFO => tracing::info!(target: "stage_signals", category, stage, signal = %kind, detail = %detail, "[{stage}] {kind}({detail})"),
            Level::DEBUG => tracing::debug!(target: "stage_signals", category, stage, signal = %kind, detail = %detail, "[{stage}] {kind}({detail})"),
            _ => tracing::trace!(target: "stage_signals", category, stage, signal = %kind, detail = %detail, "[{stage}] {kind}({detail})"),
        }
    }
}
