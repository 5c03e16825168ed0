/// Process-wide hook registry.
///
/// Four independent slots, each holding at most one callback: stage creation,
/// operator fault mapping, dropped faults and dropped values. Installing
/// replaces a slot in full; nothing is merged and nothing is remembered.
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use streamhook_core::{Element, Fault, FaultContext, HookError};

use crate::bootstrap;
use crate::operator_hook::OperatorHook;

// ---------------------------------------------------------------------------
// Callback types
// ---------------------------------------------------------------------------

/// Invoked once per stage construction. Must return a value; use
/// [`OperatorHook::ignore`] to leave a stage alone.
pub type CreationHook = dyn Fn(OperatorHook) -> Option<OperatorHook> + Send + Sync;

/// Translates a fault raised inside a stage before it propagates.
pub type FaultMapper = dyn Fn(Fault, Option<&FaultContext>) -> Fault + Send + Sync;

/// Receives faults that arrive after the pipeline terminated or was cancelled.
pub type DroppedErrorHandler = dyn Fn(&Fault) + Send + Sync;

/// Receives values that arrive after the pipeline terminated or was cancelled.
pub type DroppedValueHandler = dyn Fn(&Element) + Send + Sync;

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One optionally-empty, shared callback.
///
/// The lock is only held to swap or clone the `Arc`, so a reader observes
/// either the previous or the new callback, never a partial write.
pub struct HookSlot<F: ?Sized> {
    name: &'static str,
    value: RwLock<Option<Arc<F>>>,
}

impl<F: ?Sized> HookSlot<F> {
    fn new(name: &'static str) -> Self {
        Self { name, value: RwLock::new(None) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace the slot. An empty callback is rejected and the prior value kept.
    pub fn install(&self, hook: Option<Arc<F>>) -> Result<(), HookError> {
        let hook = hook.ok_or(HookError::InvalidConfiguration { slot: self.name })?;
        self.replace(hook);
        Ok(())
    }

    /// Clear the slot. Always succeeds.
    pub fn reset(&self) {
        let previous = self.write().take();
        // Released outside the lock: the old callback may read this slot on drop.
        drop(previous);
        warn!("[Hooks] Reset to factory defaults : {}", self.name);
    }

    pub fn current(&self) -> Option<Arc<F>> {
        self.read().clone()
    }

    pub fn is_installed(&self) -> bool {
        self.read().is_some()
    }

    fn replace(&self, hook: Arc<F>) {
        let previous = std::mem::replace(&mut *self.write(), Some(hook));
        // Released outside the lock, as in `reset`.
        drop(previous);
        warn!("[Hooks] Hooking new default : {}", self.name);
    }

    // A panic while holding the lock cannot leave a half-written Arc behind.
    fn read(&self) -> RwLockReadGuard<'_, Option<Arc<F>>> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<F>>> {
        self.value.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct Slots {
    creation: HookSlot<CreationHook>,
    fault_mapper: HookSlot<FaultMapper>,
    error_dropped: HookSlot<DroppedErrorHandler>,
    value_dropped: HookSlot<DroppedValueHandler>,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            creation: HookSlot::new("onAssembly"),
            fault_mapper: HookSlot::new("onOperatorError"),
            error_dropped: HookSlot::new("onErrorDropped"),
            value_dropped: HookSlot::new("onNextDropped"),
        }
    }
}

static GLOBAL: Lazy<HookRegistry> = Lazy::new(|| {
    let registry = HookRegistry::new();
    let config = streamhook_config::load_boot_config();
    if let Err(e) = bootstrap::install_defaults(&registry, &config) {
        warn!("[Hooks] Boot defaults not installed: {}", e);
    }
    registry
});

/// Cloneable handle to a set of hook slots. Clones share the same slots.
#[derive(Default, Clone)]
pub struct HookRegistry {
    slots: Arc<Slots>,
}

impl HookRegistry {
    /// A registry with every slot empty, independent of the global one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, initialised from the boot configuration
    /// on first use.
    pub fn global() -> &'static HookRegistry {
        &GLOBAL
    }

    pub fn creation_slot(&self) -> &HookSlot<CreationHook> {
        &self.slots.creation
    }

    pub fn fault_mapper_slot(&self) -> &HookSlot<FaultMapper> {
        &self.slots.fault_mapper
    }

    pub fn dropped_error_slot(&self) -> &HookSlot<DroppedErrorHandler> {
        &self.slots.error_dropped
    }

    pub fn dropped_value_slot(&self) -> &HookSlot<DroppedValueHandler> {
        &self.slots.value_dropped
    }

    // -- creation hook ------------------------------------------------------

    pub fn install_creation_hook(&self, hook: Option<Arc<CreationHook>>) -> Result<(), HookError> {
        self.slots.creation.install(hook)
    }

    /// Install a closure as the creation hook.
    pub fn on_assembly<F>(&self, hook: F)
    where
        F: Fn(OperatorHook) -> Option<OperatorHook> + Send + Sync + 'static,
    {
        self.slots.creation.replace(Arc::new(hook));
    }

    pub fn reset_creation_hook(&self) {
        self.slots.creation.reset();
    }

    pub fn creation_hook(&self) -> Option<Arc<CreationHook>> {
        self.slots.creation.current()
    }

    // -- fault mapper -------------------------------------------------------

    pub fn install_fault_mapper(&self, mapper: Option<Arc<FaultMapper>>) -> Result<(), HookError> {
        self.slots.fault_mapper.install(mapper)
    }

    pub fn on_operator_error<F>(&self, mapper: F)
    where
        F: Fn(Fault, Option<&FaultContext>) -> Fault + Send + Sync + 'static,
    {
        self.slots.fault_mapper.replace(Arc::new(mapper));
    }

    pub fn reset_fault_mapper(&self) {
        self.slots.fault_mapper.reset();
    }

    // -- dropped faults -----------------------------------------------------

    pub fn install_dropped_error_handler(
        &self,
        handler: Option<Arc<DroppedErrorHandler>>,
    ) -> Result<(), HookError> {
        self.slots.error_dropped.install(handler)
    }

    pub fn on_error_dropped<F>(&self, handler: F)
    where
        F: Fn(&Fault) + Send + Sync + 'static,
    {
        self.slots.error_dropped.replace(Arc::new(handler));
    }

    pub fn reset_dropped_error_handler(&self) {
        self.slots.error_dropped.reset();
    }

    // -- dropped values -----------------------------------------------------

    pub fn install_dropped_value_handler(
        &self,
        handler: Option<Arc<DroppedValueHandler>>,
    ) -> Result<(), HookError> {
        self.slots.value_dropped.install(handler)
    }

    pub fn on_value_dropped<F>(&self, handler: F)
    where
        F: Fn(&Element) + Send + Sync + 'static,
    {
        self.slots.value_dropped.replace(Arc::new(handler));
    }

    pub fn reset_dropped_value_handler(&self) {
        self.slots.value_dropped.reset();
    }

    /// Restore every slot to factory defaults.
    pub fn reset_all(&self) {
        self.reset_creation_hook();
        self.reset_fault_mapper();
        self.reset_dropped_error_handler();
        self.reset_dropped_value_handler();
    }

    // -- delivery-time dispatch ---------------------------------------------
    //
    // Called by running stages. Each call reads its slot afresh, so it sees
    // whatever is installed now, not what was installed at assembly time.

    /// Translate a fault raised by a stage. Without a mapper the context is
    /// attached to the fault as a suppressed note.
    pub fn map_operator_fault(&self, fault: Fault, context: Option<&FaultContext>) -> Fault {
        match self.slots.fault_mapper.current() {
            Some(mapper) => mapper(fault, context),
            None => match context {
                Some(ctx) => fault.with_suppressed(ctx.describe()),
                None => fault,
            },
        }
    }

    /// Hand over a fault that can no longer be delivered.
    pub fn error_dropped(&self, fault: &Fault) {
        match self.slots.error_dropped.current() {
            Some(handler) => handler(fault),
            None => debug!("[Hooks] Fault dropped: {}", fault.error()),
        }
    }

    /// Hand over a value that can no longer be delivered.
    pub fn value_dropped(&self, value: &Element) {
        match self.slots.value_dropped.current() {
            Some(handler) => handler(value),
            None => debug!("[Hooks] Value dropped: {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured<F: FnOnce()>(f: F) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        String::from_utf8(capture.0.lock().unwrap().clone()).unwrap()
    }

    /// Reads the dropped-value slot when the closure owning it is released.
    struct ReadsSlotOnDrop {
        registry: HookRegistry,
        observed: Arc<AtomicBool>,
    }

    impl Drop for ReadsSlotOnDrop {
        fn drop(&mut self) {
            let installed = self.registry.dropped_value_slot().is_installed();
            self.observed.store(installed, Ordering::SeqCst);
        }
    }

    fn install_reader(registry: &HookRegistry) -> Arc<AtomicBool> {
        let observed = Arc::new(AtomicBool::new(false));
        let reader = ReadsSlotOnDrop { registry: registry.clone(), observed: observed.clone() };
        registry.on_value_dropped(move |_| {
            let _reader = &reader;
        });
        observed
    }

    fn completes_within<F: FnOnce() + Send + 'static>(f: F) -> bool {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            f();
            let _ = tx.send(());
        });
        rx.recv_timeout(Duration::from_secs(5)).is_ok()
    }

    #[test]
    fn slots_start_empty() {
        let registry = HookRegistry::new();
        assert!(!registry.creation_slot().is_installed());
        assert!(!registry.fault_mapper_slot().is_installed());
        assert!(!registry.dropped_error_slot().is_installed());
        assert!(!registry.dropped_value_slot().is_installed());
    }

    #[test]
    fn empty_install_is_rejected_and_keeps_prior_value() {
        let registry = HookRegistry::new();
        registry.on_assembly(|hook| Some(hook.ignore()));
        let before = registry.creation_hook().unwrap();

        let err = registry.install_creation_hook(None).unwrap_err();
        assert!(matches!(err, HookError::InvalidConfiguration { slot: "onAssembly" }));
        assert!(Arc::ptr_eq(&before, &registry.creation_hook().unwrap()));

        assert!(registry.install_fault_mapper(None).is_err());
        assert!(registry.install_dropped_error_handler(None).is_err());
        assert!(registry.install_dropped_value_handler(None).is_err());
    }

    #[test]
    fn install_replaces_rather_than_merges() {
        let registry = HookRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        registry.on_value_dropped(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let s = second.clone();
        registry.on_value_dropped(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        registry.value_dropped(&json!("late"));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_is_idempotent() {
        let registry = HookRegistry::new();
        registry.reset_all();
        registry.on_error_dropped(|_| {});
        registry.reset_dropped_error_handler();
        registry.reset_dropped_error_handler();
        assert!(!registry.dropped_error_slot().is_installed());
    }

    #[test]
    fn default_fault_mapping_attaches_context() {
        let registry = HookRegistry::new();
        let fault = Fault::msg("boom");

        let plain = registry.map_operator_fault(fault.clone(), None);
        assert!(plain.suppressed().is_empty());

        let ctx = FaultContext::Value(json!({"id": 7}));
        let mapped = registry.map_operator_fault(fault.clone(), Some(&ctx));
        assert!(mapped.same_cause(&fault));
        assert_eq!(mapped.suppressed(), [r#"while processing value {"id":7}"#]);
    }

    #[test]
    fn installed_fault_mapper_wins_until_reset() {
        let registry = HookRegistry::new();
        registry.on_operator_error(|fault, _| Fault::msg(format!("wrapped: {}", fault.error())));
        let mapped = registry.map_operator_fault(Fault::msg("boom"), None);
        assert_eq!(mapped.to_string(), "wrapped: boom");

        registry.reset_fault_mapper();
        let mapped = registry.map_operator_fault(Fault::msg("boom"), None);
        assert_eq!(mapped.to_string(), "boom");
    }

    #[test]
    fn clones_share_slots() {
        let registry = HookRegistry::new();
        let handle = registry.clone();
        handle.on_error_dropped(|_| {});
        assert!(registry.dropped_error_slot().is_installed());
    }

    #[test]
    fn replaced_callback_may_read_its_own_slot_while_dropping() {
        let registry = HookRegistry::new();
        let observed = install_reader(&registry);

        let handle = registry.clone();
        assert!(completes_within(move || handle.on_value_dropped(|_| {})));
        assert!(observed.load(Ordering::SeqCst));
    }

    #[test]
    fn reset_callback_may_read_its_own_slot_while_dropping() {
        let registry = HookRegistry::new();
        let observed = install_reader(&registry);
        observed.store(true, Ordering::SeqCst);

        let handle = registry.clone();
        assert!(completes_within(move || handle.reset_dropped_value_handler()));
        assert!(!observed.load(Ordering::SeqCst));
    }

    #[test]
    fn install_and_reset_are_logged_per_slot() {
        let registry = HookRegistry::new();
        let out = captured(|| {
            registry.on_assembly(|hook| Some(hook));
            registry.on_operator_error(|fault, _| fault);
            registry.reset_creation_hook();
            let _ = registry.install_dropped_error_handler(None);
        });
        assert!(out.contains("[Hooks] Hooking new default : onAssembly"));
        assert!(out.contains("[Hooks] Hooking new default : onOperatorError"));
        assert!(out.contains("[Hooks] Reset to factory defaults : onAssembly"));
        assert!(!out.contains("onErrorDropped"));
    }
}
