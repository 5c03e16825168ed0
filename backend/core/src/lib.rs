pub mod error;
pub mod signal;
pub mod stage;
pub mod types;

pub use error::HookError;
pub use signal::{
    FaultCallback, RequestCallback, Signal, SignalCallbacks, SignalType, Task, ValueCallback,
};
pub use stage::{AssemblySite, Stage};
pub use types::{Arity, DecoratorShape, Element, Fault, FaultContext, StageKind};
