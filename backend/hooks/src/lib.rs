//! Process-wide assembly hooks for pipeline stages.
//!
//! Install callbacks on a [`HookRegistry`]; every stage built through the
//! [`AssemblyInterceptor`] (directly or via [`PipelineAssembler`]) is handed
//! to the creation hook as an [`OperatorHook`] before the builder returns it.

pub mod bootstrap;
pub mod builtin;
pub mod filter;
pub mod interceptor;
pub mod operator_hook;
pub mod pipeline;
pub mod registry;

pub use interceptor::{AssemblyInterceptor, intercept};
pub use operator_hook::OperatorHook;
pub use pipeline::PipelineAssembler;
pub use registry::{
    CreationHook, DroppedErrorHandler, DroppedValueHandler, FaultMapper, HookRegistry, HookSlot,
};
