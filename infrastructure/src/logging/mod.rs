//! Logging infrastructure: workflow observation adapters.
//!
//! Provides [`JsonlWorkflowObserver`], a JSONL file writer, and
//! [`TracingObserver`], both implementing the
//! [`WorkflowObserver`](tutor_application::WorkflowObserver) port.

mod jsonl_observer;
mod tracing_observer;

pub use jsonl_observer::JsonlWorkflowObserver;
pub use tracing_observer::TracingObserver;
