//! Port definitions (interfaces for external dependencies)
//!
//! Ports define the capabilities the orchestration core consumes. Adapters
//! in the infrastructure layer implement them; tests substitute
//! deterministic fakes.

pub mod nlu_gateway;
pub mod tool_service;
pub mod workflow_observer;
