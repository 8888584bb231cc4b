//! Infrastructure layer for tutor-orchestrator
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod nlu;
#[cfg(feature = "http-tools")]
pub mod tool_service;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use logging::{JsonlWorkflowObserver, TracingObserver};
pub use nlu::KeywordNluGateway;
#[cfg(feature = "http-tools")]
pub use tool_service::HttpToolService;
