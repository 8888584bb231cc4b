//! Application-level configuration.
//!
//! - [`OrchestratorConfig`]: thresholds, windows and weights of the turn pipeline
//! - [`RetryPolicy`]: timeout and bounded exponential backoff for outbound calls

pub mod orchestrator_config;
pub mod retry_policy;

pub use orchestrator_config::OrchestratorConfig;
pub use retry_policy::RetryPolicy;
