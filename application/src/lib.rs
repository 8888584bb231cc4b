//! Application layer for tutor-orchestrator
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{OrchestratorConfig, RetryPolicy};
pub use ports::{
    nlu_gateway::{GatewayError, NluGateway},
    tool_service::{ToolInvocationError, ToolServicePort},
    workflow_observer::{NoObserver, StageObservation, WorkflowObserver},
};
pub use use_cases::classify_intent::{CapabilityError, ClassifyIntentUseCase};
pub use use_cases::execute_tool::{ExecutionCancelled, ExecutionContext, ToolExecutionClient};
pub use use_cases::extract_parameters::{
    ExtractParametersError, ExtractParametersInput, ExtractParametersUseCase,
};
pub use use_cases::generate_clarification::{
    ClarificationCancelled, GenerateClarificationUseCase,
};
pub use use_cases::process_turn::{ProcessTurnError, ProcessTurnInput, ProcessTurnUseCase};
