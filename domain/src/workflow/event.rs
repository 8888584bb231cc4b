use crate::clarification::ClarificationRequest;
use crate::parameter::ExtractionResult;
use crate::tool::{IntentClassification, ToolResponse, ToolType};
use crate::validation::ValidationResult;

use super::outcome::WorkflowFailure;

/// Input to [`WorkflowState::apply`](super::WorkflowState::apply)
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    TurnStarted { message: String },
    IntentClassified(IntentClassification),
    ParametersExtracted(ExtractionResult),
    Validated(ValidationResult),
    ExecutionStarted,
    ClarificationIssued {
        kind: ClarificationKind,
        text: String,
        /// Fields asked about; `None` for disambiguation
        request: Option<ClarificationRequest>,
    },
    Escalated,
    ToolFinished(ToolResponse),
    Aborted(WorkflowFailure),
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::TurnStarted { .. } => "turn_started",
            WorkflowEvent::IntentClassified(_) => "intent_classified",
            WorkflowEvent::ParametersExtracted(_) => "parameters_extracted",
            WorkflowEvent::Validated(_) => "validated",
            WorkflowEvent::ExecutionStarted => "execution_started",
            WorkflowEvent::ClarificationIssued { .. } => "clarification_issued",
            WorkflowEvent::Escalated => "escalated",
            WorkflowEvent::ToolFinished(_) => "tool_finished",
            WorkflowEvent::Aborted(_) => "aborted",
        }
    }
}

/// Why a clarification is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationKind {
    /// The tool could not be determined
    Disambiguation,
    /// Validation reported violations
    MissingParameters,
}

/// What the controller must do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    ClassifyIntent,
    ExtractParameters(ToolType),
    Validate(ToolType),
    Execute(ToolType),
    Clarify(ClarificationKind),
    Escalate,
    /// Turn is over; wait for the learner's next message
    AwaitUser,
    /// A tool call is in flight
    AwaitTool,
    Done,
}
