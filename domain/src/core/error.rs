//! Domain error types

use crate::tool::entities::ToolType;
use crate::workflow::stage::WorkflowStage;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown tool type: {0}")]
    UnknownToolType(String),

    #[error("No schema registered for tool: {0}")]
    SchemaNotFound(ToolType),

    #[error("Extraction for {extraction} cannot be checked against the {schema} schema")]
    SchemaMismatch {
        extraction: ToolType,
        schema: ToolType,
    },

    #[error("Field '{field}' is not usable for a {tool} request: {detail}")]
    InvalidRequestField {
        tool: ToolType,
        field: String,
        detail: String,
    },

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },

    #[error("Snapshot could not be decoded: {0}")]
    SnapshotDecode(String),
}

/// Illegal workflow state-machine move
///
/// These indicate a controller bug or a corrupted snapshot, never a
/// learner-facing condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("Event '{event}' is not valid in stage {stage}")]
    InvalidTransition {
        stage: WorkflowStage,
        event: &'static str,
    },

    #[error("A turn is already in progress (stage {0})")]
    TurnInProgress(WorkflowStage),

    #[error("Intent was not resolved to a tool")]
    IntentNotResolved,

    #[error("Extraction is for {found} but the classified tool is {expected}")]
    ToolMismatch { expected: ToolType, found: ToolType },

    #[error("Cannot execute: validation reported violations")]
    ValidationFailed,

    #[error("Cannot clarify: nothing needs clarifying")]
    NothingToClarify,

    #[error("Clarification ceiling reached after {0} attempts")]
    CeilingReached(u32),

    #[error("Cannot escalate: {attempts} of {max} clarification attempts used")]
    CeilingNotReached { attempts: u32, max: u32 },
}
