//! Domain layer for tutor-orchestrator
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Tools and schemas
//!
//! A closed set of downstream content tools ([`ToolType`]), each with an
//! ordered field contract ([`ToolSchema`]) held by a read-only
//! [`SchemaRegistry`].
//!
//! ## Provenance
//!
//! Every parameter value carries the evidence layer that produced it:
//!
//! - **Explicit**: stated in the message
//! - **Inferred**: derived from message signals
//! - **History**: carried forward from an earlier turn
//! - **Default**: derived from the learner profile
//!
//! The [`InferenceEngine`] merges the layers with strict precedence.
//!
//! ## Workflow
//!
//! A pure state machine ([`WorkflowState::apply`]) sequences classification,
//! extraction, validation, clarification and execution per turn, with a
//! bounded clarification ceiling.

pub mod clarification;
pub mod conversation;
pub mod core;
pub mod inference;
pub mod parameter;
pub mod profile;
pub mod tool;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use clarification::{ClarificationField, ClarificationRequest, ClarificationTemplate};
pub use conversation::{ConversationTurn, Role, history_window, render_history};
pub use crate::core::error::{DomainError, TransitionError};
pub use inference::{
    DefaultPolicy, InferenceEngine, InferenceInput, InferenceRule, InferenceWeights, RuleTable,
    SignalClass,
};
pub use parameter::{ExplicitField, ExtractionResult, ParameterField, ParameterValue, Provenance};
pub use profile::{MasteryBand, TeachingStyle, UserProfile};
pub use tool::{
    AttemptId, ConceptExplainerRequest, Constraint, Depth, Difficulty, FailureKind,
    FieldDescriptor, FieldType, FlashcardRequest, Intent, IntentClassification, NoteMakerRequest,
    NoteTakingStyle, SchemaRegistry, ToolError, ToolRequest, ToolResponse, ToolSchema, ToolType,
};
pub use validation::{SchemaValidator, ValidationResult, Violation, ViolationKind};
pub use workflow::{
    ClarificationKind, FailureReason, NextStep, ProcessingLogEntry, SNAPSHOT_VERSION,
    TerminalOutcome, WorkflowEvent, WorkflowFailure, WorkflowPolicy, WorkflowSnapshot,
    WorkflowStage, WorkflowState,
};
