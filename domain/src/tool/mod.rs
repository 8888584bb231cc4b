//! Tool domain module
//!
//! The closed set of downstream content-generation tools and their
//! contracts.
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolType     │───▶│ ToolSchema    │───▶│ ToolRequest  │───▶│ ToolResponse │
//! │ (routing)    │    │ (contract)    │    │ (typed call) │    │ (outcome)    │
//! └──────────────┘    └───────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolType`] / [`Intent`] / [`IntentClassification`]: routing decision
//! - [`SchemaRegistry`]: read-only per-tool field contracts
//! - [`ToolRequest`]: typed parameter record built from a validated extraction
//! - [`ToolResponse`]: execution outcome with [`FailureKind`] classification
//! - [`AttemptId`]: deterministic per-attempt identifier for deduplication

pub mod entities;
pub mod request;
pub mod schema;
pub mod value_objects;

pub use entities::{Intent, IntentClassification, ToolType};
pub use request::{
    ConceptExplainerRequest, Depth, Difficulty, FlashcardRequest, NoteMakerRequest,
    NoteTakingStyle, ToolRequest,
};
pub use schema::{Constraint, FieldDescriptor, FieldType, SchemaRegistry, ToolSchema};
pub use value_objects::{AttemptId, FailureKind, ToolError, ToolResponse};
