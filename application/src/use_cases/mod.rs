//! Use cases (application services)
//!
//! One use case per pipeline stage, plus [`process_turn`] which sequences
//! them through the workflow state machine.

pub mod classify_intent;
pub mod execute_tool;
pub mod extract_parameters;
pub mod generate_clarification;
pub mod process_turn;
pub(crate) mod shared;
