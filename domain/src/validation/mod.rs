//! Schema validation
//!
//! Checks an [`ExtractionResult`](crate::parameter::ExtractionResult)
//! against its [`ToolSchema`](crate::tool::ToolSchema). Every field is
//! inspected in declaration order; the report is capped but the `ok` flag
//! accounts for every violation found.

pub mod validator;

pub use validator::{SchemaValidator, ValidationResult, Violation, ViolationKind};
