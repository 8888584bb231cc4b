//! Clarification questions
//!
//! Turns a failed [`ValidationResult`](crate::validation::ValidationResult)
//! into one question that names every reported field. Phrasing may come
//! from an external capability; [`ClarificationTemplate`] is the
//! deterministic fallback and the judge of whether foreign phrasing is
//! usable.

pub mod template;

pub use template::{ClarificationField, ClarificationRequest, ClarificationTemplate};
