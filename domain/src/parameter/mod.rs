//! Parameter model
//!
//! Every parameter value the pipeline produces is wrapped in a
//! [`ParameterField`] that records *where* it came from ([`Provenance`])
//! and *how much* it is trusted (confidence in [0, 1]).
//!
//! ```text
//! Explicit (1.0) > Inferred (weight × certainty) > History (decayed) > Default (0.3)
//! ```
//!
//! The per-turn [`ExtractionResult`] is immutable once the inference engine
//! produces it; the workflow keeps the latest one as the History input of
//! the next turn.

pub mod entities;
pub mod value_objects;

pub use entities::{ExtractionResult, ParameterField};
pub use value_objects::{ExplicitField, ParameterValue, Provenance};
