//! Parameter inference
//!
//! Merges four evidence layers into one [`ExtractionResult`](crate::parameter::ExtractionResult),
//! field by field in schema order. For each field the first layer that can
//! supply a value wins:
//!
//! | Layer | Source | Confidence |
//! |-------|--------|------------|
//! | Explicit | literal NLU extraction | 1.0 |
//! | Inferred | [`RuleTable`] signal match | weight × certainty |
//! | History | prior turn's extraction | decayed per turn, floored |
//! | Default | [`DefaultPolicy`] from the profile | fixed, low |
//!
//! The engine is pure: it never mutates the profile, the history or the
//! prior extraction it is handed.

pub mod config;
pub mod defaults;
pub mod engine;
pub mod rules;

pub use config::InferenceWeights;
pub use defaults::DefaultPolicy;
pub use engine::{InferenceEngine, InferenceInput};
pub use rules::{InferenceRule, RuleMatch, RuleTable, SignalClass};
