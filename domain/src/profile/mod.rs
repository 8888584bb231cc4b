//! Learner profile
//!
//! The [`UserProfile`] is supplied by the caller for every turn and never
//! mutated by the pipeline. Profile-derived signals ([`MasteryBand`],
//! strain) drive the lowest-priority default layer of parameter inference.

pub mod entities;

pub use entities::{MasteryBand, TeachingStyle, UserProfile};
