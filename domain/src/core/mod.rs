//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] and [`error::TransitionError`]: domain-level errors
//! - [`string`]: text helpers shared by inference and clarification

pub mod error;
pub mod string;
