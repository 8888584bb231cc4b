//! Turn workflow state machine
//!
//! One [`WorkflowState`] per conversation. A turn is driven by a controller
//! that asks [`WorkflowState::next_step`] what to do, performs the I/O, and
//! feeds the result back as a [`WorkflowEvent`] through the pure
//! [`WorkflowState::apply`].
//!
//! ```text
//! Start ──▶ IntentClassified ──▶ ParametersExtracted ──▶ Validated ──▶ Executing ──▶ Completed
//!   ▲              │                                        │              └────────▶ Failed
//!   │              └──────── (uncertain) ───────┐           │ (violations)
//!   │                                           ▼           ▼
//!   └──────────── next turn ─────────────── Clarifying ◀────┘
//!                                    (ceiling reached ──▶ Failed / NeedsHumanReview)
//! ```
//!
//! Every applied event appends one [`ProcessingLogEntry`].

pub mod event;
pub mod outcome;
pub mod snapshot;
pub mod stage;
pub mod state;

pub use event::{ClarificationKind, NextStep, WorkflowEvent};
pub use outcome::{FailureReason, TerminalOutcome, WorkflowFailure};
pub use snapshot::{SNAPSHOT_VERSION, WorkflowSnapshot};
pub use stage::WorkflowStage;
pub use state::{ProcessingLogEntry, WorkflowPolicy, WorkflowState};
