//! Port for observing workflow transitions.
//!
//! Every applied transition is reported once through [`WorkflowObserver`].
//! This is the only channel through which the pipeline talks to
//! persistence or analytics collaborators.
//!
//! The `observe` method is synchronous and non-fallible so an observer can
//! never stall or break a turn; failures are the adapter's to swallow.

use serde::Serialize;
use tutor_domain::{ProcessingLogEntry, WorkflowStage};

/// One transition as seen by observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageObservation {
    pub conversation_id: String,
    pub turn: u32,
    pub event: String,
    pub stage: WorkflowStage,
    pub outcome: String,
    pub duration_ms: u64,
}

impl StageObservation {
    pub fn from_entry(conversation_id: &str, entry: &ProcessingLogEntry) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            turn: entry.turn,
            event: entry.event.clone(),
            stage: entry.stage,
            outcome: entry.outcome.clone(),
            duration_ms: entry.duration_ms,
        }
    }
}

pub trait WorkflowObserver: Send + Sync {
    fn observe(&self, observation: &StageObservation);
}

/// No-op implementation for tests and when observation is disabled.
pub struct NoObserver;

impl WorkflowObserver for NoObserver {
    fn observe(&self, _observation: &StageObservation) {}
}
