//! Workflow observer that forwards transitions to `tracing`.

use tracing::info;
use tutor_application::{StageObservation, WorkflowObserver};

/// Emits one `info!` event per transition under the `workflow` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl WorkflowObserver for TracingObserver {
    fn observe(&self, observation: &StageObservation) {
        info!(
            target: "workflow",
            conversation_id = %observation.conversation_id,
            turn = observation.turn,
            event = %observation.event,
            stage = observation.stage.as_str(),
            duration_ms = observation.duration_ms,
            "{}",
            observation.outcome
        );
    }
}
