//! Versioned workflow snapshots
//!
//! The serialized form of a [`WorkflowState`] handed to whatever persists
//! conversations between turns.

use super::outcome::TerminalOutcome;
use super::stage::WorkflowStage;
use super::state::{ProcessingLogEntry, WorkflowState};
use crate::clarification::ClarificationRequest;
use crate::core::error::DomainError;
use crate::parameter::ExtractionResult;
use crate::tool::IntentClassification;
use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub version: u32,
    pub conversation_id: String,
    pub stage: WorkflowStage,
    pub turn: u32,
    pub clarification_attempts: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_clarification: Option<ClarificationRequest>,
    #[serde(default)]
    pub log: Vec<ProcessingLogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TerminalOutcome>,
}

impl WorkflowSnapshot {
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::SnapshotDecode(e.to_string()))
    }

    /// Decode, rejecting versions this build does not understand.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let raw: serde_json::Value =
            serde_json::from_str(json).map_err(|e| DomainError::SnapshotDecode(e.to_string()))?;
        let version = raw
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| DomainError::SnapshotDecode("missing version".to_string()))?;
        if version != u64::from(SNAPSHOT_VERSION) {
            return Err(DomainError::UnsupportedSnapshotVersion {
                found: u32::try_from(version).unwrap_or(u32::MAX),
                expected: SNAPSHOT_VERSION,
            });
        }
        serde_json::from_value(raw).map_err(|e| DomainError::SnapshotDecode(e.to_string()))
    }
}

impl WorkflowState {
    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            version: SNAPSHOT_VERSION,
            conversation_id: self.conversation_id.clone(),
            stage: self.stage,
            turn: self.turn,
            clarification_attempts: self.clarification_attempts,
            message: self.message.clone(),
            intent: self.intent.clone(),
            extraction: self.extraction.clone(),
            validation: self.validation.clone(),
            clarification: self.clarification.clone(),
            pending_clarification: self.pending_clarification.clone(),
            log: self.log.clone(),
            outcome: self.outcome.clone(),
        }
    }

    pub fn restore(snapshot: WorkflowSnapshot) -> Result<Self, DomainError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DomainError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(Self {
            conversation_id: snapshot.conversation_id,
            stage: snapshot.stage,
            turn: snapshot.turn,
            clarification_attempts: snapshot.clarification_attempts,
            message: snapshot.message,
            intent: snapshot.intent,
            extraction: snapshot.extraction,
            validation: snapshot.validation,
            clarification: snapshot.clarification,
            pending_clarification: snapshot.pending_clarification,
            log: snapshot.log,
            outcome: snapshot.outcome,
        })
    }
}
