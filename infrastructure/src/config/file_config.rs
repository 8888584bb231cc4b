//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Durations are plain integers (`*_ms` / `*_secs`) so the file stays
//! readable; [`FileConfig::to_orchestrator_config`] turns them into the
//! application's [`OrchestratorConfig`].
//!
//! ```toml
//! [workflow]
//! intent_confidence_threshold = 0.5
//! max_clarification_attempts = 3
//!
//! [execution]
//! timeout_secs = 30
//! max_attempts = 3
//!
//! [tool_service]
//! base_url = "http://localhost:8000"
//!
//! # Replaces the built-in contextual rule table when present
//! [[rules]]
//! signal = "distress"
//! keywords = ["struggling", "stuck"]
//! field = "difficulty"
//! value = "easy"
//! certainty = 0.9
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tutor_application::{OrchestratorConfig, RetryPolicy};
use tutor_domain::{
    DefaultPolicy, InferenceRule, InferenceWeights, RuleTable, SchemaRegistry, ToolType,
};

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("{0}: timeout cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("{0}: max_attempts cannot be 0")]
    ZeroAttempts(&'static str),

    #[error("{name} must be between 0 and 1 (got {value})")]
    OutOfUnitRange { name: String, value: f64 },

    #[error("validation.max_violations cannot be 0")]
    ZeroViolationCap,

    #[error("tool_service.base_url cannot be empty")]
    EmptyToolServiceUrl,

    #[error("rules[{0}]: keywords cannot be empty")]
    EmptyRuleKeywords(usize),

    #[error("rules[{index}]: no tool has a field named '{field}'")]
    UnknownRuleField { index: usize, field: String },
}

/// Routing and clarification ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    /// Classifications below this confidence trigger disambiguation
    pub intent_confidence_threshold: f64,
    /// Clarifications per request before escalation
    pub max_clarification_attempts: u32,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        Self {
            intent_confidence_threshold: 0.5,
            max_clarification_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileValidationConfig {
    /// Violations reported per validation
    pub max_violations: usize,
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        Self { max_violations: 5 }
    }
}

/// How many prior turns each stage sees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHistoryConfig {
    pub classification_window: usize,
    pub extraction_window: usize,
}

impl Default for FileHistoryConfig {
    fn default() -> Self {
        Self {
            classification_window: 5,
            extraction_window: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClarificationConfig {
    /// Budget for NLU phrasing before the template is used
    pub timeout_ms: u64,
}

impl Default for FileClarificationConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

/// Timeout and backoff for one kind of outbound call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            backoff_base_ms: 200,
            backoff_max_ms: 2000,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                Duration::from_millis(self.backoff_base_ms),
                Duration::from_millis(self.backoff_max_ms),
            )
    }

    fn validate(&self, section: &'static str, issues: &mut Vec<ConfigValidationError>) {
        if self.timeout_secs == 0 {
            issues.push(ConfigValidationError::ZeroTimeout(section));
        }
        if self.max_attempts == 0 {
            issues.push(ConfigValidationError::ZeroAttempts(section));
        }
    }
}

/// Location of the downstream content tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolServiceConfig {
    pub base_url: String,
}

impl Default for FileToolServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub workflow: FileWorkflowConfig,
    pub validation: FileValidationConfig,
    pub history: FileHistoryConfig,
    /// Layer weights of the inference engine
    pub inference: InferenceWeights,
    /// Profile-layer defaults
    pub defaults: DefaultPolicy,
    pub clarification: FileClarificationConfig,
    /// Tool service calls
    pub execution: FileRetryConfig,
    /// NLU classification and extraction calls
    pub capability: FileRetryConfig,
    pub tool_service: FileToolServiceConfig,
    /// Contextual rules in evaluation order; `None` keeps the built-in table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<InferenceRule>>,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        let threshold = self.workflow.intent_confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            issues.push(ConfigValidationError::OutOfUnitRange {
                name: "workflow.intent_confidence_threshold".to_string(),
                value: threshold,
            });
        }

        for (name, value) in [
            ("inferred_weight", self.inference.inferred_weight),
            ("history_decay", self.inference.history_decay),
            ("history_floor", self.inference.history_floor),
            ("default_confidence", self.inference.default_confidence),
            ("aggregate_floor", self.inference.aggregate_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigValidationError::OutOfUnitRange {
                    name: format!("inference.{}", name),
                    value,
                });
            }
        }

        if self.validation.max_violations == 0 {
            issues.push(ConfigValidationError::ZeroViolationCap);
        }

        if self.clarification.timeout_ms == 0 {
            issues.push(ConfigValidationError::ZeroTimeout("clarification"));
        }
        self.execution.validate("execution", &mut issues);
        self.capability.validate("capability", &mut issues);

        if self.tool_service.base_url.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyToolServiceUrl);
        }

        if let Some(rules) = &self.rules {
            let registry = SchemaRegistry::builtin();
            for (index, rule) in rules.iter().enumerate() {
                if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                    issues.push(ConfigValidationError::EmptyRuleKeywords(index));
                }
                let known = ToolType::ALL
                    .iter()
                    .filter_map(|tool| registry.get(*tool))
                    .any(|schema| schema.has_field(&rule.field));
                if !known {
                    issues.push(ConfigValidationError::UnknownRuleField {
                        index,
                        field: rule.field.clone(),
                    });
                }
                if !(0.0..=1.0).contains(&rule.certainty) {
                    issues.push(ConfigValidationError::OutOfUnitRange {
                        name: format!("rules[{}].certainty", index),
                        value: rule.certainty,
                    });
                }
            }
        }

        issues
    }

    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            intent_confidence_threshold: self.workflow.intent_confidence_threshold,
            max_clarification_attempts: self.workflow.max_clarification_attempts,
            max_violations: self.validation.max_violations,
            classification_history_window: self.history.classification_window,
            extraction_history_window: self.history.extraction_window,
            weights: self.inference,
            defaults: self.defaults.clone(),
            clarification_timeout: Duration::from_millis(self.clarification.timeout_ms),
            execution: self.execution.to_policy(),
            capability_retry: self.capability.to_policy(),
            rules: self
                .rules
                .clone()
                .map(RuleTable::new)
                .unwrap_or_default(),
        }
    }
}
