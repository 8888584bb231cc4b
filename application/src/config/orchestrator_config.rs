//! Orchestrator configuration: turn pipeline parameters.
//!
//! [`OrchestratorConfig`] groups everything the turn controller and its
//! stages need. It is built once (by the infrastructure config loader or by
//! tests) and shared read-only.

use super::retry_policy::RetryPolicy;
use std::time::Duration;
use tutor_domain::{DefaultPolicy, InferenceEngine, InferenceWeights, RuleTable, WorkflowPolicy};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Classifications below this confidence trigger disambiguation
    pub intent_confidence_threshold: f64,
    /// Clarifications per request before escalation
    pub max_clarification_attempts: u32,
    /// Violations reported per validation
    pub max_violations: usize,
    /// History turns passed to intent classification
    pub classification_history_window: usize,
    /// History turns passed to extraction, clarification and tools
    pub extraction_history_window: usize,
    pub weights: InferenceWeights,
    pub defaults: DefaultPolicy,
    pub rules: RuleTable,
    /// Budget for NLU clarification phrasing before the template is used
    pub clarification_timeout: Duration,
    /// Tool service calls
    pub execution: RetryPolicy,
    /// NLU classification and extraction calls
    pub capability_retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            intent_confidence_threshold: 0.5,
            max_clarification_attempts: 3,
            max_violations: 5,
            classification_history_window: 5,
            extraction_history_window: 10,
            weights: InferenceWeights::default(),
            defaults: DefaultPolicy::default(),
            rules: RuleTable::default_rules(),
            clarification_timeout: Duration::from_secs(5),
            execution: RetryPolicy::default(),
            capability_retry: RetryPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            intent_confidence_threshold: self.intent_confidence_threshold,
            max_clarification_attempts: self.max_clarification_attempts,
        }
    }

    pub fn inference_engine(&self) -> InferenceEngine {
        InferenceEngine::new(self.rules.clone(), self.defaults.clone(), self.weights)
    }

    // ==================== Builder Methods ====================

    pub fn with_intent_confidence_threshold(mut self, threshold: f64) -> Self {
        self.intent_confidence_threshold = threshold;
        self
    }

    pub fn with_max_clarification_attempts(mut self, max: u32) -> Self {
        self.max_clarification_attempts = max;
        self
    }

    pub fn with_max_violations(mut self, max: usize) -> Self {
        self.max_violations = max;
        self
    }

    pub fn with_clarification_timeout(mut self, timeout: Duration) -> Self {
        self.clarification_timeout = timeout;
        self
    }

    pub fn with_execution(mut self, policy: RetryPolicy) -> Self {
        self.execution = policy;
        self
    }

    pub fn with_capability_retry(mut self, policy: RetryPolicy) -> Self {
        self.capability_retry = policy;
        self
    }
}
