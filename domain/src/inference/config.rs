//! Inference layer weights

use serde::{Deserialize, Serialize};

/// Confidence parameters of the inference layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceWeights {
    /// Multiplier applied to a rule's certainty
    pub inferred_weight: f64,
    /// Per-turn decay factor for carried-forward fields
    pub history_decay: f64,
    /// Lowest confidence a carried-forward field decays to
    pub history_floor: f64,
    /// Confidence of profile defaults
    pub default_confidence: f64,
    /// Aggregate confidence when no field came from a non-default layer
    pub aggregate_floor: f64,
}

impl Default for InferenceWeights {
    fn default() -> Self {
        Self {
            inferred_weight: 0.7,
            history_decay: 0.9,
            history_floor: 0.4,
            default_confidence: 0.3,
            aggregate_floor: 0.3,
        }
    }
}

impl InferenceWeights {
    /// Names of weights outside [0, 1].
    pub fn out_of_range(&self) -> Vec<&'static str> {
        [
            ("inferred_weight", self.inferred_weight),
            ("history_decay", self.history_decay),
            ("history_floor", self.history_floor),
            ("default_confidence", self.default_confidence),
            ("aggregate_floor", self.aggregate_floor),
        ]
        .into_iter()
        .filter(|(_, v)| !(0.0..=1.0).contains(v))
        .map(|(name, _)| name)
        .collect()
    }
}
