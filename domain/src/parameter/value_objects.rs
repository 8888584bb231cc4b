//! Parameter value objects

use serde::{Deserialize, Serialize};

/// A scalar parameter value.
///
/// Untagged so the JSON form is the bare value (`"easy"`, `5`, `true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl ParameterValue {
    /// Convert a JSON value; whole floats become integers, other shapes are rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Integer).or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| Self::Integer(f as i64))
            }),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::Boolean(_) => "boolean",
            ParameterValue::Integer(_) => "integer",
            ParameterValue::Text(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Blank text counts as absent.
    pub fn is_blank(&self) -> bool {
        matches!(self, ParameterValue::Text(s) if s.trim().is_empty())
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParameterValue::Boolean(b) => serde_json::Value::Bool(*b),
            ParameterValue::Integer(i) => serde_json::Value::from(*i),
            ParameterValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterValue::Boolean(b) => write!(f, "{}", b),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParameterValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for ParameterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Which evidence layer produced a parameter value.
///
/// Declaration order is priority order: earlier variants always win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Literally stated in the current message
    Explicit,
    /// Derived from message signals by the contextual rule table
    Inferred,
    /// Carried forward from an earlier turn of the conversation
    History,
    /// Profile-derived default policy
    Default,
}

impl Provenance {
    pub fn as_str(&self) -> &str {
        match self {
            Provenance::Explicit => "explicit",
            Provenance::Inferred => "inferred",
            Provenance::History => "history",
            Provenance::Default => "default",
        }
    }

    /// Defaults never participate in the aggregate confidence.
    pub fn counts_toward_aggregate(&self) -> bool {
        !matches!(self, Provenance::Default)
    }

    /// Only established evidence is carried forward to later turns.
    pub fn is_carryable(&self) -> bool {
        !matches!(self, Provenance::Default)
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A literal value returned by the NLU capability for a directly stated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitField {
    pub field: String,
    pub value: ParameterValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ExplicitField {
    pub fn new(field: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(
            ParameterValue::from_json(&json!("easy")),
            Some(ParameterValue::Text("easy".into()))
        );
        assert_eq!(ParameterValue::from_json(&json!(5)), Some(ParameterValue::Integer(5)));
        assert_eq!(ParameterValue::from_json(&json!(5.0)), Some(ParameterValue::Integer(5)));
        assert_eq!(ParameterValue::from_json(&json!(5.5)), None);
        assert_eq!(ParameterValue::from_json(&json!(true)), Some(ParameterValue::Boolean(true)));
        assert_eq!(ParameterValue::from_json(&json!(null)), None);
        assert_eq!(ParameterValue::from_json(&json!(["a"])), None);
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<ParameterValue> = serde_json::from_str(r#"[true, 12, "hard"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ParameterValue::Boolean(true),
                ParameterValue::Integer(12),
                ParameterValue::Text("hard".into()),
            ]
        );
    }

    #[test]
    fn test_provenance_priority_order() {
        assert!(Provenance::Explicit < Provenance::Inferred);
        assert!(Provenance::Inferred < Provenance::History);
        assert!(Provenance::History < Provenance::Default);
        assert!(!Provenance::Default.counts_toward_aggregate());
        assert!(Provenance::History.is_carryable());
    }

    #[test]
    fn test_blank_text() {
        assert!(ParameterValue::from("   ").is_blank());
        assert!(!ParameterValue::from("photosynthesis").is_blank());
        assert!(!ParameterValue::Integer(0).is_blank());
    }
}
