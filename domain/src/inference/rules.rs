//! Contextual inference rules
//!
//! A rule maps a keyword class found in the message to a field value.
//! Rules are evaluated in table order and the first match wins per field.

use crate::core::string::contains_phrase;
use crate::parameter::ParameterValue;
use serde::{Deserialize, Serialize};

/// Class of message signal a rule reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalClass {
    Distress,
    Confidence,
    Quantity,
    Visual,
}

impl SignalClass {
    pub fn as_str(&self) -> &str {
        match self {
            SignalClass::Distress => "distress",
            SignalClass::Confidence => "confidence",
            SignalClass::Quantity => "quantity",
            SignalClass::Visual => "visual",
        }
    }
}

impl std::fmt::Display for SignalClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRule {
    pub signal: SignalClass,
    /// Words or phrases, matched on token boundaries, case-insensitively
    pub keywords: Vec<String>,
    pub field: String,
    pub value: ParameterValue,
    /// Rule-specific certainty in [0, 1]
    pub certainty: f64,
}

impl InferenceRule {
    pub fn new(
        signal: SignalClass,
        keywords: &[&str],
        field: &str,
        value: impl Into<ParameterValue>,
        certainty: f64,
    ) -> Self {
        Self {
            signal,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            field: field.to_string(),
            value: value.into(),
            certainty,
        }
    }

    /// First keyword of this rule present in the tokenized message
    pub fn matched_keyword(&self, tokens: &[String]) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| contains_phrase(tokens, k))
            .map(String::as_str)
    }
}

/// A rule that fired, with the keyword that triggered it
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a InferenceRule,
    pub keyword: &'a str,
}

impl RuleMatch<'_> {
    pub fn reasoning(&self) -> String {
        format!(
            "{} signal '{}' suggests {} = {}",
            self.rule.signal, self.keyword, self.rule.field, self.rule.value
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    rules: Vec<InferenceRule>,
}

const DISTRESS: &[&str] = &["struggling", "confused", "don't understand", "lost", "stuck"];
const CONFIDENT: &[&str] = &["confident", "challenge me", "ready"];
const FEW: &[&str] = &["few", "quick", "some"];
const MANY: &[&str] = &["many", "lots", "thorough"];
const VISUAL: &[&str] = &["visual", "diagram", "picture"];

impl RuleTable {
    pub fn new(rules: Vec<InferenceRule>) -> Self {
        Self { rules }
    }

    pub fn default_rules() -> Self {
        use SignalClass::*;
        Self::new(vec![
            InferenceRule::new(Distress, DISTRESS, "difficulty", "easy", 0.9),
            InferenceRule::new(Distress, DISTRESS, "desired_depth", "basic", 0.8),
            InferenceRule::new(Distress, DISTRESS, "note_taking_style", "bullet_points", 0.7),
            InferenceRule::new(Confidence, CONFIDENT, "difficulty", "hard", 0.8),
            InferenceRule::new(Confidence, CONFIDENT, "desired_depth", "advanced", 0.7),
            InferenceRule::new(Quantity, FEW, "count", 5i64, 0.7),
            InferenceRule::new(Quantity, MANY, "count", 15i64, 0.7),
            InferenceRule::new(Visual, VISUAL, "include_analogies", true, 0.6),
        ])
    }

    pub fn rules(&self) -> &[InferenceRule] {
        &self.rules
    }

    /// First rule, in table order, that targets `field` and fires on `tokens`
    pub fn first_match<'a>(&'a self, field: &str, tokens: &[String]) -> Option<RuleMatch<'a>> {
        self.rules
            .iter()
            .filter(|r| r.field == field)
            .find_map(|rule| {
                rule.matched_keyword(tokens)
                    .map(|keyword| RuleMatch { rule, keyword })
            })
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::default_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::string::tokenize;

    #[test]
    fn test_distress_wins_over_confidence_by_table_order() {
        let table = RuleTable::default_rules();
        let tokens = tokenize("I'm stuck but ready to be challenged");
        let m = table.first_match("difficulty", &tokens).unwrap();
        assert_eq!(m.rule.value, ParameterValue::from("easy"));
        assert_eq!(m.keyword, "stuck");
    }

    #[test]
    fn test_phrase_keyword() {
        let table = RuleTable::default_rules();
        let tokens = tokenize("I don't understand limits at all");
        let m = table.first_match("desired_depth", &tokens).unwrap();
        assert_eq!(m.rule.signal, SignalClass::Distress);
        assert_eq!(m.reasoning(), "distress signal 'don't understand' suggests desired_depth = basic");
    }

    #[test]
    fn test_keywords_match_whole_tokens_only() {
        let table = RuleTable::default_rules();
        // "lost" must not fire inside "lostness", "ready" not inside "already"
        let tokens = tokenize("already past the lostness");
        assert!(table.first_match("difficulty", &tokens).is_none());
    }

    #[test]
    fn test_quantity_rules() {
        let table = RuleTable::default_rules();
        let m = table.first_match("count", &tokenize("give me lots of cards")).unwrap();
        assert_eq!(m.rule.value, ParameterValue::Integer(15));
        assert!(table.first_match("count", &tokenize("cards on mitosis")).is_none());
    }
}
