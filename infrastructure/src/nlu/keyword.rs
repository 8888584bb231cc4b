//! Keyword-driven NLU adapter.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use tutor_application::{GatewayError, NluGateway};
use tutor_domain::{
    ClarificationRequest, ConversationTurn, ExplicitField, IntentClassification, ParameterValue,
    Role, SchemaRegistry, ToolType, UserProfile,
};

/// Ends a free-text phrase such as a topic
const TERMINATOR: &str = r"(?:\s+(?:at|with|for|in|using|and|please|so|to)\b|\s*[.,!?;:]|\s*$)";

const FLASHCARD_KEYWORDS: &str =
    r"flash\s*cards?|quiz(?:zes)?|practice|test\s+me|drill|memori[sz]e";
const NOTE_KEYWORDS: &str = r"notes?|summar(?:y|ies|ise|ize)|outline|study\s+guide";
const CONCEPT_KEYWORDS: &str = r"explain|what\s+(?:is|are)|how\s+(?:does|do)|why\s+(?:does|do|is)|meaning\s+of";

const SUBJECTS: &str = r"mathematics|maths?|algebra|geometry|biology|chemistry|physics|history|geography|english|literature|economics|computer\s+science|science";

const MAX_PHRASE_LEN: usize = 80;

fn phrase_after(lead: &str) -> String {
    format!(r"(?i)\b(?:{lead})\s+(?:the\s+|a\s+|an\s+)?([\w][\w '\-]*?){TERMINATOR}")
}

/// Compiled patterns, built once per gateway
struct Patterns {
    intents: Vec<(ToolType, Regex)>,
    topic: Regex,
    struggling_with: Regex,
    concept: Regex,
    current_topic: Regex,
    subject: Regex,
    count: Regex,
    difficulty: Regex,
    style: Regex,
    depth: Regex,
    examples: Regex,
    analogies: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        let keywords = |alternation: &str| Regex::new(&format!(r"(?i)\b(?:{alternation})\b"));
        Ok(Self {
            intents: vec![
                (ToolType::FlashcardGenerator, keywords(FLASHCARD_KEYWORDS)?),
                (ToolType::NoteMaker, keywords(NOTE_KEYWORDS)?),
                (ToolType::ConceptExplainer, keywords(CONCEPT_KEYWORDS)?),
            ],
            topic: Regex::new(&phrase_after("on|about|covering"))?,
            struggling_with: Regex::new(&phrase_after(
                r"(?:struggling|stuck|trouble|help(?:\s+me)?|confused)\s+with",
            ))?,
            concept: Regex::new(&phrase_after(CONCEPT_KEYWORDS))?,
            current_topic: Regex::new(
                r"(?i)\b(?:in|for)\s+(?:my\s+|our\s+|the\s+)?([\w][\w '\-]*?)\s+(?:class|course|unit|lesson|chapter)\b",
            )?,
            subject: Regex::new(&format!(r"(?i)\b({SUBJECTS})\b"))?,
            count: Regex::new(
                r"(?i)\b(\d{1,3})\s+(?:flash\s*cards?|cards?|questions?|problems?)\b",
            )?,
            difficulty: Regex::new(
                r"(?i)\b(easy|medium|hard)\s+(?:level|difficulty|mode|questions?|cards?|flash\s*cards?)\b|\bdifficulty\s*(?:of|:|=|is)?\s*(easy|medium|hard)\b",
            )?,
            style: Regex::new(r"(?i)\b(outline|bullet[\s-]?points?|narrative|structured)\b")?,
            depth: Regex::new(r"(?i)\b(basic|intermediate|advanced|comprehensive)\b")?,
            examples: Regex::new(r"(?i)\b(with|without|no)\s+examples?\b")?,
            analogies: Regex::new(r"(?i)\b(with|without|no)\s+analog(?:y|ies)\b")?,
        })
    }
}

/// Deterministic NLU for offline use and local development.
///
/// Clarification phrasing is not supported, so callers fall back to the
/// built-in template.
pub struct KeywordNluGateway {
    patterns: Patterns,
    registry: SchemaRegistry,
}

impl KeywordNluGateway {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: Patterns::compile()?,
            registry: SchemaRegistry::builtin(),
        })
    }

    /// Keyword hits per tool type, in declaration order.
    fn hits(&self, text: &str) -> Vec<(ToolType, usize)> {
        self.patterns
            .intents
            .iter()
            .map(|(tool, re)| (*tool, re.find_iter(text).count()))
            .collect()
    }

    /// Tool with strictly the most hits, if any.
    fn best_tool(&self, text: &str) -> Option<(ToolType, usize)> {
        let hits = self.hits(text);
        let max = hits.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if max == 0 {
            return None;
        }
        let mut leaders = hits.into_iter().filter(|(_, n)| *n == max);
        let leader = leaders.next()?;
        if leaders.next().is_some() {
            None
        } else {
            Some(leader)
        }
    }

    fn is_ambiguous(&self, text: &str) -> bool {
        self.hits(text).iter().filter(|(_, n)| *n > 0).count() > 1
            && self.best_tool(text).is_none()
    }

    fn explicit_fields(
        &self,
        message: &str,
        tool_type: ToolType,
        pending: Option<&ClarificationRequest>,
    ) -> Vec<ExplicitField> {
        let p = &self.patterns;
        let mut fields = Vec::new();

        let topic = capture_phrase(&p.topic, message)
            .or_else(|| capture_phrase(&p.struggling_with, message));

        match tool_type {
            ToolType::ConceptExplainer => {
                if let Some((concept, matched)) = capture_phrase(&p.concept, message) {
                    fields.push(stated("concept_to_explain", concept, &matched));
                }
                if let Some((current, matched)) = capture_phrase(&p.current_topic, message)
                    .or_else(|| topic.clone())
                {
                    fields.push(stated("current_topic", current, &matched));
                }
            }
            ToolType::NoteMaker | ToolType::FlashcardGenerator => {
                if let Some((topic, matched)) = topic {
                    fields.push(stated("topic", topic, &matched));
                }
            }
        }

        if let Some(m) = p.subject.find(message) {
            fields.push(stated("subject", capitalize(m.as_str()), m.as_str()));
        }

        if let Some(caps) = p.count.captures(message)
            && let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok())
        {
            fields.push(stated("count", n, &caps[0]));
        }

        if let Some(caps) = p.difficulty.captures(message)
            && let Some(level) = caps.get(1).or_else(|| caps.get(2))
        {
            fields.push(stated("difficulty", level.as_str().to_lowercase(), &caps[0]));
        }

        if let Some(m) = p.style.find(message) {
            let style = m.as_str().to_lowercase();
            let normalized = if style.starts_with("bullet") {
                "bullet_points".to_string()
            } else {
                style
            };
            fields.push(stated("note_taking_style", normalized, m.as_str()));
        }

        if let Some(m) = p.depth.find(message) {
            fields.push(stated("desired_depth", m.as_str().to_lowercase(), m.as_str()));
        }

        for (field, re) in [
            ("include_examples", &p.examples),
            ("include_analogies", &p.analogies),
        ] {
            if let Some(caps) = re.captures(message) {
                let wanted = caps[1].eq_ignore_ascii_case("with");
                fields.push(stated(field, wanted, &caps[0]));
            }
        }

        let Some(schema) = self.registry.get(tool_type) else {
            return Vec::new();
        };

        // A reply without tool keywords answers the question it follows.
        if let Some(request) = pending
            && !self.mentions_tool(message)
            && let Some(answer) = request.answer_from_reply(message, schema)
            && !fields.iter().any(|f| f.field == answer.field)
        {
            debug!("Reading '{}' as the answer for {}", message.trim(), answer.field);
            fields.push(answer);
        }

        fields.retain(|f| schema.has_field(&f.field));
        fields
    }

    fn mentions_tool(&self, text: &str) -> bool {
        self.hits(text).iter().any(|(_, n)| *n > 0)
    }
}

fn capture_phrase(re: &Regex, text: &str) -> Option<(String, String)> {
    let caps = re.captures(text)?;
    let phrase = caps.get(1)?.as_str().trim();
    if phrase.is_empty() || phrase.len() > MAX_PHRASE_LEN {
        return None;
    }
    Some((phrase.to_string(), caps[0].trim().to_string()))
}

fn stated(field: &str, value: impl Into<ParameterValue>, matched: &str) -> ExplicitField {
    ExplicitField::new(field, value).with_reasoning(format!("stated as '{}'", matched.trim()))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl NluGateway for KeywordNluGateway {
    async fn classify_intent(
        &self,
        message: &str,
        _profile: &UserProfile,
        history: &[ConversationTurn],
    ) -> Result<IntentClassification, GatewayError> {
        if let Some((tool, hits)) = self.best_tool(message) {
            let confidence = if hits > 1 { 0.9 } else { 0.8 };
            return Ok(IntentClassification::tool(tool, confidence)
                .with_reasoning(format!("{} keyword match(es) for {}", hits, tool)));
        }

        if self.is_ambiguous(message) {
            return Ok(IntentClassification::unclear(0.3)
                .with_reasoning("keywords for more than one tool"));
        }

        // A bare follow-up answer inherits the most recent routed request.
        let earlier = history
            .iter()
            .rev()
            .filter(|t| t.role == Role::User)
            .find_map(|t| self.best_tool(&t.content));
        if let Some((tool, _)) = earlier {
            debug!("No keywords in message; continuing {} from history", tool);
            return Ok(IntentClassification::tool(tool, 0.6)
                .with_reasoning(format!("continuing {} from earlier in the conversation", tool)));
        }

        Ok(IntentClassification::unclear(0.1).with_reasoning("no tool keywords found"))
    }

    async fn extract_explicit(
        &self,
        message: &str,
        tool_type: ToolType,
        _profile: &UserProfile,
        _history: &[ConversationTurn],
        pending: Option<&ClarificationRequest>,
    ) -> Result<Vec<ExplicitField>, GatewayError> {
        Ok(self.explicit_fields(message, tool_type, pending))
    }

    async fn generate_clarification_text(
        &self,
        _request: &ClarificationRequest,
        _history: &[ConversationTurn],
    ) -> Result<String, GatewayError> {
        Err(GatewayError::Unsupported(
            "keyword NLU does not phrase clarifications".to_string(),
        ))
    }
}
