//! Prompt rendering and reply parsing for text-completion judges.
//!
//! Pure functions, no I/O: [`render_prompt`] turns a request and a
//! persona into the instruction text, [`parse_judgment`] pulls a
//! [`Judgment`] back out of whatever the model answered.
//!
//! # Reply formats
//!
//! 1. **JSON** (preferred): the first `{ ... }` object in the reply,
//!    with `vote`, `reasoning`, `risk_score` and `conditions` keys.
//! 2. **Free text**: a standalone `YES` or `NO` word decides the vote,
//!    anything else abstains; risk is neutral.

use serde_json::Value;

use crate::panel::{Judgment, Persona, Vote, MAX_RISK_SCORE, NEUTRAL_RISK_SCORE};
use crate::request::PurchaseRequest;

/// Characters of a free-text reply kept as reasoning.
pub const REASONING_EXCERPT_CHARS: usize = 200;

/// Renders the instruction text for one role.
pub fn render_prompt(request: &PurchaseRequest, persona: &Persona) -> String {
    format!(
        r#"PURCHASE REQUEST:
Amount: ${amount}
Purpose: {purpose}
Requesting Agent: {agent}
Justification: {justification}
Expected ROI: {roi}
Urgency: {urgency}
Current Budget Remaining: ${remaining}

YOUR ROLE: {focus}
YOUR PERSONA: {persona}

Analyze this purchase request and provide:
1. Your vote (YES or NO)
2. Your reasoning (2-3 sentences)
3. A risk score from 0-10 (0 = very safe, 10 = very risky)
4. Any conditions for approval

Format your response as JSON:
{{
    "vote": "YES" or "NO",
    "reasoning": "your detailed reasoning here",
    "risk_score": 5,
    "conditions": "any conditions or empty string"
}}
"#,
        amount = request.amount,
        purpose = request.purpose,
        agent = request.requesting_agent,
        justification = request.justification,
        roi = request.expected_roi,
        urgency = request.urgency,
        remaining = request.budget_remaining,
        focus = persona.focus,
        persona = persona.prompt,
    )
}

/// Returns the first JSON object embedded in `text`.
///
/// Scans each `{` in turn and parses a single value from there, so prose
/// or further braces after the object are ignored.
pub fn extract_json_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(value)) if value.is_object() => Some(value),
            _ => None,
        }
    })
}

/// First `max_chars` characters of `text`, on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}

/// Parses a model reply into a judgment.
///
/// Never fails: a reply that carries no usable structure abstains.
///
/// # Examples
///
/// ```
/// use quorum_council::parsing::parse_judgment;
/// use quorum_council::Vote;
///
/// let judgment = parse_judgment(r#"{"vote": "YES", "reasoning": "Clear ROI", "risk_score": 3}"#);
/// assert_eq!(judgment.vote, Vote::Yes);
/// assert_eq!(judgment.risk_score, 3);
///
/// let judgment = parse_judgment("I would say no to this one.");
/// assert_eq!(judgment.vote, Vote::No);
/// assert_eq!(judgment.risk_score, 5);
/// ```
pub fn parse_judgment(reply: &str) -> Judgment {
    match extract_json_object(reply) {
        Some(value) => judgment_from_json(&value),
        None => judgment_from_text(reply),
    }
}

fn judgment_from_json(value: &Value) -> Judgment {
    let vote = value
        .get("vote")
        .and_then(Value::as_str)
        .map(Vote::parse)
        .unwrap_or(Vote::Abstain);

    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or("No reasoning provided");

    let risk_score = value
        .get("risk_score")
        .and_then(risk_from_json)
        .unwrap_or(NEUTRAL_RISK_SCORE);

    let conditions = value
        .get("conditions")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Judgment::new(vote, risk_score, reasoning).with_conditions(conditions)
}

fn risk_from_json(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(raw.round().clamp(0.0, f64::from(MAX_RISK_SCORE)) as u8)
}

fn judgment_from_text(reply: &str) -> Judgment {
    let mut vote = Vote::Abstain;
    for word in reply.split(|c: char| !c.is_ascii_alphabetic()) {
        match Vote::parse(word) {
            Vote::Abstain => continue,
            found => {
                vote = found;
                break;
            }
        }
    }

    Judgment::new(
        vote,
        NEUTRAL_RISK_SCORE,
        excerpt(reply, REASONING_EXCERPT_CHARS),
    )
}
