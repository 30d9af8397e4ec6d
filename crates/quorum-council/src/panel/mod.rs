//! The fixed five-role evaluation panel.
//!
//! Defines the closed set of [`Role`]s, the persona each role is
//! played with, the [`JudgmentProvider`] capability that produces a
//! verdict for one role, and the [`AgentVote`] the panel emits.

pub mod heuristic;
pub mod prompted;

pub use heuristic::HeuristicProvider;
pub use prompted::{CompletionClient, PromptedProvider};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ProviderError;
use crate::request::PurchaseRequest;

/// Risk score given to a role that could not answer.
pub const NEUTRAL_RISK_SCORE: u8 = 5;

/// Highest risk score a vote may carry.
pub const MAX_RISK_SCORE: u8 = 10;

/// One evaluator role on the panel.
///
/// The panel is closed: every evaluation asks exactly these five
/// roles, in [`Role::PANEL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Financial viability.
    Cfo,
    /// Revenue and ROI upside.
    Growth,
    /// Downside and compliance.
    Risk,
    /// Execution feasibility.
    Operations,
    /// Evidence quality.
    Data,
}

impl Role {
    /// The panel, in the order votes are reported.
    pub const PANEL: [Role; 5] = [
        Role::Cfo,
        Role::Growth,
        Role::Risk,
        Role::Operations,
        Role::Data,
    ];

    /// Name reported in `AgentVote::agent_name`.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Role::Cfo => "CFO Agent",
            Role::Growth => "Growth Agent",
            Role::Risk => "Risk Assessment Agent",
            Role::Operations => "Operations Agent",
            Role::Data => "Data Agent",
        }
    }

    /// Display glyph. Opaque to the core.
    pub const fn emoji(&self) -> &'static str {
        match self {
            Role::Cfo => "💼",
            Role::Growth => "🚀",
            Role::Risk => "🛡️",
            Role::Operations => "⚙️",
            Role::Data => "📊",
        }
    }

    /// Short configuration key, matching the serialized form.
    pub const fn key(&self) -> &'static str {
        match self {
            Role::Cfo => "cfo",
            Role::Growth => "growth",
            Role::Risk => "risk",
            Role::Operations => "operations",
            Role::Data => "data",
        }
    }

    /// Looks a role up by [`key`](Self::key), ignoring case.
    pub fn from_key(key: &str) -> Option<Role> {
        Role::PANEL
            .into_iter()
            .find(|role| role.key().eq_ignore_ascii_case(key.trim()))
    }

    /// Position of this role in [`Role::PANEL`].
    pub const fn index(&self) -> usize {
        match self {
            Role::Cfo => 0,
            Role::Growth => 1,
            Role::Risk => 2,
            Role::Operations => 3,
            Role::Data => 4,
        }
    }

    /// The persona this role is played with by default.
    pub fn persona(&self) -> Persona {
        let (focus, prompt, model) = match self {
            Role::Cfo => (
                "Conservative financial oversight",
                "You are a conservative CFO focused on cost control and ROI. You scrutinize every \
                 expense and require clear business justification. You vote YES only when the ROI \
                 is crystal clear.",
                "anthropic/claude-sonnet-4-20250514",
            ),
            Role::Growth => (
                "Aggressive expansion focus",
                "You are a growth-obsessed executive who believes in aggressive investment. You \
                 vote YES when you see potential for scale and market capture, even if ROI isn't \
                 immediate.",
                "openai/gpt-4.1",
            ),
            Role::Risk => (
                "Risk analysis and mitigation",
                "You are a risk management specialist. You evaluate potential downsides, security \
                 concerns, and vendor reliability. You vote based on risk-adjusted returns.",
                "xai/grok-2-1212",
            ),
            Role::Operations => (
                "Practical implementation focus",
                "You are an operations manager focused on practicality and execution. You vote \
                 YES when the purchase solves a real operational problem and is easy to implement.",
                "openai/gpt-4o-mini",
            ),
            Role::Data => (
                "Evidence-based decision making",
                "You are a data scientist who makes decisions based purely on metrics and \
                 evidence. You vote YES only when data supports the decision.",
                "openai/o1",
            ),
        };

        Persona {
            role: *self,
            focus: focus.to_string(),
            prompt: prompt.to_string(),
            model: model.to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a role is played: its focus, persona prompt and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// The role this persona plays.
    pub role: Role,
    /// One-line description of what the role looks at.
    pub focus: String,
    /// Persona instructions handed to the judgment provider.
    pub prompt: String,
    /// Model identifier reported on the vote.
    pub model: String,
}

/// The five personas, in panel order, with optional model overrides.
pub fn panel_personas(models: &BTreeMap<Role, String>) -> [Persona; 5] {
    Role::PANEL.map(|role| {
        let mut persona = role.persona();
        if let Some(model) = models.get(&role) {
            persona.model = model.clone();
        }
        persona
    })
}

/// A role's verdict on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vote {
    /// Approve the purchase.
    Yes,
    /// Deny the purchase.
    No,
    /// No position; also used for degraded roles.
    Abstain,
}

impl Vote {
    /// Parses a verdict word. Anything unrecognised abstains.
    pub fn parse(word: &str) -> Self {
        match word.trim().to_ascii_uppercase().as_str() {
            "YES" => Vote::Yes,
            "NO" => Vote::No,
            _ => Vote::Abstain,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Yes => write!(f, "YES"),
            Vote::No => write!(f, "NO"),
            Vote::Abstain => write!(f, "ABSTAIN"),
        }
    }
}

/// What a judgment provider returns for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    /// The verdict.
    pub vote: Vote,
    /// Risk score, 0 (safe) to 10 (very risky).
    pub risk_score: u8,
    /// Free-text reasoning.
    pub reasoning: String,
    /// Constraints attached to the verdict, if any.
    pub conditions: Option<String>,
}

impl Judgment {
    /// Creates a judgment without conditions.
    pub fn new(vote: Vote, risk_score: u8, reasoning: impl Into<String>) -> Self {
        Self {
            vote,
            risk_score,
            reasoning: reasoning.into(),
            conditions: None,
        }
    }

    /// Attaches conditions. Blank conditions are dropped.
    pub fn with_conditions(mut self, conditions: impl Into<String>) -> Self {
        let conditions = conditions.into();
        self.conditions = if conditions.trim().is_empty() {
            None
        } else {
            Some(conditions)
        };
        self
    }
}

/// Capability that produces one role's judgment on a request.
///
/// Implementations are external collaborators (an LLM call, a rule
/// engine, a test stub). They may be slow or fail; the vote collector
/// bounds each call with a timeout and degrades failures to ABSTAIN.
#[async_trait]
pub trait JudgmentProvider: Send + Sync {
    /// Judges `request` in the voice of `persona`.
    async fn judge(
        &self,
        request: &PurchaseRequest,
        persona: &Persona,
    ) -> std::result::Result<Judgment, ProviderError>;
}

/// A vote cast by one panel role on one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentVote {
    #[serde(skip)]
    role: Role,
    /// Role display name.
    pub agent_name: String,
    /// Model identifier of the provider instance used.
    pub model: String,
    /// Display glyph.
    pub emoji: String,
    /// The verdict.
    pub vote: Vote,
    /// Free-text reasoning.
    pub reasoning: String,
    /// Risk score, 0 to 10 inclusive.
    pub risk_score: u8,
    /// Constraints, present only when the vote imposes some.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

impl AgentVote {
    /// Builds the vote `persona` casts from a provider judgment.
    ///
    /// Risk scores above [`MAX_RISK_SCORE`] are clamped.
    pub fn from_judgment(persona: &Persona, judgment: Judgment) -> Self {
        Self {
            role: persona.role,
            agent_name: persona.role.display_name().to_string(),
            model: persona.model.clone(),
            emoji: persona.role.emoji().to_string(),
            vote: judgment.vote,
            reasoning: judgment.reasoning,
            risk_score: judgment.risk_score.min(MAX_RISK_SCORE),
            conditions: judgment.conditions,
        }
    }

    /// The ABSTAIN substituted for a role whose provider failed.
    pub fn degraded(persona: &Persona, error: &ProviderError) -> Self {
        Self {
            role: persona.role,
            agent_name: persona.role.display_name().to_string(),
            model: persona.model.clone(),
            emoji: persona.role.emoji().to_string(),
            vote: Vote::Abstain,
            reasoning: format!("{} unavailable: {}", persona.role, error),
            risk_score: NEUTRAL_RISK_SCORE,
            conditions: None,
        }
    }

    /// The role that cast this vote.
    pub fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_order_matches_index() {
        for (i, role) in Role::PANEL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn test_role_keys_round_trip() {
        for role in Role::PANEL {
            assert_eq!(Role::from_key(role.key()), Some(role));
            assert_eq!(serde_json::to_value(role).unwrap(), role.key());
        }
        assert_eq!(Role::from_key(" CFO "), Some(Role::Cfo));
        assert_eq!(Role::from_key("legal"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Role::Cfo.to_string(), "CFO Agent");
        assert_eq!(Role::Risk.to_string(), "Risk Assessment Agent");
        assert_eq!(Role::Data.display_name(), "Data Agent");
    }

    #[test]
    fn test_persona_defaults() {
        let persona = Role::Growth.persona();
        assert_eq!(persona.role, Role::Growth);
        assert_eq!(persona.model, "openai/gpt-4.1");
        assert!(persona.prompt.contains("growth-obsessed"));
    }

    #[test]
    fn test_panel_personas_apply_overrides() {
        let mut models = BTreeMap::new();
        models.insert(Role::Data, "local/llama".to_string());

        let personas = panel_personas(&models);
        assert_eq!(personas[4].model, "local/llama");
        assert_eq!(personas[0].model, Role::Cfo.persona().model);
    }

    #[test]
    fn test_vote_parse() {
        assert_eq!(Vote::parse("yes"), Vote::Yes);
        assert_eq!(Vote::parse(" NO "), Vote::No);
        assert_eq!(Vote::parse("maybe"), Vote::Abstain);
        assert_eq!(Vote::Abstain.to_string(), "ABSTAIN");
    }

    #[test]
    fn test_vote_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Vote::Yes).unwrap(), "\"YES\"");
        assert_eq!(serde_json::to_string(&Vote::Abstain).unwrap(), "\"ABSTAIN\"");
    }

    #[test]
    fn test_judgment_blank_conditions_dropped() {
        let judgment = Judgment::new(Vote::Yes, 3, "fine").with_conditions("  ");
        assert!(judgment.conditions.is_none());

        let judgment = Judgment::new(Vote::Yes, 3, "fine").with_conditions("cap at $400");
        assert_eq!(judgment.conditions.as_deref(), Some("cap at $400"));
    }

    #[test]
    fn test_agent_vote_clamps_risk() {
        let persona = Role::Cfo.persona();
        let vote = AgentVote::from_judgment(&persona, Judgment::new(Vote::No, 42, "too much"));
        assert_eq!(vote.risk_score, MAX_RISK_SCORE);
        assert_eq!(vote.role(), Role::Cfo);
    }

    #[test]
    fn test_degraded_vote() {
        let persona = Role::Operations.persona();
        let err = ProviderError::Unavailable("connection refused".to_string());
        let vote = AgentVote::degraded(&persona, &err);

        assert_eq!(vote.vote, Vote::Abstain);
        assert_eq!(vote.risk_score, NEUTRAL_RISK_SCORE);
        assert!(vote.reasoning.contains("Operations Agent unavailable"));
        assert!(vote.reasoning.contains("connection refused"));
    }

    #[test]
    fn test_agent_vote_wire_shape() {
        let persona = Role::Data.persona();
        let vote = AgentVote::from_judgment(&persona, Judgment::new(Vote::Yes, 2, "metrics ok"));
        let json = serde_json::to_value(&vote).unwrap();

        assert_eq!(json["agent_name"], "Data Agent");
        assert_eq!(json["vote"], "YES");
        assert_eq!(json["risk_score"], 2);
        assert!(json.get("conditions").is_none());
        assert!(json.get("role").is_none());
    }
}
