//! Rule-based judgment provider.
//!
//! Plays each panel role with a small deterministic rulebook instead of
//! a model call. Useful offline, in demos and as a test double that
//! behaves like a real panel.

use async_trait::async_trait;

use super::{Judgment, JudgmentProvider, Persona, Role, Vote};
use crate::error::ProviderError;
use crate::request::{PurchaseRequest, Urgency};

/// Words that signal revenue or market upside.
const UPSIDE_KEYWORDS: &[&str] = &[
    "revenue",
    "customer",
    "users",
    "growth",
    "scale",
    "market",
    "competitive",
    "conversion",
    "acquire",
    "launch",
];

/// Words that signal vendor or compliance exposure.
const EXPOSURE_KEYWORDS: &[&str] = &[
    "crypto",
    "unvetted",
    "experimental",
    "offshore",
    "gambling",
    "unknown vendor",
    "beta",
];

/// Words that name an operational problem a purchase could fix.
const PROBLEM_KEYWORDS: &[&str] = &[
    "support",
    "tickets",
    "response time",
    "manual",
    "bottleneck",
    "backlog",
    "reduce",
    "automate",
    "downtime",
];

/// Minimum justification length (in words) Operations will plan from.
const MIN_JUSTIFICATION_WORDS: usize = 8;

/// Deterministic, offline judgment provider.
///
/// # Rulebooks
///
/// | Role | Looks at |
/// |------|----------|
/// | CFO | share of remaining budget, whether ROI is quantified |
/// | Growth | upside keywords, urgency |
/// | Risk | budget share, exposure keywords, rushed urgency |
/// | Operations | whether the justification names a concrete problem |
/// | Data | numeric evidence in justification and ROI |
#[derive(Debug, Clone, Default)]
pub struct HeuristicProvider;

impl HeuristicProvider {
    /// Creates a new heuristic provider.
    pub fn new() -> Self {
        Self
    }

    /// Judges synchronously. The async trait method delegates here.
    pub fn judge_now(&self, request: &PurchaseRequest, role: Role) -> Judgment {
        match role {
            Role::Cfo => cfo(request),
            Role::Growth => growth(request),
            Role::Risk => risk(request),
            Role::Operations => operations(request),
            Role::Data => data(request),
        }
    }
}

#[async_trait]
impl JudgmentProvider for HeuristicProvider {
    async fn judge(
        &self,
        request: &PurchaseRequest,
        persona: &Persona,
    ) -> Result<Judgment, ProviderError> {
        Ok(self.judge_now(request, persona.role))
    }
}

fn count_hits(text: &str, keywords: &[&str]) -> usize {
    let text = text.to_lowercase();
    keywords.iter().filter(|k| text.contains(*k)).count()
}

fn is_quantified(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit() || c == '$' || c == '%')
}

fn cfo(request: &PurchaseRequest) -> Judgment {
    if request.budget_remaining == 0 {
        return Judgment::new(Vote::No, 10, "No budget remaining; nothing can be spent.");
    }

    let share = request.budget_share();
    let percent = (share * 100.0).round();

    if share > 0.5 {
        return Judgment::new(
            Vote::No,
            9,
            format!("Consumes {percent}% of the remaining budget; exposure is too concentrated."),
        );
    }

    if !is_quantified(&request.expected_roi) {
        return Judgment::new(
            Vote::No,
            6,
            "Expected return is not quantified, so the spend cannot be justified.",
        );
    }

    if share <= 0.2 {
        let risk = 2 + (share * 10.0).round() as u8;
        Judgment::new(
            Vote::Yes,
            risk,
            format!("Quantified return against {percent}% of remaining budget."),
        )
    } else {
        Judgment::new(
            Vote::Yes,
            5,
            format!("Return is quantified but the spend is {percent}% of remaining budget."),
        )
        .with_conditions("Release funds in stages against ROI milestones")
    }
}

fn growth(request: &PurchaseRequest) -> Judgment {
    let text = format!(
        "{} {} {}",
        request.purpose, request.justification, request.expected_roi
    );
    let hits = count_hits(&text, UPSIDE_KEYWORDS);

    if hits >= 2 {
        Judgment::new(Vote::Yes, 3, "Clear path to scale and market capture.")
    } else if hits == 1 || request.urgency == Urgency::High {
        Judgment::new(Vote::Yes, 4, "Some upside; worth moving on quickly.")
    } else {
        Judgment::new(Vote::No, 5, "No growth lever in sight.")
    }
}

fn risk(request: &PurchaseRequest) -> Judgment {
    let share = request.budget_share();
    let mut score: u8 = if share > 0.5 {
        8
    } else if share > 0.25 {
        6
    } else {
        3
    };

    let text = format!("{} {}", request.purpose, request.justification);
    if count_hits(&text, EXPOSURE_KEYWORDS) > 0 {
        score += 2;
    }
    if request.urgency == Urgency::High {
        score += 1;
    }
    let score = score.min(10);

    match score {
        0..=4 => Judgment::new(Vote::Yes, score, "Downside is contained."),
        5..=6 => Judgment::new(Vote::Yes, score, "Acceptable risk with safeguards.")
            .with_conditions("Complete vendor due diligence before payment"),
        _ => Judgment::new(Vote::No, score, "Risk-adjusted return is negative."),
    }
}

fn operations(request: &PurchaseRequest) -> Judgment {
    let words = request.justification.split_whitespace().count();
    if words < MIN_JUSTIFICATION_WORDS {
        return Judgment::new(
            Vote::No,
            6,
            "Justification is too thin to plan an implementation.",
        );
    }

    if count_hits(&request.justification, PROBLEM_KEYWORDS) > 0 {
        Judgment::new(
            Vote::Yes,
            3,
            "Solves a concrete operational problem and is straightforward to roll out.",
        )
    } else {
        Judgment::new(Vote::No, 5, "Does not name an operational problem it fixes.")
    }
}

fn data(request: &PurchaseRequest) -> Judgment {
    let text = format!("{} {}", request.justification, request.expected_roi);
    let evidence = text.split_whitespace().filter(|w| is_quantified(w)).count();

    match evidence {
        0 => Judgment::new(Vote::No, 6, "No metrics support the request."),
        1 => Judgment::new(Vote::Yes, 5, "A single data point supports the request.")
            .with_conditions("Track the stated metric for 30 days after purchase"),
        _ => Judgment::new(Vote::Yes, 3, "Multiple metrics support the request."),
    }
}
