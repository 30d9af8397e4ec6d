//! # Planning
//!
//! The planner decides, one step at a time, what the simulated agent
//! does next: buy something, hire a sub-agent, or stop.
//!
//! | Planner | Source of decisions |
//! |---------|---------------------|
//! | [`ScriptedPlanner`] | A fixed [`Plan`], replayed in order |
//! | [`PromptedPlanner`] | A text-completion model, asked fresh every step |
//!
//! Both understand the same reply format:
//!
//! ```text
//! {
//!   "reasoning": "...",
//!   "actions": [
//!     {"type": "REQUEST_PURCHASE", "amount": 500, "purpose": "...",
//!      "justification": "...", "expected_roi": "...", "urgency": "High"},
//!     {"type": "HIRE_AGENT", "amount": 300, "agent_type": "Design Agent",
//!      "task": "...", "justification": "...", "expected_roi": "..."}
//!   ]
//! }
//! ```

use std::fmt::Write as _;

use async_trait::async_trait;
use quorum_council::parsing::{excerpt, extract_json_object, REASONING_EXCERPT_CHARS};
use quorum_council::{CompletionClient, ProviderError, PurchaseRequest, Urgency};
use serde_json::Value;
use tracing::{debug, warn};

use crate::action::SimulationAction;

/// Model used by [`PromptedPlanner`] unless overridden.
pub const DEFAULT_PLANNER_MODEL: &str = "openai/gpt-4.1";

const DEFAULT_EXPECTED_ROI: &str = "Not specified";

/// What a planned action spends money on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// A direct purchase.
    Purchase {
        /// What the money is for
        purpose: String,
    },
    /// Hiring a sub-agent. Logged as one budgeted commitment; the hired
    /// agent does not run a simulation of its own.
    HireAgent {
        /// Kind of agent hired, e.g. "Design Agent"
        agent_type: String,
        /// What it is hired to do
        task: String,
    },
}

/// A candidate action proposed by a planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    /// Purchase or hire.
    pub kind: ActionKind,
    /// Amount to reserve from the run's scope.
    pub amount: u64,
    /// Why the agent wants it.
    pub justification: String,
    /// Expected return, free text.
    pub expected_roi: String,
    /// How soon it is needed.
    pub urgency: Urgency,
}

impl PlannedAction {
    /// A purchase with default ROI and urgency.
    pub fn purchase(
        amount: u64,
        purpose: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActionKind::Purchase {
                purpose: purpose.into(),
            },
            amount,
            justification: justification.into(),
            expected_roi: DEFAULT_EXPECTED_ROI.to_string(),
            urgency: Urgency::Medium,
        }
    }

    /// An agent hire with default ROI and urgency.
    pub fn hire(
        amount: u64,
        agent_type: impl Into<String>,
        task: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActionKind::HireAgent {
                agent_type: agent_type.into(),
                task: task.into(),
            },
            amount,
            justification: justification.into(),
            expected_roi: DEFAULT_EXPECTED_ROI.to_string(),
            urgency: Urgency::Medium,
        }
    }

    /// Sets the expected return.
    pub fn with_expected_roi(mut self, roi: impl Into<String>) -> Self {
        self.expected_roi = roi.into();
        self
    }

    /// Sets the urgency.
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// The purpose line the panel sees.
    pub fn purpose(&self) -> String {
        match &self.kind {
            ActionKind::Purchase { purpose } => purpose.clone(),
            ActionKind::HireAgent { agent_type, task } => {
                format!("Hire {} for {}", agent_type, task)
            }
        }
    }

    /// Checks the action can be put to a vote at all.
    ///
    /// # Errors
    ///
    /// A short description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.amount == 0 {
            return Err("amount must be positive".to_string());
        }
        match &self.kind {
            ActionKind::Purchase { purpose } if purpose.trim().is_empty() => {
                Err("purpose is required".to_string())
            }
            ActionKind::HireAgent { agent_type, .. } if agent_type.trim().is_empty() => {
                Err("agent_type is required".to_string())
            }
            ActionKind::HireAgent { task, .. } if task.trim().is_empty() => {
                Err("task is required".to_string())
            }
            _ => Ok(()),
        }
    }

    /// The request put to the panel on behalf of `agent`.
    pub fn to_request(&self, agent: &str, budget_remaining: u64) -> PurchaseRequest {
        PurchaseRequest::new(self.amount, self.purpose(), agent, self.justification.clone())
            .with_expected_roi(self.expected_roi.clone())
            .with_urgency(self.urgency)
            .with_budget_remaining(budget_remaining)
    }
}

/// What the planner sees before each step.
#[derive(Debug, Clone, Copy)]
pub struct PlanningContext<'a> {
    /// Name of the agent being simulated.
    pub agent: &'a str,
    /// What the agent is trying to achieve.
    pub goal: &'a str,
    /// Actions taken so far, oldest first.
    pub history: &'a [SimulationAction],
    /// Current balance of the run's scope.
    pub budget_remaining: u64,
}

impl PlanningContext<'_> {
    /// Zero-based index of the step being planned.
    pub fn step(&self) -> usize {
        self.history.len()
    }
}

/// A planner's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Attempt this action next.
    Act {
        action: PlannedAction,
        /// Overall reasoning, if the planner has any to report.
        reasoning: Option<String>,
    },
    /// No further action is warranted.
    Stop { reasoning: Option<String> },
}

/// Produces the next action of a simulation run.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Plans one step.
    ///
    /// # Errors
    ///
    /// [`ProviderError`] if the planning backend cannot be reached; the
    /// run is aborted.
    async fn plan(&self, context: &PlanningContext<'_>) -> Result<PlanStep, ProviderError>;
}

/// A parsed planner reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// The planner's overall rationale.
    pub reasoning: Option<String>,
    /// Actions in the order they should be attempted.
    pub actions: Vec<PlannedAction>,
}

/// Parses a planner reply.
///
/// Reads the first JSON object in `text`. Action types other than
/// `REQUEST_PURCHASE` and `HIRE_AGENT` are skipped, and a `COMPLETE`
/// entry ends the plan. Missing fields are left empty so the runner
/// can deny them as invalid. Text without a JSON object yields an
/// empty plan whose reasoning is the start of the text.
///
/// # Examples
///
/// ```
/// use quorum_sim::parse_plan;
///
/// let plan = parse_plan(r#"Plan: {"reasoning": "Need ads", "actions": [
///     {"type": "REQUEST_PURCHASE", "amount": 500, "purpose": "Ad campaign",
///      "justification": "Reach", "expected_roi": "2x"}]}"#);
/// assert_eq!(plan.actions.len(), 1);
/// assert_eq!(plan.actions[0].amount, 500);
///
/// let plan = parse_plan("I could not decide.");
/// assert!(plan.actions.is_empty());
/// assert_eq!(plan.reasoning.as_deref(), Some("I could not decide."));
/// ```
pub fn parse_plan(text: &str) -> Plan {
    let Some(object) = extract_json_object(text) else {
        debug!("planner reply has no JSON object, using excerpt");
        return Plan {
            reasoning: Some(excerpt(text, REASONING_EXCERPT_CHARS)),
            actions: Vec::new(),
        };
    };

    let reasoning = Some(
        object
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or("No reasoning provided")
            .to_string(),
    );

    let mut actions = Vec::new();
    for entry in object
        .get("actions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
    {
        let kind = entry.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind.trim().to_ascii_uppercase().as_str() {
            "REQUEST_PURCHASE" => actions.push(read_action(
                entry,
                ActionKind::Purchase {
                    purpose: text_field(entry, "purpose"),
                },
            )),
            "HIRE_AGENT" => actions.push(read_action(
                entry,
                ActionKind::HireAgent {
                    agent_type: text_field(entry, "agent_type"),
                    task: text_field(entry, "task"),
                },
            )),
            "COMPLETE" => break,
            other => warn!(action_type = other, "skipping unknown planned action"),
        }
    }

    Plan { reasoning, actions }
}

fn read_action(entry: &Value, kind: ActionKind) -> PlannedAction {
    let roi = text_field(entry, "expected_roi");
    PlannedAction {
        kind,
        amount: amount_field(entry),
        justification: text_field(entry, "justification"),
        expected_roi: if roi.trim().is_empty() {
            DEFAULT_EXPECTED_ROI.to_string()
        } else {
            roi
        },
        urgency: urgency_field(entry),
    }
}

fn text_field(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Whole, non-negative amounts only; anything else reads as zero.
fn amount_field(entry: &Value) -> u64 {
    match entry.get("amount") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map_or(0, |f| f.round() as u64)
        }),
        Some(Value::String(s)) => s.trim().trim_start_matches('$').parse().unwrap_or(0),
        _ => 0,
    }
}

fn urgency_field(entry: &Value) -> Urgency {
    match entry
        .get("urgency")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("low") => Urgency::Low,
        Some("high") => Urgency::High,
        _ => Urgency::Medium,
    }
}

/// Replays a fixed plan, one action per step.
///
/// Stateless across runs: the step index comes from the run's history,
/// so one planner can drive any number of runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlanner {
    plan: Plan,
}

impl ScriptedPlanner {
    /// Replays `plan`, one action per step.
    pub fn new(plan: Plan) -> Self {
        Self { plan }
    }

    /// A planner replaying `actions` with no reasoning.
    pub fn from_actions(actions: Vec<PlannedAction>) -> Self {
        Self::new(Plan {
            reasoning: None,
            actions,
        })
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn plan(&self, context: &PlanningContext<'_>) -> Result<PlanStep, ProviderError> {
        let reasoning = self.plan.reasoning.clone();
        Ok(match self.plan.actions.get(context.step()) {
            Some(action) => PlanStep::Act {
                action: action.clone(),
                reasoning,
            },
            None => PlanStep::Stop { reasoning },
        })
    }
}

/// Asks a completion model for the next action at every step.
///
/// The prompt carries the goal, the current balance and the outcome of
/// every earlier action; the first action of the reply is taken and an
/// empty reply ends the run.
pub struct PromptedPlanner<C> {
    client: C,
    model: String,
}

impl<C: CompletionClient> PromptedPlanner<C> {
    /// Plans with `client` on [`DEFAULT_PLANNER_MODEL`].
    pub fn new(client: C) -> Self {
        Self {
            client,
            model: DEFAULT_PLANNER_MODEL.to_string(),
        }
    }

    /// Overrides the planning model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl<C: CompletionClient> Planner for PromptedPlanner<C> {
    async fn plan(&self, context: &PlanningContext<'_>) -> Result<PlanStep, ProviderError> {
        let prompt = render_planning_prompt(context);
        let reply = self.client.complete(&self.model, &prompt).await?;
        let plan = parse_plan(&reply);
        debug!(
            step = context.step(),
            proposed = plan.actions.len(),
            "planner replied"
        );

        Ok(match plan.actions.into_iter().next() {
            Some(action) => PlanStep::Act {
                action,
                reasoning: plan.reasoning,
            },
            None => PlanStep::Stop {
                reasoning: plan.reasoning,
            },
        })
    }
}

/// Renders the planning prompt for one step.
pub fn render_planning_prompt(context: &PlanningContext<'_>) -> String {
    let mut prompt = format!(
        "You are {agent}. Your goal is: {goal}\n\n\
         You have ${budget} of budget remaining.\n\n\
         Every purchase you make must be approved by a five-member council.\n\
         For each purchase, identify what you need, justify it and estimate the ROI.\n\n\
         Available actions:\n\
         - REQUEST_PURCHASE: submit a purchase for council approval\n\
         - HIRE_AGENT: hire a specialized agent for a task\n\
         - COMPLETE: the goal is met, or nothing more is worth buying\n",
        agent = context.agent,
        goal = context.goal,
        budget = context.budget_remaining,
    );

    if !context.history.is_empty() {
        prompt.push_str("\nActions so far:\n");
        for (i, action) in context.history.iter().enumerate() {
            let what = action
                .purpose
                .clone()
                .or_else(|| action.agent_hired.as_ref().map(|a| format!("hire {}", a)))
                .unwrap_or_default();
            let outcome = match (&action.reason, action.approved) {
                (Some(reason), _) => format!("denied ({})", reason),
                (None, true) => "approved".to_string(),
                (None, false) => "denied by council".to_string(),
            };
            let _ = writeln!(prompt, "{}. ${} {}: {}", i + 1, action.amount, what, outcome);
        }
    }

    prompt.push_str(
        "\nWhat is the single next action? Respond in JSON format:\n\
         {\n\
         \x20   \"reasoning\": \"your thinking process\",\n\
         \x20   \"actions\": [\n\
         \x20       {\"type\": \"REQUEST_PURCHASE\", \"amount\": 500, \"purpose\": \"...\", \
         \"justification\": \"...\", \"expected_roi\": \"...\"}\n\
         \x20   ]\n\
         }\n\
         Use {\"type\": \"HIRE_AGENT\", \"agent_type\": \"...\", \"task\": \"...\", ...} to hire, \
         or an empty actions list to stop.\n",
    );
    prompt
}
