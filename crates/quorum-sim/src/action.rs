//! The action log of a simulation run and its final result.

use std::fmt;

use quorum_council::ConsensusResult;
use serde::Serialize;

use crate::planner::{ActionKind, PlannedAction};

/// Kind of a logged action, as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A direct purchase.
    Purchase,
    /// Hiring a named sub-agent for a task.
    AgentHire,
}

/// One entry in a run's action log. Appended, never edited.
///
/// `amount` is the amount the planner asked for; it is debited only
/// when `approved` is true. `votes` is absent when the action was
/// denied before reaching the panel, in which case `reason` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationAction {
    /// Purchase or agent hire.
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Copied from the gating consensus; false for pre-vote denials.
    pub approved: bool,
    /// Requested amount.
    pub amount: u64,
    /// What the purchase was for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// The sub-agent hired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_hired: Option<String>,
    /// The hired sub-agent's task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// The consensus that gated this action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<ConsensusResult>,
    /// Why the action was denied without a vote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SimulationAction {
    fn from_plan(action: &PlannedAction) -> Self {
        let (action_type, purpose, agent_hired, task) = match &action.kind {
            ActionKind::Purchase { purpose } => {
                (ActionType::Purchase, Some(purpose.clone()), None, None)
            }
            ActionKind::HireAgent { agent_type, task } => (
                ActionType::AgentHire,
                None,
                Some(agent_type.clone()),
                Some(task.clone()),
            ),
        };

        Self {
            action_type,
            approved: false,
            amount: action.amount,
            purpose,
            agent_hired,
            task,
            votes: None,
            reason: None,
        }
    }

    /// An action the panel voted on.
    pub fn decided(action: &PlannedAction, consensus: ConsensusResult) -> Self {
        Self {
            approved: consensus.approved(),
            votes: Some(consensus),
            ..Self::from_plan(action)
        }
    }

    /// An action denied before reaching the panel.
    pub fn denied(action: &PlannedAction, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::from_plan(action)
        }
    }

    /// Amount actually debited.
    pub fn spent(&self) -> u64 {
        if self.approved {
            self.amount
        } else {
            0
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcludedBy {
    /// Nothing left to spend.
    BudgetExhausted,
    /// The step limit was reached.
    MaxActions,
    /// The planner reported the goal met or abandoned.
    PlannerStopped,
}

impl fmt::Display for ConcludedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExhausted => write!(f, "budget exhausted"),
            Self::MaxActions => write!(f, "max actions reached"),
            Self::PlannerStopped => write!(f, "planner stopped"),
        }
    }
}

/// The finalized outcome of one run.
///
/// `total_spent + budget_remaining` always equals the run's budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// The simulated agent.
    pub agent: String,
    /// What it was trying to achieve.
    pub goal: String,
    /// The planner's summary, if it gave one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Every action attempted, in order.
    pub actions_taken: Vec<SimulationAction>,
    /// Sum of approved amounts.
    pub total_spent: u64,
    /// Budget left at the end of the run.
    pub budget_remaining: u64,
    /// Termination reason.
    pub concluded_by: ConcludedBy,
}

impl SimulationResult {
    /// The budget the run started with.
    pub fn initial_budget(&self) -> u64 {
        self.total_spent + self.budget_remaining
    }

    /// Number of approved actions.
    pub fn approved_count(&self) -> usize {
        self.actions_taken.iter().filter(|a| a.approved).count()
    }

    /// Number of denied actions.
    pub fn denied_count(&self) -> usize {
        self.actions_taken.len() - self.approved_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_purchase_wire_shape() {
        let planned = PlannedAction::purchase(400, "Ad spend", "Acquire users");
        let action = SimulationAction::denied(&planned, "insufficient budget");

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "purchase");
        assert_eq!(json["approved"], false);
        assert_eq!(json["amount"], 400);
        assert_eq!(json["purpose"], "Ad spend");
        assert_eq!(json["reason"], "insufficient budget");
        assert!(json.get("votes").is_none());
        assert!(json.get("agent_hired").is_none());
        assert_eq!(action.spent(), 0);
    }

    #[test]
    fn test_hire_wire_shape() {
        let planned = PlannedAction::hire(300, "Design Agent", "Create landing page", "Need design");
        let action = SimulationAction::denied(&planned, "insufficient budget");

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "agent_hire");
        assert_eq!(json["agent_hired"], "Design Agent");
        assert_eq!(json["task"], "Create landing page");
        assert!(json.get("purpose").is_none());
    }

    #[test]
    fn test_concluded_by_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ConcludedBy::BudgetExhausted).unwrap(),
            "budget_exhausted"
        );
        assert_eq!(ConcludedBy::MaxActions.to_string(), "max actions reached");
    }
}
