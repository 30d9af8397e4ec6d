//! # Simulation Runner
//!
//! Drives one agent through a bounded loop of planned spends, each
//! gated by the ledger and the council.
//!
//! ## State Machine
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!            ▼                                      │
//!   ┌──────────────┐  Act   ┌──────────────┐        │
//!   │   PLANNING   │───────►│    ACTING    │────────┘
//!   └──────┬───────┘        └──────────────┘
//!          │ Stop / budget exhausted / max actions
//!          ▼
//!   ┌──────────────┐
//!   │  CONCLUDED   │
//!   └──────────────┘
//! ```
//!
//! ## Acting
//!
//! | Step | Outcome on failure |
//! |------|--------------------|
//! | Validate planned action | Denied, `invalid action: ...` |
//! | Reserve amount | Denied, `insufficient budget`, no vote |
//! | Council vote | Approved → commit, denied → release |
//!
//! Steps run strictly one after another: the next action is planned
//! only once the previous one is committed or released.

use std::sync::Arc;

use quorum_council::Council;
use quorum_ledger::{BudgetLedger, LedgerError, ScopeKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::{ConcludedBy, SimulationAction, SimulationResult};
use crate::error::{Result, SimulationError};
use crate::planner::{PlanStep, PlannedAction, Planner, PlanningContext};

/// Actions attempted per run unless configured otherwise.
pub const DEFAULT_MAX_ACTIONS: usize = 10;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerState {
    /// Choosing the next action, or deciding to stop.
    Planning,
    /// Reserving, voting on and resolving one action.
    Acting,
    /// Finished; the result is final.
    Concluded,
}

/// Runs budget-constrained agent simulations.
///
/// # Example
///
/// ```rust,ignore
/// let runner = SimulationRunner::new(council, Arc::new(planner)).with_max_actions(5);
/// let result = runner.run("Marketing Agent Alpha", "Acquire 1000 users", 5000).await?;
/// assert_eq!(result.total_spent + result.budget_remaining, 5000);
/// ```
#[derive(Clone)]
pub struct SimulationRunner {
    council: Council,
    planner: Arc<dyn Planner>,
    max_actions: usize,
}

impl SimulationRunner {
    /// Creates a runner that plans with `planner` and votes with `council`.
    pub fn new(council: Council, planner: Arc<dyn Planner>) -> Self {
        Self {
            council,
            planner,
            max_actions: DEFAULT_MAX_ACTIONS,
        }
    }

    /// Caps the number of actions attempted per run.
    pub fn with_max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions;
        self
    }

    /// Maximum actions attempted per run.
    pub fn max_actions(&self) -> usize {
        self.max_actions
    }

    /// Runs a simulation with a fresh ledger scope of `budget`.
    ///
    /// # Errors
    ///
    /// See [`run_with_ledger`](Self::run_with_ledger).
    pub async fn run(&self, agent: &str, goal: &str, budget: u64) -> Result<SimulationResult> {
        self.run_with_cancellation(agent, goal, budget, &CancellationToken::new())
            .await
    }

    /// Runs a simulation that stops as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`run_with_ledger`](Self::run_with_ledger).
    pub async fn run_with_cancellation(
        &self,
        agent: &str,
        goal: &str,
        budget: u64,
        cancel: &CancellationToken,
    ) -> Result<SimulationResult> {
        let ledger = BudgetLedger::authoritative(budget);
        self.run_with_ledger(agent, goal, &ledger, cancel).await
    }

    /// Runs a simulation against a caller-owned scope.
    ///
    /// The scope must be authoritative and untouched: nothing committed
    /// and nothing held. Holding it while the run is in flight lets the
    /// caller watch the balance move.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidRun`] for a blank agent or goal, an
    ///   advisory scope, or a scope already spent from or held against
    /// - [`SimulationError::Planner`] if planning fails
    /// - [`SimulationError::Council`] if the whole panel is unreachable
    /// - [`SimulationError::Cancelled`] if `cancel` fires; any open
    ///   reservation is released first
    pub async fn run_with_ledger(
        &self,
        agent: &str,
        goal: &str,
        ledger: &BudgetLedger,
        cancel: &CancellationToken,
    ) -> Result<SimulationResult> {
        if agent.trim().is_empty() {
            return Err(SimulationError::InvalidRun("agent name is required".to_string()));
        }
        if goal.trim().is_empty() {
            return Err(SimulationError::InvalidRun("goal is required".to_string()));
        }
        if ledger.kind() != ScopeKind::Authoritative {
            return Err(SimulationError::InvalidRun(
                "simulation needs an authoritative budget scope".to_string(),
            ));
        }
        if ledger.remaining() != ledger.initial() || ledger.held() != 0 {
            return Err(SimulationError::InvalidRun(format!(
                "budget scope already in use: {} of {} remaining, {} held",
                ledger.remaining(),
                ledger.initial(),
                ledger.held()
            )));
        }

        info!(
            agent,
            goal,
            budget = ledger.remaining(),
            max_actions = self.max_actions,
            "simulation started"
        );

        let mut actions: Vec<SimulationAction> = Vec::new();
        let mut reasoning: Option<String> = None;
        let mut state = RunnerState::Planning;

        let concluded_by = loop {
            debug_assert_eq!(state, RunnerState::Planning);

            if cancel.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }
            if ledger.is_exhausted() {
                break ConcludedBy::BudgetExhausted;
            }
            if actions.len() >= self.max_actions {
                break ConcludedBy::MaxActions;
            }

            let context = PlanningContext {
                agent,
                goal,
                history: &actions,
                budget_remaining: ledger.remaining(),
            };
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SimulationError::Cancelled),
                step = self.planner.plan(&context) => step?,
            };

            let action = match step {
                PlanStep::Stop { reasoning: summary } => {
                    reasoning = summary.or(reasoning);
                    break ConcludedBy::PlannerStopped;
                }
                PlanStep::Act {
                    action,
                    reasoning: summary,
                } => {
                    if reasoning.is_none() {
                        reasoning = summary;
                    }
                    action
                }
            };

            state = RunnerState::Acting;
            debug!(step = actions.len(), ?state, purpose = %action.purpose(), "acting");
            let record = self.act(agent, &action, ledger, cancel).await?;
            actions.push(record);
            state = RunnerState::Planning;
        };

        state = RunnerState::Concluded;
        let total_spent = actions.iter().map(SimulationAction::spent).sum();
        let result = SimulationResult {
            agent: agent.to_string(),
            goal: goal.to_string(),
            reasoning,
            actions_taken: actions,
            total_spent,
            budget_remaining: ledger.remaining(),
            concluded_by,
        };

        info!(
            agent,
            ?state,
            %concluded_by,
            actions = result.actions_taken.len(),
            approved = result.approved_count(),
            total_spent = result.total_spent,
            budget_remaining = result.budget_remaining,
            "simulation concluded"
        );
        Ok(result)
    }

    /// Performs one planned action: reserve, vote, resolve.
    async fn act(
        &self,
        agent: &str,
        action: &PlannedAction,
        ledger: &BudgetLedger,
        cancel: &CancellationToken,
    ) -> Result<SimulationAction> {
        if let Err(problem) = action.validate() {
            warn!(agent, %problem, "planned action is invalid");
            return Ok(SimulationAction::denied(
                action,
                format!("invalid action: {}", problem),
            ));
        }

        let hold = match ledger.reserve(action.amount) {
            Ok(hold) => hold,
            Err(LedgerError::InsufficientBudget {
                requested,
                available,
            }) => {
                info!(agent, requested, available, "denied: insufficient budget");
                return Ok(SimulationAction::denied(action, "insufficient budget"));
            }
            Err(LedgerError::InvalidAmount(problem)) => {
                return Ok(SimulationAction::denied(
                    action,
                    format!("invalid action: {}", problem),
                ));
            }
        };

        let request = action.to_request(agent, ledger.remaining());
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            outcome = self.council.evaluate(&request) => Some(outcome),
        };

        let deliberation = match outcome {
            None => {
                hold.release();
                warn!(agent, "simulation cancelled during vote, reservation released");
                return Err(SimulationError::Cancelled);
            }
            Some(Err(e)) => {
                hold.release();
                return Err(e.into());
            }
            Some(Ok(deliberation)) => deliberation,
        };

        if deliberation.consensus.approved() {
            let remaining = hold.commit();
            debug!(agent, amount = action.amount, remaining, "action approved");
        } else {
            hold.release();
            debug!(agent, amount = action.amount, "action denied by council");
        }

        Ok(SimulationAction::decided(action, deliberation.consensus))
    }
}
