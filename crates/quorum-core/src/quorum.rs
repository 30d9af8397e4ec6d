//! The unified Quorum facade.
//!
//! [`Quorum`] wires the council, the ledger and the simulation runner
//! together from one [`QuorumConfig`] and keeps a history of what it
//! produced.

use std::sync::Arc;

use quorum_council::{
    panel_personas, ConsensusAggregator, ConsensusResult, Council, JudgmentProvider,
    PurchaseRequest, VoteCollector,
};
use quorum_ledger::{BudgetLedger, LedgerError};
use quorum_sim::{Planner, ScriptedPlanner, SimulationError, SimulationResult, SimulationRunner};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{EvaluateRequest, HealthStatus, SimulateRequest};
use crate::config::QuorumConfig;
use crate::error::QuorumError;
use crate::history::{HistoryStore, InMemoryHistory};
use crate::Result;

/// The Quorum purchase-consensus service.
///
/// # Operations
///
/// 1. **Evaluate**: one purchase request, one panel vote, against an
///    advisory ledger scope that is never debited
/// 2. **Simulate**: an agent spending a budget through repeated
///    evaluations against an authoritative scope
///
/// # Example
///
/// ```rust,ignore
/// let quorum = Quorum::new(QuorumConfig::default(), Arc::new(HeuristicProvider::new()))?
///     .with_planner(Arc::new(planner));
///
/// let result = quorum
///     .simulate(SimulateRequest::new("Marketing Agent Alpha", "Acquire 1000 users"))
///     .await?;
/// println!("spent ${}", result.total_spent);
/// ```
pub struct Quorum {
    config: QuorumConfig,
    council: Council,
    runner: SimulationRunner,
    history: Arc<dyn HistoryStore>,
}

impl Quorum {
    /// Creates a facade using `provider` for every role.
    ///
    /// Until [`with_planner`](Self::with_planner) is called, simulations
    /// conclude immediately without acting.
    ///
    /// # Errors
    ///
    /// [`QuorumError::Config`] if the configuration is invalid.
    pub fn new(config: QuorumConfig, provider: Arc<dyn JudgmentProvider>) -> Result<Self> {
        config.validate()?;

        let collector = VoteCollector::new(provider)
            .with_role_timeout(config.council.role_timeout())
            .with_personas(panel_personas(&config.council.role_models()?));
        let council = Council::with_components(
            collector,
            ConsensusAggregator::new(config.council.policy()?),
        );

        let runner = SimulationRunner::new(council.clone(), Arc::new(ScriptedPlanner::default()))
            .with_max_actions(config.simulation.max_actions);
        let history = Arc::new(InMemoryHistory::new(config.history.capacity));

        info!(
            "Quorum initialized: margin {}, risk ceiling {:.1}, {} max actions",
            config.council.majority_margin,
            config.council.risk_ceiling,
            config.simulation.max_actions
        );

        Ok(Self {
            config,
            council,
            runner,
            history,
        })
    }

    /// Sets the planner used by simulations.
    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.runner = SimulationRunner::new(self.council.clone(), planner)
            .with_max_actions(self.config.simulation.max_actions);
        self
    }

    /// Replaces the history store.
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    /// The configuration this facade was built from.
    pub fn config(&self) -> &QuorumConfig {
        &self.config
    }

    /// The council used for every vote.
    pub fn council(&self) -> &Council {
        &self.council
    }

    /// Evaluates a standalone purchase request.
    ///
    /// # Errors
    ///
    /// See [`evaluate_with_cancellation`](Self::evaluate_with_cancellation).
    pub async fn evaluate(&self, request: EvaluateRequest) -> Result<ConsensusResult> {
        self.evaluate_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Evaluates a standalone purchase request, abandoning it if
    /// `cancel` fires.
    ///
    /// The request's `budget_remaining` is informational: the amount is
    /// held against an advisory scope and nothing is debited.
    ///
    /// # Errors
    ///
    /// - [`QuorumError::Council`] wrapping `InvalidRequest` for malformed
    ///   input, or `PanelUnavailable` when no role could answer
    /// - [`QuorumError::Cancelled`] if `cancel` fires first
    pub async fn evaluate_with_cancellation(
        &self,
        request: EvaluateRequest,
        cancel: &CancellationToken,
    ) -> Result<ConsensusResult> {
        let request = request.into_purchase_request(self.config.evaluation.default_budget_remaining);
        request.validate()?;

        let scope = BudgetLedger::advisory(request.budget_remaining);
        let hold = scope.reserve(request.amount).map_err(|e| match e {
            LedgerError::InvalidAmount(m) => QuorumError::Validation(m),
            other => QuorumError::Validation(other.to_string()),
        })?;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            outcome = self.council.evaluate(&request) => Some(outcome),
        };

        let deliberation = match outcome {
            None => {
                hold.release();
                warn!("Evaluation of '{}' cancelled", request.purpose);
                return Err(QuorumError::Cancelled);
            }
            Some(Err(e)) => {
                hold.release();
                return Err(e.into());
            }
            Some(Ok(deliberation)) => deliberation,
        };

        if deliberation.consensus.approved() {
            hold.commit();
        } else {
            hold.release();
        }

        self.history.record_evaluation(deliberation.consensus.clone());
        Ok(deliberation.consensus)
    }

    /// Runs an agent simulation.
    ///
    /// # Errors
    ///
    /// See [`simulate_with_cancellation`](Self::simulate_with_cancellation).
    pub async fn simulate(&self, request: SimulateRequest) -> Result<SimulationResult> {
        self.simulate_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Runs an agent simulation that stops if `cancel` fires.
    ///
    /// # Errors
    ///
    /// - [`QuorumError::Validation`] for a blank agent name or goal
    /// - [`QuorumError::Simulation`] if planning or the panel fails
    /// - [`QuorumError::Cancelled`] if `cancel` fires; no reservation is
    ///   left open
    pub async fn simulate_with_cancellation(
        &self,
        request: SimulateRequest,
        cancel: &CancellationToken,
    ) -> Result<SimulationResult> {
        if request.agent_name.trim().is_empty() {
            return Err(QuorumError::Validation("agent_name is required".to_string()));
        }
        if request.goal.trim().is_empty() {
            return Err(QuorumError::Validation("goal is required".to_string()));
        }

        let budget = request
            .budget
            .unwrap_or(self.config.simulation.default_budget);
        debug!(agent = %request.agent_name, budget, "simulation requested");

        let result = self
            .runner
            .run_with_cancellation(&request.agent_name, &request.goal, budget, cancel)
            .await
            .map_err(|e| match e {
                SimulationError::Cancelled => QuorumError::Cancelled,
                other => QuorumError::Simulation(other),
            })?;

        self.history.record_simulation(result.clone());
        Ok(result)
    }

    /// Previous evaluations, most recent first.
    pub fn evaluations(&self) -> Vec<ConsensusResult> {
        self.history.evaluations()
    }

    /// Previous simulations, most recent first.
    pub fn simulations(&self) -> Vec<SimulationResult> {
        self.history.simulations()
    }

    /// Liveness report for the API surface.
    pub fn health(&self) -> HealthStatus {
        HealthStatus::healthy("Quorum consensus API is running")
    }

    /// Evaluates an already-built purchase request.
    ///
    /// # Errors
    ///
    /// As [`evaluate`](Self::evaluate).
    pub async fn evaluate_purchase(&self, request: PurchaseRequest) -> Result<ConsensusResult> {
        self.evaluate(request.into()).await
    }
}
