//! Council facade combining vote collection and consensus.
//!
//! The main entry point for evaluating a purchase request: validate,
//! fan out to the panel, aggregate.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::collector::VoteCollector;
use crate::consensus::{ConsensusAggregator, ConsensusPolicy, ConsensusResult};
use crate::panel::{Judgment, JudgmentProvider, Persona, Role};
use crate::request::PurchaseRequest;
use crate::Result;

/// Outcome of one panel evaluation.
#[derive(Debug, Clone)]
pub struct Deliberation {
    /// The panel's decision.
    pub consensus: ConsensusResult,
    /// Roles that degraded to ABSTAIN.
    pub degraded: Vec<Role>,
}

impl Deliberation {
    /// True when one or more roles degraded.
    pub fn is_partial(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// The five-role council.
///
/// # Example
///
/// ```rust,ignore
/// use quorum_council::{Council, HeuristicProvider, PurchaseRequest};
///
/// let council = Council::new(Arc::new(HeuristicProvider::new()));
/// let request = PurchaseRequest::new(500, "API credits", "Support Agent", "Tickets up 300%");
///
/// let deliberation = council.evaluate(&request).await?;
/// if deliberation.consensus.approved() {
///     // Spend the money
/// }
/// ```
#[derive(Clone)]
pub struct Council {
    collector: VoteCollector,
    aggregator: ConsensusAggregator,
}

impl Council {
    /// Creates a council with default personas, timeout and policy.
    pub fn new(provider: Arc<dyn JudgmentProvider>) -> Self {
        Self {
            collector: VoteCollector::new(provider),
            aggregator: ConsensusAggregator::default(),
        }
    }

    /// Creates a council from explicit components.
    pub fn with_components(collector: VoteCollector, aggregator: ConsensusAggregator) -> Self {
        Self {
            collector,
            aggregator,
        }
    }

    /// Sets the approval policy.
    pub fn with_policy(mut self, policy: ConsensusPolicy) -> Self {
        self.aggregator = ConsensusAggregator::new(policy);
        self
    }

    /// Sets the per-role timeout.
    pub fn with_role_timeout(mut self, timeout: Duration) -> Self {
        self.collector = self.collector.with_role_timeout(timeout);
        self
    }

    /// The approval policy in force.
    pub fn policy(&self) -> &ConsensusPolicy {
        self.aggregator.policy()
    }

    /// The personas, in panel order.
    pub fn personas(&self) -> &[Persona; 5] {
        self.collector.personas()
    }

    /// Evaluates a purchase request.
    ///
    /// # Process
    ///
    /// 1. Validate the request (no work is done on invalid input)
    /// 2. Collect one vote per role, concurrently
    /// 3. Aggregate into a decision
    ///
    /// # Errors
    ///
    /// - [`CouncilError::InvalidRequest`](crate::CouncilError::InvalidRequest) for malformed requests
    /// - [`CouncilError::PanelUnavailable`](crate::CouncilError::PanelUnavailable) when every role degraded
    /// - [`CouncilError::InvariantViolation`](crate::CouncilError::InvariantViolation) on a corrupt vote set
    pub async fn evaluate(&self, request: &PurchaseRequest) -> Result<Deliberation> {
        request.validate()?;

        info!(
            "Evaluating ${} for '{}' requested by {}",
            request.amount, request.purpose, request.requesting_agent
        );

        let collected = self.collector.collect(request).await?;
        let degraded = collected.degraded().to_vec();
        if !degraded.is_empty() {
            warn!(
                "Evaluation is partial: {} of {} roles degraded",
                degraded.len(),
                Role::PANEL.len()
            );
        }

        let consensus = self
            .aggregator
            .aggregate(request.clone(), collected.into_votes())?;

        info!(
            "{} '{}': {} YES, {} NO, {} ABSTAIN, avg risk {:.1}",
            if consensus.approved() { "Approved" } else { "Denied" },
            request.purpose,
            consensus.yes_votes(),
            consensus.no_votes(),
            consensus.abstain_votes(),
            consensus.average_risk_score()
        );

        Ok(Deliberation {
            consensus,
            degraded,
        })
    }
}

/// A fixed verdict per role; handy for wiring tests and dry runs.
#[derive(Debug, Clone)]
pub struct FixedProvider {
    judgments: [Judgment; 5],
}

impl FixedProvider {
    /// Creates a provider that answers with `judgments[role.index()]`.
    pub fn new(judgments: [Judgment; 5]) -> Self {
        Self { judgments }
    }
}

#[async_trait::async_trait]
impl JudgmentProvider for FixedProvider {
    async fn judge(
        &self,
        _request: &PurchaseRequest,
        persona: &Persona,
    ) -> std::result::Result<Judgment, crate::ProviderError> {
        Ok(self.judgments[persona.role.index()].clone())
    }
}
