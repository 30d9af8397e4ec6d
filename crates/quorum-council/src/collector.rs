//! Fan-out of a purchase request to the five-role panel.
//!
//! Every role is judged on its own task with its own timeout. A role
//! that times out, errors or panics degrades to an ABSTAIN vote with a
//! neutral risk score; the evaluation as a whole only fails when all
//! five roles degrade.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{CouncilError, ProviderError};
use crate::panel::{panel_personas, AgentVote, Judgment, JudgmentProvider, Persona, Role};
use crate::request::PurchaseRequest;
use crate::Result;

/// Default per-role timeout.
pub const DEFAULT_ROLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Votes gathered from the panel, in panel order.
#[derive(Debug, Clone)]
pub struct CollectedVotes {
    votes: Vec<AgentVote>,
    degraded: Vec<Role>,
}

impl CollectedVotes {
    /// The votes, one per role, in [`Role::PANEL`] order.
    pub fn votes(&self) -> &[AgentVote] {
        &self.votes
    }

    /// Consumes the collection, returning the votes.
    pub fn into_votes(self) -> Vec<AgentVote> {
        self.votes
    }

    /// Roles whose vote was substituted with a degraded ABSTAIN.
    pub fn degraded(&self) -> &[Role] {
        &self.degraded
    }

    /// True when at least one role degraded.
    pub fn is_partial(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Collects one vote per panel role for a request.
///
/// # Example
///
/// ```rust,ignore
/// let collector = VoteCollector::new(Arc::new(HeuristicProvider::new()))
///     .with_role_timeout(Duration::from_secs(5));
/// let collected = collector.collect(&request).await?;
/// assert_eq!(collected.votes().len(), 5);
/// ```
#[derive(Clone)]
pub struct VoteCollector {
    provider: Arc<dyn JudgmentProvider>,
    personas: Arc<[Persona; 5]>,
    role_timeout: Duration,
}

impl VoteCollector {
    /// Creates a collector with default personas and timeout.
    pub fn new(provider: Arc<dyn JudgmentProvider>) -> Self {
        Self {
            provider,
            personas: Arc::new(Role::PANEL.map(|role| role.persona())),
            role_timeout: DEFAULT_ROLE_TIMEOUT,
        }
    }

    /// Sets the per-role timeout.
    pub fn with_role_timeout(mut self, timeout: Duration) -> Self {
        self.role_timeout = timeout;
        self
    }

    /// Replaces the personas, e.g. ones built by [`panel_personas`].
    ///
    /// Personas are reordered into panel order by role.
    pub fn with_personas(mut self, personas: [Persona; 5]) -> Self {
        let mut ordered = panel_personas(&Default::default());
        for persona in personas {
            let index = persona.role.index();
            ordered[index] = persona;
        }
        self.personas = Arc::new(ordered);
        self
    }

    /// The per-role timeout.
    pub fn role_timeout(&self) -> Duration {
        self.role_timeout
    }

    /// The personas, in panel order.
    pub fn personas(&self) -> &[Persona; 5] {
        &self.personas
    }

    /// Asks every role for its judgment and waits for all of them.
    ///
    /// Roles run concurrently. Dropping the returned future aborts any
    /// role still in flight.
    ///
    /// # Errors
    ///
    /// [`CouncilError::PanelUnavailable`] when every role degraded.
    pub async fn collect(&self, request: &PurchaseRequest) -> Result<CollectedVotes> {
        let request = Arc::new(request.clone());
        let mut join_set = JoinSet::new();

        for (index, persona) in self.personas.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let request = Arc::clone(&request);
            let persona = persona.clone();
            let timeout = self.role_timeout;

            join_set.spawn(async move {
                let outcome = match tokio::time::timeout(timeout, provider.judge(&request, &persona))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout {
                        role: persona.role,
                        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    }),
                };
                (index, outcome)
            });
        }

        let mut slots: [Option<std::result::Result<Judgment, ProviderError>>; 5] =
            Default::default();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!("Judgment task did not complete: {}", e),
            }
        }

        let mut votes = Vec::with_capacity(slots.len());
        let mut degraded = Vec::new();
        let mut failures = Vec::new();

        for (persona, slot) in self.personas.iter().zip(slots) {
            let outcome = slot.unwrap_or_else(|| {
                Err(ProviderError::Unavailable("judgment task aborted".to_string()))
            });

            match outcome {
                Ok(judgment) => {
                    debug!(role = %persona.role, vote = %judgment.vote, "role voted");
                    votes.push(AgentVote::from_judgment(persona, judgment));
                }
                Err(e) => {
                    warn!(role = %persona.role, "role degraded to ABSTAIN: {}", e);
                    failures.push(format!("{}: {}", persona.role, e));
                    degraded.push(persona.role);
                    votes.push(AgentVote::degraded(persona, &e));
                }
            }
        }

        if degraded.len() == self.personas.len() {
            return Err(CouncilError::PanelUnavailable { failures });
        }

        Ok(CollectedVotes { votes, degraded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{Vote, NEUTRAL_RISK_SCORE};
    use async_trait::async_trait;

    /// Votes YES with the role's panel index as risk, after a per-role delay.
    struct StaggeredProvider {
        slow_role: Option<Role>,
        failing_role: Option<Role>,
    }

    #[async_trait]
    impl JudgmentProvider for StaggeredProvider {
        async fn judge(
            &self,
            _request: &PurchaseRequest,
            persona: &Persona,
        ) -> std::result::Result<Judgment, ProviderError> {
            let role = persona.role;
            // Later roles answer first so completion order differs from panel order.
            let delay = 50 - 10 * role.index() as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if Some(role) == self.slow_role {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if Some(role) == self.failing_role {
                return Err(ProviderError::Unavailable("rate limited".to_string()));
            }
            Ok(Judgment::new(Vote::Yes, role.index() as u8, "ok"))
        }
    }

    struct DownProvider;

    #[async_trait]
    impl JudgmentProvider for DownProvider {
        async fn judge(
            &self,
            _request: &PurchaseRequest,
            _persona: &Persona,
        ) -> std::result::Result<Judgment, ProviderError> {
            Err(ProviderError::Unavailable("connection refused".to_string()))
        }
    }

    struct PanickingProvider;

    #[async_trait]
    impl JudgmentProvider for PanickingProvider {
        async fn judge(
            &self,
            _request: &PurchaseRequest,
            persona: &Persona,
        ) -> std::result::Result<Judgment, ProviderError> {
            if persona.role == Role::Growth {
                panic!("provider bug");
            }
            Ok(Judgment::new(Vote::No, 4, "no"))
        }
    }

    fn request() -> PurchaseRequest {
        PurchaseRequest::new(500, "API credits", "Support Agent", "Tickets up 300%")
    }

    #[tokio::test]
    async fn test_votes_in_panel_order() {
        let collector = VoteCollector::new(Arc::new(StaggeredProvider {
            slow_role: None,
            failing_role: None,
        }));

        let collected = collector.collect(&request()).await.unwrap();
        assert!(!collected.is_partial());

        let roles: Vec<Role> = collected.votes().iter().map(AgentVote::role).collect();
        assert_eq!(roles, Role::PANEL.to_vec());
        for (i, vote) in collected.votes().iter().enumerate() {
            assert_eq!(vote.risk_score as usize, i);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_abstain() {
        let collector = VoteCollector::new(Arc::new(StaggeredProvider {
            slow_role: Some(Role::Risk),
            failing_role: None,
        }))
        .with_role_timeout(Duration::from_millis(500));

        let collected = collector.collect(&request()).await.unwrap();
        assert!(collected.is_partial());
        assert_eq!(collected.degraded(), &[Role::Risk]);

        let risk_vote = &collected.votes()[Role::Risk.index()];
        assert_eq!(risk_vote.vote, Vote::Abstain);
        assert_eq!(risk_vote.risk_score, NEUTRAL_RISK_SCORE);
        assert!(risk_vote.reasoning.contains("timed out after 500ms"));
    }

    #[tokio::test]
    async fn test_error_degrades_to_abstain() {
        let collector = VoteCollector::new(Arc::new(StaggeredProvider {
            slow_role: None,
            failing_role: Some(Role::Data),
        }));

        let collected = collector.collect(&request()).await.unwrap();
        assert_eq!(collected.degraded(), &[Role::Data]);
        assert_eq!(collected.votes().len(), 5);
        assert!(collected.votes()[4].reasoning.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_panicking_role_degrades() {
        let collector = VoteCollector::new(Arc::new(PanickingProvider));

        let collected = collector.collect(&request()).await.unwrap();
        assert_eq!(collected.degraded(), &[Role::Growth]);
        assert_eq!(collected.votes()[1].vote, Vote::Abstain);
        assert_eq!(collected.votes()[0].vote, Vote::No);
    }

    #[tokio::test]
    async fn test_all_roles_down_is_unavailable() {
        let collector = VoteCollector::new(Arc::new(DownProvider));

        let err = collector.collect(&request()).await.unwrap_err();
        match err {
            CouncilError::PanelUnavailable { failures } => {
                assert_eq!(failures.len(), 5);
                assert!(failures[0].starts_with("CFO Agent"));
            }
            other => panic!("expected PanelUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_with_personas_reorders() {
        let mut personas = Role::PANEL.map(|role| role.persona());
        personas.reverse();
        personas[0].model = "custom/data".to_string();

        let collector = VoteCollector::new(Arc::new(DownProvider)).with_personas(personas);
        let roles: Vec<Role> = collector.personas().iter().map(|p| p.role).collect();
        assert_eq!(roles, Role::PANEL.to_vec());
        assert_eq!(collector.personas()[Role::Data.index()].model, "custom/data");
    }
}
