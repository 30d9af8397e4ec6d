//! Consensus aggregation for panel votes.
//!
//! Reduces a complete vote set into tallies, an average risk score and
//! an approval decision under a configurable majority-with-veto policy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CouncilError;
use crate::panel::{AgentVote, Role, Vote, MAX_RISK_SCORE};
use crate::request::PurchaseRequest;
use crate::Result;

/// Approval policy.
///
/// A request is approved when
/// `yes - no >= majority_margin` and, if any role voted NO,
/// `average_risk_score <= risk_ceiling`.
///
/// A single dissent does not block a broadly supported request, but
/// dissent combined with elevated aggregate risk does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusPolicy {
    /// Minimum yes−no gap required.
    pub majority_margin: u32,
    /// Maximum tolerated average risk when any NO exists.
    pub risk_ceiling: f64,
}

impl Default for ConsensusPolicy {
    fn default() -> Self {
        Self {
            majority_margin: 1,
            risk_ceiling: 7.0,
        }
    }
}

impl ConsensusPolicy {
    /// Creates a policy, checking both values are in range.
    ///
    /// # Errors
    ///
    /// [`CouncilError::Config`] when the margin is zero (an all-ABSTAIN
    /// panel would pass) or the ceiling is outside 0–10.
    pub fn new(majority_margin: u32, risk_ceiling: f64) -> Result<Self> {
        let policy = Self {
            majority_margin,
            risk_ceiling,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Checks the policy values.
    pub fn validate(&self) -> Result<()> {
        if self.majority_margin == 0 {
            return Err(CouncilError::Config(
                "majority_margin must be at least 1".to_string(),
            ));
        }
        if !(0.0..=f64::from(MAX_RISK_SCORE)).contains(&self.risk_ceiling) {
            return Err(CouncilError::Config(format!(
                "risk_ceiling must be between 0 and {}, got {}",
                MAX_RISK_SCORE, self.risk_ceiling
            )));
        }
        Ok(())
    }

    /// Applies the policy to tallies.
    pub fn approves(&self, yes_votes: usize, no_votes: usize, average_risk_score: f64) -> bool {
        let has_majority = yes_votes >= no_votes + self.majority_margin as usize;
        let within_risk = no_votes == 0 || average_risk_score <= self.risk_ceiling;
        has_majority && within_risk
    }
}

/// The panel's decision on one request.
///
/// Only [`ConsensusAggregator::aggregate`] builds these; `approved` is
/// always derived from the tallies and never set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusResult {
    purchase_request: PurchaseRequest,
    agent_votes: Vec<AgentVote>,
    yes_votes: usize,
    no_votes: usize,
    abstain_votes: usize,
    average_risk_score: f64,
    approved: bool,
}

impl ConsensusResult {
    /// The evaluated request.
    pub fn purchase_request(&self) -> &PurchaseRequest {
        &self.purchase_request
    }

    /// Votes in panel order.
    pub fn agent_votes(&self) -> &[AgentVote] {
        &self.agent_votes
    }

    /// Number of YES votes.
    pub fn yes_votes(&self) -> usize {
        self.yes_votes
    }

    /// Number of NO votes.
    pub fn no_votes(&self) -> usize {
        self.no_votes
    }

    /// Number of ABSTAIN votes, degraded roles included.
    pub fn abstain_votes(&self) -> usize {
        self.abstain_votes
    }

    /// Mean risk over all votes, rounded to one decimal.
    pub fn average_risk_score(&self) -> f64 {
        self.average_risk_score
    }

    /// Whether the request was approved.
    pub fn approved(&self) -> bool {
        self.approved
    }
}

/// Stateless reducer from vote sets to [`ConsensusResult`]s.
///
/// # Voting Rules
///
/// - Exactly one vote per panel role, in panel order
/// - ABSTAIN votes still contribute their risk score to the average
/// - Identical inputs always produce identical results
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusAggregator {
    policy: ConsensusPolicy,
}

impl ConsensusAggregator {
    /// Creates an aggregator with the given policy.
    pub fn new(policy: ConsensusPolicy) -> Self {
        Self { policy }
    }

    /// The policy in force.
    pub fn policy(&self) -> &ConsensusPolicy {
        &self.policy
    }

    /// Reduces `votes` into a decision on `request`.
    ///
    /// # Errors
    ///
    /// [`CouncilError::InvariantViolation`] when the vote set is not one
    /// vote per role in panel order or a risk score is out of range. This
    /// is a programming defect upstream, never a normal denial.
    pub fn aggregate(
        &self,
        request: PurchaseRequest,
        votes: Vec<AgentVote>,
    ) -> Result<ConsensusResult> {
        check_vote_set(&votes)?;

        let mut yes_votes = 0;
        let mut no_votes = 0;
        let mut abstain_votes = 0;
        let mut risk_total: u32 = 0;

        for vote in &votes {
            match vote.vote {
                Vote::Yes => yes_votes += 1,
                Vote::No => no_votes += 1,
                Vote::Abstain => abstain_votes += 1,
            }
            risk_total += u32::from(vote.risk_score);
        }

        if yes_votes + no_votes + abstain_votes != votes.len() {
            return Err(CouncilError::InvariantViolation(format!(
                "tallies {}+{}+{} do not sum to {} votes",
                yes_votes,
                no_votes,
                abstain_votes,
                votes.len()
            )));
        }

        let average_risk_score = round_one_decimal(f64::from(risk_total) / votes.len() as f64);
        let approved = self
            .policy
            .approves(yes_votes, no_votes, average_risk_score);

        debug!(
            "Consensus: {} YES, {} NO, {} ABSTAIN, avg risk {:.1} -> {}",
            yes_votes,
            no_votes,
            abstain_votes,
            average_risk_score,
            if approved { "approved" } else { "denied" }
        );

        Ok(ConsensusResult {
            purchase_request: request,
            agent_votes: votes,
            yes_votes,
            no_votes,
            abstain_votes,
            average_risk_score,
            approved,
        })
    }
}

fn check_vote_set(votes: &[AgentVote]) -> Result<()> {
    if votes.len() != Role::PANEL.len() {
        return Err(CouncilError::InvariantViolation(format!(
            "expected {} votes, got {}",
            Role::PANEL.len(),
            votes.len()
        )));
    }

    for (expected, vote) in Role::PANEL.iter().zip(votes) {
        if vote.role() != *expected {
            return Err(CouncilError::InvariantViolation(format!(
                "vote from {} found in {}'s slot",
                vote.role(),
                expected
            )));
        }
        if vote.risk_score > MAX_RISK_SCORE {
            return Err(CouncilError::InvariantViolation(format!(
                "{} risk score {} exceeds {}",
                vote.role(),
                vote.risk_score,
                MAX_RISK_SCORE
            )));
        }
    }

    Ok(())
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Judgment;

    fn request() -> PurchaseRequest {
        PurchaseRequest::new(500, "API credits", "Support Agent", "Tickets up")
    }

    fn votes(verdicts: [(Vote, u8); 5]) -> Vec<AgentVote> {
        Role::PANEL
            .iter()
            .zip(verdicts)
            .map(|(role, (vote, risk))| {
                AgentVote::from_judgment(&role.persona(), Judgment::new(vote, risk, "test"))
            })
            .collect()
    }

    #[test]
    fn test_default_policy() {
        let policy = ConsensusPolicy::default();
        assert_eq!(policy.majority_margin, 1);
        assert!((policy.risk_ceiling - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_policy_rejects_zero_margin() {
        assert!(matches!(
            ConsensusPolicy::new(0, 7.0),
            Err(CouncilError::Config(_))
        ));
    }

    #[test]
    fn test_policy_rejects_out_of_range_ceiling() {
        assert!(ConsensusPolicy::new(1, 10.5).is_err());
        assert!(ConsensusPolicy::new(1, -1.0).is_err());
        assert!(ConsensusPolicy::new(2, 10.0).is_ok());
    }

    #[test]
    fn test_policy_approves_split_with_low_risk() {
        let policy = ConsensusPolicy::default();
        assert!(policy.approves(3, 2, 4.0));
    }

    #[test]
    fn test_policy_denies_split_with_high_risk() {
        let policy = ConsensusPolicy::default();
        assert!(!policy.approves(3, 2, 8.0));
    }

    #[test]
    fn test_policy_ignores_risk_without_dissent() {
        let policy = ConsensusPolicy::default();
        assert!(policy.approves(3, 0, 9.0));
    }

    #[test]
    fn test_policy_margin() {
        let policy = ConsensusPolicy::new(2, 7.0).unwrap();
        assert!(!policy.approves(3, 2, 1.0));
        assert!(policy.approves(4, 1, 1.0));
    }

    #[test]
    fn test_policy_all_abstain_denied() {
        assert!(!ConsensusPolicy::default().approves(0, 0, 5.0));
    }

    #[test]
    fn test_aggregate_tallies_and_average() {
        let aggregator = ConsensusAggregator::default();
        let result = aggregator
            .aggregate(
                request(),
                votes([
                    (Vote::Yes, 3),
                    (Vote::Yes, 5),
                    (Vote::No, 5),
                    (Vote::Abstain, 8),
                    (Vote::Yes, 4),
                ]),
            )
            .unwrap();

        assert_eq!(result.yes_votes(), 3);
        assert_eq!(result.no_votes(), 1);
        assert_eq!(result.abstain_votes(), 1);
        assert!((result.average_risk_score() - 5.0).abs() < f64::EPSILON);
        assert!(result.approved());
    }

    #[test]
    fn test_aggregate_rounds_average() {
        let aggregator = ConsensusAggregator::default();
        let result = aggregator
            .aggregate(
                request(),
                votes([
                    (Vote::Yes, 1),
                    (Vote::Yes, 2),
                    (Vote::Yes, 2),
                    (Vote::Yes, 2),
                    (Vote::Yes, 2),
                ]),
            )
            .unwrap();
        // 9 / 5 = 1.8
        assert!((result.average_risk_score() - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_dissent_with_high_risk_denied() {
        let aggregator = ConsensusAggregator::default();
        let result = aggregator
            .aggregate(
                request(),
                votes([
                    (Vote::Yes, 8),
                    (Vote::Yes, 8),
                    (Vote::Yes, 8),
                    (Vote::No, 8),
                    (Vote::No, 8),
                ]),
            )
            .unwrap();
        assert_eq!(result.yes_votes(), 3);
        assert!(!result.approved());
    }

    #[test]
    fn test_aggregate_rejects_short_vote_set() {
        let aggregator = ConsensusAggregator::default();
        let mut short = votes([(Vote::Yes, 1); 5]);
        short.pop();

        let err = aggregator.aggregate(request(), short).unwrap_err();
        assert!(matches!(err, CouncilError::InvariantViolation(_)));
        assert!(err.to_string().contains("expected 5 votes, got 4"));
    }

    #[test]
    fn test_aggregate_rejects_out_of_order_votes() {
        let aggregator = ConsensusAggregator::default();
        let mut shuffled = votes([(Vote::Yes, 1); 5]);
        shuffled.swap(0, 1);

        let err = aggregator.aggregate(request(), shuffled).unwrap_err();
        assert!(err.to_string().contains("slot"));
    }

    #[test]
    fn test_aggregate_rejects_out_of_range_risk() {
        let aggregator = ConsensusAggregator::default();
        let mut bad = votes([(Vote::Yes, 1); 5]);
        bad[2].risk_score = 11;

        assert!(aggregator.aggregate(request(), bad).is_err());
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let aggregator = ConsensusAggregator::default();
        let verdicts = [
            (Vote::Yes, 2),
            (Vote::No, 6),
            (Vote::Yes, 4),
            (Vote::Abstain, 5),
            (Vote::Yes, 3),
        ];
        let first = aggregator.aggregate(request(), votes(verdicts)).unwrap();
        let second = aggregator.aggregate(request(), votes(verdicts)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_result_wire_shape() {
        let aggregator = ConsensusAggregator::default();
        let result = aggregator
            .aggregate(request(), votes([(Vote::Yes, 2); 5]))
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["approved"], true);
        assert_eq!(json["yes_votes"], 5);
        assert_eq!(json["agent_votes"].as_array().unwrap().len(), 5);
        assert_eq!(json["purchase_request"]["amount"], 500);
        assert_eq!(json["average_risk_score"], 2.0);
    }
}
