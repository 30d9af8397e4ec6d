//! # Purchase Council
//!
//! Five-role consensus voting on purchase requests.
//!
//! ## Overview
//!
//! Every purchase request is judged independently by a fixed panel of
//! five roles, each with its own persona. The verdicts are reduced to
//! an approve/deny decision with vote tallies and an aggregate risk
//! score.
//!
//! | Role | Looks at |
//! |------|----------|
//! | CFO | Financial viability |
//! | Growth | Revenue and ROI upside |
//! | Risk | Downside and compliance |
//! | Operations | Execution feasibility |
//! | Data | Evidence quality |
//!
//! ## Architecture
//!
//! ```text
//!  ┌─────┐ ┌────────┐ ┌──────┐ ┌────────────┐ ┌──────┐
//!  │ CFO │ │ Growth │ │ Risk │ │ Operations │ │ Data │   JudgmentProvider × 5
//!  └──┬──┘ └───┬────┘ └──┬───┘ └─────┬──────┘ └──┬───┘   (concurrent, timed)
//!     └────────┴─────────┼───────────┴───────────┘
//!                        ▼
//!                 ┌─────────────┐
//!                 │    VOTE     │  degraded roles → ABSTAIN
//!                 │  COLLECTOR  │
//!                 └──────┬──────┘
//!                        ▼
//!                 ┌─────────────┐
//!                 │  CONSENSUS  │  majority with risk veto
//!                 │ AGGREGATOR  │
//!                 └─────────────┘
//! ```
//!
//! ## Approval Policy
//!
//! `approved = (yes − no ≥ majority_margin) ∧ (no = 0 ∨ avg_risk ≤ risk_ceiling)`
//!
//! Defaults: margin 1, ceiling 7.0.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quorum_council::{Council, HeuristicProvider, PurchaseRequest};
//!
//! let council = Council::new(Arc::new(HeuristicProvider::new()));
//! let request = PurchaseRequest::new(500, "API credits", "Support Agent", "Tickets up 300%");
//! let deliberation = council.evaluate(&request).await?;
//! println!("approved: {}", deliberation.consensus.approved());
//! ```

pub mod collector;
pub mod consensus;
pub mod council;
pub mod error;
pub mod panel;
pub mod parsing;
pub mod request;

pub use collector::{CollectedVotes, VoteCollector, DEFAULT_ROLE_TIMEOUT};
pub use consensus::{ConsensusAggregator, ConsensusPolicy, ConsensusResult};
pub use council::{Council, Deliberation, FixedProvider};
pub use error::{CouncilError, ProviderError};
pub use panel::{
    panel_personas, AgentVote, CompletionClient, HeuristicProvider, Judgment, JudgmentProvider,
    Persona, PromptedProvider, Role, Vote, NEUTRAL_RISK_SCORE,
};
pub use request::{PurchaseRequest, Urgency, DEFAULT_BUDGET_REMAINING};

/// Result type for council operations.
pub type Result<T> = std::result::Result<T, CouncilError>;
