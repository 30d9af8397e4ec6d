//! # Quorum Core
//!
//! Unified facade for council-gated spending.
//! Orchestrates the Council, the Budget Ledger and the Simulation Runner.
//!
//! ## Components
//!
//! | Layer | Component | Responsibility |
//! |-------|-----------|----------------|
//! | Decision | Council | Five-role vote, majority with risk veto |
//! | Accounting | Budget Ledger | Reserve, commit, release; no overspend |
//! | Autonomy | Simulation Runner | Planning → Acting loop under a budget |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         QUORUM CORE                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                    ┌─────────────────┐                          │
//! │                    │     Quorum      │  ← Unified Facade        │
//! │                    └────────┬────────┘                          │
//! │                             │                                   │
//! │         ┌───────────────────┼───────────────────┐               │
//! │         ▼                   ▼                   ▼               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐          │
//! │  │   Council   │    │   Budget    │    │ Simulation  │          │
//! │  │             │    │   Ledger    │    │   Runner    │          │
//! │  └─────────────┘    └─────────────┘    └─────────────┘          │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quorum_core::{EvaluateRequest, Quorum, QuorumConfig};
//!
//! let quorum = Quorum::new(QuorumConfig::load("quorum.toml")?, provider)?;
//!
//! let result = quorum.evaluate(request).await?;
//! if result.approved() {
//!     // Spend
//! }
//! ```

mod api;
mod config;
mod error;
mod history;
mod quorum;

pub use api::{ApiResponse, EvaluateRequest, HealthStatus, SimulateRequest};
pub use config::{CouncilConfig, EvaluationConfig, HistoryConfig, QuorumConfig, SimulationConfig};
pub use error::QuorumError;
pub use history::{HistoryStore, InMemoryHistory};
pub use quorum::Quorum;

// Re-export component types for convenience
pub use quorum_council::{ConsensusResult, HeuristicProvider, JudgmentProvider, PurchaseRequest};
pub use quorum_ledger::{BudgetLedger, ScopeKind};
pub use quorum_sim::{Planner, ScriptedPlanner, SimulationResult};

/// Core result type for Quorum operations.
pub type Result<T> = std::result::Result<T, QuorumError>;

#[cfg(test)]
mod tests;
