//! Error types for the evaluation panel.
//!
//! Defines errors that can occur during request validation,
//! judgment invocation, vote collection and consensus aggregation.

use thiserror::Error;

use crate::panel::Role;

/// Errors that can occur during council operations.
#[derive(Debug, Error)]
pub enum CouncilError {
    /// The purchase request is malformed or out of range.
    #[error("Invalid purchase request: {0}")]
    InvalidRequest(String),

    /// Every role on the panel degraded; no real judgment was produced.
    #[error("Judgment provider unavailable for all {} roles: {}", failures.len(), failures.join("; "))]
    PanelUnavailable {
        /// One message per failed role, in panel order.
        failures: Vec<String>,
    },

    /// The vote set handed to the aggregator is corrupt.
    #[error("Aggregation invariant violated: {0}")]
    InvariantViolation(String),

    /// Configuration value outside its valid range.
    #[error("Invalid council configuration: {0}")]
    Config(String),
}

/// Failure modes of a single judgment provider invocation.
///
/// These never reach the caller of an evaluation directly: the vote
/// collector turns them into degraded ABSTAIN votes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider did not answer within the role timeout.
    #[error("{role} timed out after {timeout_ms}ms")]
    Timeout {
        /// Role whose invocation timed out.
        role: Role,
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The provider could not be reached or returned an error.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something that is not a judgment.
    #[error("malformed judgment: {0}")]
    Malformed(String),
}
