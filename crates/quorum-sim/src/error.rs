//! Error types for simulation runs.

use quorum_council::{CouncilError, ProviderError};
use thiserror::Error;

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors that abort a simulation run.
///
/// Denials (by vote, by budget, or for an invalid planned action) are
/// not errors; they are recorded in the action log.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The run itself was malformed (blank agent or goal).
    #[error("invalid simulation: {0}")]
    InvalidRun(String),

    /// The planning provider failed.
    #[error("planner failed: {0}")]
    Planner(#[from] ProviderError),

    /// A council evaluation failed outright.
    #[error(transparent)]
    Council(#[from] CouncilError),

    /// The caller cancelled the run.
    #[error("simulation cancelled")]
    Cancelled,
}

impl SimulationError {
    /// True when the caller sent something unusable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRun(_) | Self::Council(CouncilError::InvalidRequest(_))
        )
    }
}
