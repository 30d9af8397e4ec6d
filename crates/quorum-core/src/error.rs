//! Error types for Quorum Core.

use quorum_council::CouncilError;
use quorum_sim::SimulationError;
use thiserror::Error;

/// Core error type for Quorum operations.
#[derive(Debug, Error)]
pub enum QuorumError {
    /// A request field is missing or out of range.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Council error passthrough.
    #[error("Council error: {0}")]
    Council(#[from] CouncilError),

    /// Simulation error passthrough.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

impl QuorumError {
    /// True for failures caused by the caller's input, as opposed to
    /// infrastructure faults.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Council(CouncilError::InvalidRequest(_)) => true,
            Self::Simulation(e) => e.is_user_error(),
            _ => false,
        }
    }
}
