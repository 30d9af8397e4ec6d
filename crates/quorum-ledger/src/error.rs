//! Error types for budget ledger operations.

use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised by a [`BudgetLedger`](crate::BudgetLedger).
///
/// An insufficient budget is an expected outcome for callers: it turns
/// into a denied action, never an error response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The amount does not fit in what is left after open holds.
    #[error("insufficient budget: requested {requested}, only {available} available")]
    InsufficientBudget {
        /// Amount the caller tried to reserve
        requested: u64,
        /// Remaining balance minus open holds
        available: u64,
    },

    /// Reservations must be for a positive amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
