//! Purchase requests submitted to the panel.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CouncilError;
use crate::Result;

/// Budget assumed when a caller does not say how much is left.
pub const DEFAULT_BUDGET_REMAINING: u64 = 10_000;

/// How pressing a purchase is, as stated by the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Urgency {
    /// Can wait.
    Low,
    /// Default when unspecified.
    #[default]
    Medium,
    /// Needed now.
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Low => write!(f, "Low"),
            Urgency::Medium => write!(f, "Medium"),
            Urgency::High => write!(f, "High"),
        }
    }
}

/// A request to spend money, evaluated by the five-role panel.
///
/// Immutable once handed to the council: the collector shares it
/// across role tasks behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Amount requested, in whole currency units.
    pub amount: u64,
    /// What the money is for.
    pub purpose: String,
    /// Identity of the agent asking.
    pub requesting_agent: String,
    /// Why the purchase is needed.
    pub justification: String,
    /// Expected return, free text.
    #[serde(default = "default_expected_roi")]
    pub expected_roi: String,
    /// Requester-declared urgency.
    #[serde(default)]
    pub urgency: Urgency,
    /// Budget left in the requester's scope. Context for the panel only.
    #[serde(default = "default_budget_remaining")]
    pub budget_remaining: u64,
}

fn default_expected_roi() -> String {
    "Not specified".to_string()
}

fn default_budget_remaining() -> u64 {
    DEFAULT_BUDGET_REMAINING
}

impl PurchaseRequest {
    /// Creates a request with default ROI, urgency and remaining budget.
    pub fn new(
        amount: u64,
        purpose: impl Into<String>,
        requesting_agent: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            purpose: purpose.into(),
            requesting_agent: requesting_agent.into(),
            justification: justification.into(),
            expected_roi: default_expected_roi(),
            urgency: Urgency::default(),
            budget_remaining: DEFAULT_BUDGET_REMAINING,
        }
    }

    /// Sets the expected return.
    pub fn with_expected_roi(mut self, roi: impl Into<String>) -> Self {
        self.expected_roi = roi.into();
        self
    }

    /// Sets the urgency.
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Sets the remaining budget context.
    pub fn with_budget_remaining(mut self, budget_remaining: u64) -> Self {
        self.budget_remaining = budget_remaining;
        self
    }

    /// Checks the fields the panel cannot work without.
    ///
    /// # Errors
    ///
    /// [`CouncilError::InvalidRequest`] when the amount is zero or a
    /// required text field is blank.
    pub fn validate(&self) -> Result<()> {
        if self.amount == 0 {
            return Err(CouncilError::InvalidRequest(
                "amount must be positive".to_string(),
            ));
        }
        if self.purpose.trim().is_empty() {
            return Err(CouncilError::InvalidRequest(
                "purpose is required".to_string(),
            ));
        }
        if self.requesting_agent.trim().is_empty() {
            return Err(CouncilError::InvalidRequest(
                "requesting_agent is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Share of the remaining budget this request would consume.
    ///
    /// Returns `f64::INFINITY` when nothing is left.
    pub fn budget_share(&self) -> f64 {
        if self.budget_remaining == 0 {
            f64::INFINITY
        } else {
            self.amount as f64 / self.budget_remaining as f64
        }
    }
}
