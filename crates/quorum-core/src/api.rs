//! Request and response shapes exchanged with clients.
//!
//! Every operation answers with an [`ApiResponse`] envelope:
//!
//! ```text
//! { "success": true,  "result": { ... } }
//! { "success": false, "error": "Validation error: goal is required" }
//! ```

use quorum_council::{PurchaseRequest, Urgency};
use serde::{Deserialize, Serialize};

use crate::error::QuorumError;

/// A standalone purchase evaluation request.
///
/// Unlike [`PurchaseRequest`], the optional fields stay optional here so
/// configured defaults can fill them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// Requested spend.
    pub amount: u64,
    /// What the money buys.
    pub purpose: String,
    /// Agent asking for the spend.
    pub requesting_agent: String,
    /// Case for the spend.
    #[serde(default)]
    pub justification: String,
    /// Expected return; empty when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_roi: Option<String>,
    /// Defaults to Medium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    /// Informational balance; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_remaining: Option<u64>,
}

impl EvaluateRequest {
    /// Builds the purchase request, filling gaps with defaults.
    pub fn into_purchase_request(self, default_budget_remaining: u64) -> PurchaseRequest {
        let mut request = PurchaseRequest::new(
            self.amount,
            self.purpose,
            self.requesting_agent,
            self.justification,
        )
        .with_urgency(self.urgency.unwrap_or_default())
        .with_budget_remaining(self.budget_remaining.unwrap_or(default_budget_remaining));

        if let Some(roi) = self.expected_roi.filter(|roi| !roi.trim().is_empty()) {
            request = request.with_expected_roi(roi);
        }
        request
    }
}

impl From<PurchaseRequest> for EvaluateRequest {
    fn from(request: PurchaseRequest) -> Self {
        Self {
            amount: request.amount,
            purpose: request.purpose,
            requesting_agent: request.requesting_agent,
            justification: request.justification,
            expected_roi: Some(request.expected_roi),
            urgency: Some(request.urgency),
            budget_remaining: Some(request.budget_remaining),
        }
    }
}

/// A simulation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateRequest {
    /// Agent to simulate.
    pub agent_name: String,
    /// What the agent is trying to achieve.
    pub goal: String,
    /// Starting budget; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,
}

impl SimulateRequest {
    /// A request that runs on the configured default budget.
    pub fn new(agent_name: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            goal: goal.into(),
            budget: None,
        }
    }

    /// Sets the starting budget.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = Some(budget);
        self
    }
}

/// The response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the call produced a result.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response.
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// A failed response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T, QuorumError>> for ApiResponse<T> {
    fn from(result: Result<T, QuorumError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` while the service is up.
    pub status: String,
    /// Human-readable detail.
    pub message: String,
}

impl HealthStatus {
    /// A healthy status carrying `message`.
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluate_request_defaults() {
        let request: EvaluateRequest = serde_json::from_value(json!({
            "amount": 500,
            "purpose": "API credits",
            "requesting_agent": "Support Agent"
        }))
        .unwrap();

        let purchase = request.into_purchase_request(10_000);
        assert_eq!(purchase.budget_remaining, 10_000);
        assert_eq!(purchase.urgency, Urgency::Medium);
        assert_eq!(purchase.expected_roi, "Not specified");
        assert_eq!(purchase.justification, "");
    }

    #[test]
    fn test_evaluate_request_full() {
        let request: EvaluateRequest = serde_json::from_value(json!({
            "amount": 2000,
            "purpose": "Claude API Enterprise plan",
            "requesting_agent": "Product Agent",
            "justification": "New feature",
            "expected_roi": "10x",
            "urgency": "High",
            "budget_remaining": 5000
        }))
        .unwrap();

        let purchase = request.into_purchase_request(10_000);
        assert_eq!(purchase.budget_remaining, 5000);
        assert_eq!(purchase.urgency, Urgency::High);
        assert_eq!(purchase.expected_roi, "10x");
    }

    #[test]
    fn test_negative_amount_does_not_parse() {
        let parsed = serde_json::from_value::<EvaluateRequest>(json!({
            "amount": -5,
            "purpose": "x",
            "requesting_agent": "y"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(ApiResponse::ok(3)).unwrap();
        assert_eq!(ok, json!({"success": true, "result": 3}));

        let failed: ApiResponse<u32> = Err(QuorumError::Validation("goal is required".into())).into();
        let json = serde_json::to_value(failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Validation error: goal is required");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_simulate_request_budget_optional() {
        let request: SimulateRequest =
            serde_json::from_value(json!({"agent_name": "A", "goal": "G"})).unwrap();
        assert_eq!(request, SimulateRequest::new("A", "G"));
        assert_eq!(request.with_budget(10).budget, Some(10));
    }
}
