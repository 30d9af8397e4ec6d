//! Unit tests for quorum-core.

#[test]
fn test_crate_structure() {
    use crate::{ApiResponse, HealthStatus, QuorumConfig, SimulateRequest};

    let config = QuorumConfig::default();
    assert!(config.validate().is_ok());

    let response = ApiResponse::ok(HealthStatus::healthy("up"));
    assert!(response.success);

    let request = SimulateRequest::new("Agent", "Goal").with_budget(config.simulation.default_budget);
    assert_eq!(request.budget, Some(5_000));
}
