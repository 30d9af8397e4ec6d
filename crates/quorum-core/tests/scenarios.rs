//! # Reference Scenarios
//!
//! The reference purchase requests and agent simulations, run through
//! the offline heuristic panel.
//!
//! 1. **Clear win**: chatbot credits with quantified savings
//! 2. **Vague spend**: premium chat workspace, no evidence
//! 3. **Concurrent agents**: three agents spending independent budgets

use std::sync::Arc;

use quorum_core::{EvaluateRequest, HeuristicProvider, Quorum, QuorumConfig, SimulateRequest};
use quorum_council::{PurchaseRequest, Urgency, Vote};
use quorum_sim::{parse_plan, ConcludedBy, ScriptedPlanner};

fn heuristic_quorum() -> Quorum {
    Quorum::new(QuorumConfig::default(), Arc::new(HeuristicProvider::new())).unwrap()
}

fn chatbot() -> EvaluateRequest {
    PurchaseRequest::new(
        500,
        "OpenAI API credits for customer support chatbot",
        "Customer Service Agent",
        "Our support tickets have increased 300% this month. An AI chatbot could handle 70% of \
         common questions, reducing response time from 4 hours to instant.",
    )
    .with_expected_roi("Save $3,000/month in support costs, improve customer satisfaction scores")
    .with_urgency(Urgency::High)
    .with_budget_remaining(10_000)
    .into()
}

fn slack() -> EvaluateRequest {
    PurchaseRequest::new(
        5000,
        "Premium Slack workspace with all add-ons",
        "Internal Comms Agent",
        "Team communication could be better. Premium features include better search and more \
         integrations.",
    )
    .with_expected_roi("Improved team communication")
    .with_urgency(Urgency::Low)
    .with_budget_remaining(10_000)
    .into()
}

// =============================================================================
// STANDALONE EVALUATIONS
// =============================================================================

#[tokio::test]
async fn test_scenario_clear_win_approved() {
    let quorum = heuristic_quorum();
    let result = quorum.evaluate(chatbot()).await.unwrap();

    assert!(result.approved());
    assert_eq!(result.yes_votes(), 5);
    assert!(result
        .agent_votes()
        .iter()
        .all(|vote| vote.vote == Vote::Yes));
}

#[tokio::test]
async fn test_scenario_vague_spend_denied() {
    let quorum = heuristic_quorum();
    let result = quorum.evaluate(slack()).await.unwrap();

    assert!(!result.approved());
    assert_eq!(result.no_votes(), 4);
    assert_eq!(
        result.yes_votes() + result.no_votes() + result.abstain_votes(),
        5
    );
}

#[tokio::test]
async fn test_scenario_evaluation_is_repeatable() {
    let quorum = heuristic_quorum();
    let first = quorum.evaluate(chatbot()).await.unwrap();
    let second = quorum.evaluate(chatbot()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(quorum.evaluations().len(), 2);
}

// =============================================================================
// AGENT SIMULATIONS
// =============================================================================

const MARKETING_PLAN: &str = r#"{
    "reasoning": "Landing page, then paid acquisition",
    "actions": [
        {"type": "HIRE_AGENT", "agent_type": "Design Agent", "amount": 300,
         "task": "Create landing page", "justification": "Need professional design for the launch",
         "expected_roi": "Better conversion rates"},
        {"type": "REQUEST_PURCHASE", "amount": 2000, "purpose": "Paid ad campaign",
         "justification": "Acquire 1000 users within 30 days from targeted search and social ads",
         "expected_roi": "1000 signups at $2 per user"}
    ]
}"#;

const SUPPORT_PLAN: &str = r#"{
    "reasoning": "Automate first-line support",
    "actions": [
        {"type": "REQUEST_PURCHASE", "amount": 1500, "purpose": "AI support chatbot subscription",
         "justification": "Response time is 4 hours; a chatbot can answer 70% of tickets instantly",
         "expected_roi": "Cut response time by 75%", "urgency": "High"},
        {"type": "REQUEST_PURCHASE", "amount": 1500, "purpose": "Second chatbot seat",
         "justification": "Backup", "expected_roi": "Redundancy"}
    ]
}"#;

#[tokio::test]
async fn test_scenario_concurrent_agents_keep_separate_budgets() {
    let base = Quorum::new(QuorumConfig::default(), Arc::new(HeuristicProvider::new())).unwrap();
    let marketing = base.with_planner(Arc::new(ScriptedPlanner::new(parse_plan(MARKETING_PLAN))));
    let support = Quorum::new(QuorumConfig::default(), Arc::new(HeuristicProvider::new()))
        .unwrap()
        .with_planner(Arc::new(ScriptedPlanner::new(parse_plan(SUPPORT_PLAN))));

    let (alpha, gamma) = tokio::join!(
        marketing.simulate(
            SimulateRequest::new(
                "Marketing Agent Alpha",
                "Launch a landing page and ad campaign to acquire 1000 users"
            )
            .with_budget(5000)
        ),
        support.simulate(
            SimulateRequest::new(
                "Customer Success Agent Gamma",
                "Reduce support response time from 4 hours to under 1 hour"
            )
            .with_budget(2000)
        ),
    );

    let alpha = alpha.unwrap();
    assert_eq!(alpha.actions_taken.len(), 2);
    assert_eq!(alpha.total_spent + alpha.budget_remaining, 5000);
    assert_eq!(alpha.concluded_by, ConcludedBy::PlannerStopped);

    let gamma = gamma.unwrap();
    assert_eq!(gamma.total_spent + gamma.budget_remaining, 2000);
    assert!(gamma.total_spent <= 2000);
    // Whatever the first vote, a second 1500 never fits alongside it.
    if gamma.actions_taken[0].approved {
        assert_eq!(
            gamma.actions_taken[1].reason.as_deref(),
            Some("insufficient budget")
        );
    }
}

#[tokio::test]
async fn test_scenario_zero_budget_agent() {
    let quorum = heuristic_quorum()
        .with_planner(Arc::new(ScriptedPlanner::new(parse_plan(MARKETING_PLAN))));
    let result = quorum
        .simulate(SimulateRequest::new("Broke Agent", "Anything").with_budget(0))
        .await
        .unwrap();

    assert!(result.actions_taken.is_empty());
    assert_eq!(result.concluded_by, ConcludedBy::BudgetExhausted);
}
