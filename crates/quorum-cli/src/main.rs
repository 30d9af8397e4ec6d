//! Quorum CLI - Council-gated purchase decisions from the command line

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use quorum_core::{
    ApiResponse, EvaluateRequest, HeuristicProvider, Quorum, QuorumConfig, SimulateRequest,
};
use quorum_council::{PurchaseRequest, Urgency};
use quorum_sim::{parse_plan, ScriptedPlanner};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quorum")]
#[command(about = "Quorum - Five-agent consensus for autonomous purchases")]
struct Cli {
    /// Configuration file path (defaults apply when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Evaluate a purchase request read from a JSON file
    Evaluate {
        /// Request file
        #[arg(short, long)]
        request: PathBuf,
    },
    /// Run an agent simulation
    Simulate {
        /// Agent name
        #[arg(short, long)]
        agent: String,
        /// What the agent is trying to achieve
        #[arg(short, long)]
        goal: String,
        /// Starting budget
        #[arg(short, long)]
        budget: Option<u64>,
        /// Planner reply to replay (JSON plan, or free text)
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },
    /// Check configuration validity
    Check,
    /// Evaluate the reference purchase scenarios
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Evaluate { request }) => {
            let text = std::fs::read_to_string(&request)
                .with_context(|| format!("reading {}", request.display()))?;
            let request: EvaluateRequest = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", request.display()))?;

            let quorum = heuristic_quorum(config)?;
            print_json(&ApiResponse::from(quorum.evaluate(request).await))?;
        }
        Some(Commands::Simulate {
            agent,
            goal,
            budget,
            plan,
        }) => {
            let mut quorum = heuristic_quorum(config)?;
            if let Some(path) = plan {
                let reply = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                quorum = quorum.with_planner(Arc::new(ScriptedPlanner::new(parse_plan(&reply))));
            }

            let mut request = SimulateRequest::new(agent, goal);
            request.budget = budget;
            print_json(&ApiResponse::from(quorum.simulate(request).await))?;
        }
        Some(Commands::Check) => {
            // Building the facade resolves the policy and model overrides too.
            heuristic_quorum(config)?;
            println!("Configuration OK");
        }
        Some(Commands::Demo) => {
            let quorum = heuristic_quorum(config)?;
            let mut results = Vec::new();
            for (name, request) in reference_scenarios() {
                info!("Running scenario: {}", name);
                results.push(quorum.evaluate(request.into()).await?);
            }
            print_json(&ApiResponse::ok(results))?;
        }
        None => {
            println!("Quorum v{} - Use --help for commands", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<QuorumConfig> {
    match path {
        Some(path) => QuorumConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(QuorumConfig::default()),
    }
}

fn heuristic_quorum(config: QuorumConfig) -> anyhow::Result<Quorum> {
    Ok(Quorum::new(config, Arc::new(HeuristicProvider::new()))?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn reference_scenarios() -> [(&'static str, PurchaseRequest); 3] {
    [
        (
            "AI chatbot credits",
            PurchaseRequest::new(
                500,
                "OpenAI API credits for customer support chatbot",
                "Customer Service Agent",
                "Our support tickets have increased 300% this month. An AI chatbot could handle \
                 70% of common questions, reducing response time from 4 hours to instant.",
            )
            .with_expected_roi(
                "Save $3,000/month in support costs, improve customer satisfaction scores",
            )
            .with_urgency(Urgency::High),
        ),
        (
            "Premium chat workspace",
            PurchaseRequest::new(
                5000,
                "Premium Slack workspace with all add-ons",
                "Internal Comms Agent",
                "Team communication could be better. Premium features include better search and \
                 more integrations.",
            )
            .with_expected_roi("Improved team communication")
            .with_urgency(Urgency::Low),
        ),
        (
            "Enterprise model access",
            PurchaseRequest::new(
                2000,
                "Anthropic Claude API Enterprise plan",
                "Product Development Agent",
                "Need advanced AI capabilities for new product feature that competitors don't \
                 have. Early access to latest models could give us 6-month competitive advantage.",
            )
            .with_expected_roi("Potential $50K+ in new customer revenue if feature succeeds"),
        ),
    ]
}
