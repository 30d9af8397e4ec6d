//! # Agent Simulation
//!
//! Autonomous agents spending a fixed budget, one council-approved
//! action at a time.
//!
//! ## Flow
//!
//! ```text
//!  Planner ──► PlannedAction ──► BudgetLedger::reserve ──► Council::evaluate
//!     ▲                                 │ short                 │
//!     │                                 ▼                       ▼
//!     └──────────── action log ◄── denied action ◄──── commit / release
//! ```
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`SimulationRunner`] | The Planning → Acting → Concluded loop |
//! | [`Planner`] | Next-action capability (scripted or model-backed) |
//! | [`parse_plan`] | Reads planner replies |
//! | [`SimulationResult`] | Final, immutable outcome of a run |
//!
//! ## Guarantees
//!
//! - `total_spent + budget_remaining` equals the starting budget
//! - An action that cannot be reserved never reaches the panel
//! - Every reservation is committed or released before the next step

mod action;
mod error;
mod planner;
mod runner;

pub use action::{ActionType, ConcludedBy, SimulationAction, SimulationResult};
pub use error::{Result, SimulationError};
pub use planner::{
    parse_plan, render_planning_prompt, ActionKind, Plan, PlanStep, PlannedAction, Planner,
    PlanningContext, PromptedPlanner, ScriptedPlanner, DEFAULT_PLANNER_MODEL,
};
pub use runner::{RunnerState, SimulationRunner, DEFAULT_MAX_ACTIONS};
