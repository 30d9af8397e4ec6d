//! Configuration types for Quorum.
//!
//! Every section is optional in a config file; missing sections and
//! fields take their defaults.
//!
//! ```toml
//! [council]
//! role_timeout_ms = 30000
//! majority_margin = 1
//! risk_ceiling = 7.0
//!
//! [council.models]
//! cfo = "anthropic/claude-sonnet-4-20250514"
//!
//! [simulation]
//! max_actions = 10
//! default_budget = 5000
//!
//! [evaluation]
//! default_budget_remaining = 10000
//!
//! [history]
//! capacity = 100
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use quorum_council::{ConsensusPolicy, Role, DEFAULT_BUDGET_REMAINING};
use quorum_sim::DEFAULT_MAX_ACTIONS;
use serde::{Deserialize, Serialize};

use crate::error::QuorumError;
use crate::Result;

/// Configuration for the Quorum facade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumConfig {
    /// Panel and approval policy.
    pub council: CouncilConfig,

    /// Simulation runs.
    pub simulation: SimulationConfig,

    /// Standalone evaluations.
    pub evaluation: EvaluationConfig,

    /// Retained results.
    pub history: HistoryConfig,
}

/// Panel and approval policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilConfig {
    /// Per-role judgment timeout in milliseconds.
    pub role_timeout_ms: u64,

    /// Minimum yes−no gap required for approval.
    pub majority_margin: u32,

    /// Maximum tolerated average risk when any role votes NO.
    pub risk_ceiling: f64,

    /// Model overrides keyed by role (`cfo`, `growth`, `risk`,
    /// `operations`, `data`).
    pub models: BTreeMap<String, String>,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        let policy = ConsensusPolicy::default();
        Self {
            role_timeout_ms: 30_000,
            majority_margin: policy.majority_margin,
            risk_ceiling: policy.risk_ceiling,
            models: BTreeMap::new(),
        }
    }
}

impl CouncilConfig {
    /// The per-role timeout.
    pub fn role_timeout(&self) -> Duration {
        Duration::from_millis(self.role_timeout_ms)
    }

    /// The approval policy described by this section.
    ///
    /// # Errors
    ///
    /// [`QuorumError::Config`] if the margin or ceiling is out of range.
    pub fn policy(&self) -> Result<ConsensusPolicy> {
        ConsensusPolicy::new(self.majority_margin, self.risk_ceiling)
            .map_err(|e| QuorumError::Config(e.to_string()))
    }

    /// Model overrides resolved to roles.
    ///
    /// # Errors
    ///
    /// [`QuorumError::Config`] for a key that names no role.
    pub fn role_models(&self) -> Result<BTreeMap<Role, String>> {
        self.models
            .iter()
            .map(|(key, model)| {
                Role::from_key(key)
                    .map(|role| (role, model.clone()))
                    .ok_or_else(|| QuorumError::Config(format!("unknown role in council.models: {}", key)))
            })
            .collect()
    }
}

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum actions attempted per run.
    pub max_actions: usize,

    /// Budget used when a simulate request gives none.
    pub default_budget: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_actions: DEFAULT_MAX_ACTIONS,
            default_budget: 5_000,
        }
    }
}

/// Standalone evaluation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Remaining budget assumed when an evaluate request gives none.
    pub default_budget_remaining: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            default_budget_remaining: DEFAULT_BUDGET_REMAINING,
        }
    }
}

/// Result history configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Records kept per list; the oldest are evicted first.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl QuorumConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// [`QuorumError::Config`] if the document does not parse or fails
    /// [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| QuorumError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`QuorumError::Config`] if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| QuorumError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Checks every value is within range.
    ///
    /// # Errors
    ///
    /// [`QuorumError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.council.role_timeout_ms == 0 {
            return Err(QuorumError::Config(
                "council.role_timeout_ms must be positive".to_string(),
            ));
        }
        self.council.policy()?;
        self.council.role_models()?;

        if self.simulation.max_actions == 0 {
            return Err(QuorumError::Config(
                "simulation.max_actions must be at least 1".to_string(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(QuorumError::Config(
                "history.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
