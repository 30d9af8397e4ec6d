//! # Result History
//!
//! Keeps the results produced by a [`Quorum`](crate::Quorum) instance
//! for the listing operations.
//!
//! ## Eviction
//!
//! Each list is bounded. When a list is full, recording a new result
//! evicts the oldest one. Listings return the most recent first.
//!
//! The store is a trait so a persistent backend can replace the
//! in-memory one; this crate ships only [`InMemoryHistory`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use quorum_council::ConsensusResult;
use quorum_sim::SimulationResult;
use tracing::debug;

/// Storage for produced results.
pub trait HistoryStore: Send + Sync {
    /// Records a standalone evaluation.
    fn record_evaluation(&self, result: ConsensusResult);

    /// Records a finished simulation.
    fn record_simulation(&self, result: SimulationResult);

    /// Evaluations, most recent first.
    fn evaluations(&self) -> Vec<ConsensusResult>;

    /// Simulations, most recent first.
    fn simulations(&self) -> Vec<SimulationResult>;
}

/// A bounded list, newest at the front.
#[derive(Debug)]
struct BoundedLog<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T: Clone> BoundedLog<T> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Inserts at the front. Returns true if an entry was evicted.
    fn push(&mut self, entry: T) -> bool {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
            true
        } else {
            false
        }
    }

    fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

/// Process-local history, lost on restart.
///
/// # Example
///
/// ```rust,ignore
/// let history = InMemoryHistory::new(2);
/// history.record_simulation(first);
/// history.record_simulation(second);
/// history.record_simulation(third); // evicts `first`
///
/// assert_eq!(history.simulations()[0].agent, third_agent);
/// ```
#[derive(Debug)]
pub struct InMemoryHistory {
    evaluations: Mutex<BoundedLog<ConsensusResult>>,
    simulations: Mutex<BoundedLog<SimulationResult>>,
}

impl InMemoryHistory {
    /// Creates a store keeping at most `capacity` results per list.
    pub fn new(capacity: usize) -> Self {
        Self {
            evaluations: Mutex::new(BoundedLog::new(capacity)),
            simulations: Mutex::new(BoundedLog::new(capacity)),
        }
    }

    /// Records kept per list.
    pub fn capacity(&self) -> usize {
        lock(&self.evaluations).capacity
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HistoryStore for InMemoryHistory {
    fn record_evaluation(&self, result: ConsensusResult) {
        if lock(&self.evaluations).push(result) {
            debug!("evaluation history full, oldest evicted");
        }
    }

    fn record_simulation(&self, result: SimulationResult) {
        if lock(&self.simulations).push(result) {
            debug!("simulation history full, oldest evicted");
        }
    }

    fn evaluations(&self) -> Vec<ConsensusResult> {
        lock(&self.evaluations).to_vec()
    }

    fn simulations(&self) -> Vec<SimulationResult> {
        lock(&self.simulations).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_sim::ConcludedBy;

    fn simulation(agent: &str) -> SimulationResult {
        SimulationResult {
            agent: agent.to_string(),
            goal: "goal".to_string(),
            reasoning: None,
            actions_taken: Vec::new(),
            total_spent: 0,
            budget_remaining: 100,
            concluded_by: ConcludedBy::PlannerStopped,
        }
    }

    #[test]
    fn test_most_recent_first() {
        let history = InMemoryHistory::new(10);
        history.record_simulation(simulation("a"));
        history.record_simulation(simulation("b"));

        let agents: Vec<String> = history.simulations().into_iter().map(|s| s.agent).collect();
        assert_eq!(agents, ["b", "a"]);
        assert!(history.evaluations().is_empty());
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let history = InMemoryHistory::new(2);
        for agent in ["a", "b", "c"] {
            history.record_simulation(simulation(agent));
        }

        let agents: Vec<String> = history.simulations().into_iter().map(|s| s.agent).collect();
        assert_eq!(agents, ["c", "b"]);
        assert_eq!(history.capacity(), 2);
    }

    #[test]
    fn test_bounded_log_reports_eviction() {
        let mut log = BoundedLog::new(1);
        assert!(!log.push(1));
        assert!(log.push(2));
        assert_eq!(log.to_vec(), [2]);
    }
}
