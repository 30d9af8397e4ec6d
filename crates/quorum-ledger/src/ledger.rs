//! # Budget Ledger
//!
//! Tracks the remaining budget of one scope and gates every spend
//! behind a reservation.
//!
//! ## Lifecycle
//!
//! ```text
//!   reserve(amount) ──► Reservation ──┬── commit()  → remaining -= amount
//!        │                            └── release() → remaining unchanged
//!        ▼
//!   InsufficientBudget (remaining untouched)
//! ```
//!
//! A reservation is checked against `remaining − held`, so open holds
//! count against the balance even before they are committed. All
//! mutations of one scope go through a single mutex; two concurrent
//! reservations can never both succeed if together they exceed the
//! balance.
//!
//! ## Scope Kinds
//!
//! | Kind | Used for | Reserve | Commit |
//! |------|----------|---------|--------|
//! | [`ScopeKind::Authoritative`] | Simulation runs | Enforced | Debits |
//! | [`ScopeKind::Advisory`] | Standalone evaluations | Never short | No debit |
//!
//! ## Example
//!
//! ```rust
//! use quorum_ledger::BudgetLedger;
//!
//! let ledger = BudgetLedger::authoritative(1000);
//!
//! let hold = ledger.reserve(400)?;
//! assert_eq!(ledger.available(), 600);
//! assert_eq!(ledger.remaining(), 1000);
//!
//! hold.commit();
//! assert_eq!(ledger.remaining(), 600);
//!
//! assert!(ledger.reserve(700).is_err());
//! assert_eq!(ledger.remaining(), 600); // Unchanged on failure
//! # Ok::<(), quorum_ledger::LedgerError>(())
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::reservation::Reservation;

/// Whether a scope's balance is enforced and debited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Balance is informational. Reservations always succeed and
    /// commits leave the balance alone.
    Advisory,
    /// Balance is enforced and debited on commit.
    Authoritative,
}

/// Point-in-time view of a ledger scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Scope kind
    pub kind: ScopeKind,
    /// Budget the scope was opened with
    pub initial: u64,
    /// Balance after commits
    pub remaining: u64,
    /// Sum of open reservations
    pub held: u64,
    /// Reservations committed so far
    pub commits: u64,
    /// Reservations released so far
    pub releases: u64,
}

impl LedgerSnapshot {
    /// Total debited from the scope.
    #[must_use]
    pub const fn spent(&self) -> u64 {
        self.initial - self.remaining
    }
}

#[derive(Debug)]
struct LedgerState {
    initial: u64,
    remaining: u64,
    held: u64,
    commits: u64,
    releases: u64,
}

/// A budget scope with reserve/commit/release semantics.
///
/// Cloning yields another handle onto the same scope. The ledger is
/// `Send + Sync`; every operation is synchronous and holds the scope's
/// lock only for the duration of the balance update.
///
/// # Invariants
///
/// - `held ≤ remaining ≤ initial` (authoritative scopes)
/// - `spent + remaining == initial`
/// - Every reservation is resolved exactly once
#[derive(Debug, Clone)]
pub struct BudgetLedger {
    kind: ScopeKind,
    state: Arc<Mutex<LedgerState>>,
}

impl BudgetLedger {
    /// Opens an enforced scope with `initial` budget.
    #[must_use]
    pub fn authoritative(initial: u64) -> Self {
        Self::open(ScopeKind::Authoritative, initial)
    }

    /// Opens an informational scope whose balance is never debited.
    ///
    /// # Arguments
    ///
    /// * `budget_remaining` - The caller-supplied figure, kept for reporting
    #[must_use]
    pub fn advisory(budget_remaining: u64) -> Self {
        Self::open(ScopeKind::Advisory, budget_remaining)
    }

    fn open(kind: ScopeKind, initial: u64) -> Self {
        debug!(?kind, initial, "ledger scope opened");
        Self {
            kind,
            state: Arc::new(Mutex::new(LedgerState {
                initial,
                remaining: initial,
                held: 0,
                commits: 0,
                releases: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // The state is updated in single statements; a poisoned lock
        // still holds a consistent balance.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The scope kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Budget the scope was opened with.
    #[must_use]
    pub fn initial(&self) -> u64 {
        self.lock().initial
    }

    /// Balance after commits. Open holds are not subtracted.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.lock().remaining
    }

    /// Sum of open reservations.
    #[must_use]
    pub fn held(&self) -> u64 {
        self.lock().held
    }

    /// What a new reservation may still claim.
    #[must_use]
    pub fn available(&self) -> u64 {
        let state = self.lock();
        state.remaining.saturating_sub(state.held)
    }

    /// Total debited so far.
    #[must_use]
    pub fn spent(&self) -> u64 {
        let state = self.lock();
        state.initial - state.remaining
    }

    /// True once the balance has reached zero.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.lock().remaining == 0
    }

    /// Copies the current counters.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.lock();
        LedgerSnapshot {
            kind: self.kind,
            initial: state.initial,
            remaining: state.remaining,
            held: state.held,
            commits: state.commits,
            releases: state.releases,
        }
    }

    /// Places a hold of `amount` against the scope.
    ///
    /// # Arguments
    ///
    /// * `amount` - Positive amount to hold
    ///
    /// # Returns
    ///
    /// A [`Reservation`] that must be committed or released. Dropping it
    /// unresolved releases the hold.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount` is zero
    /// - [`LedgerError::InsufficientBudget`] if `amount` exceeds
    ///   `remaining − held` on an authoritative scope; the ledger is left
    ///   untouched
    pub fn reserve(&self, amount: u64) -> Result<Reservation> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "reservation amount must be positive".to_string(),
            ));
        }

        if self.kind == ScopeKind::Authoritative {
            let mut state = self.lock();
            let available = state.remaining.saturating_sub(state.held);
            if amount > available {
                debug!(amount, available, "reservation refused");
                return Err(LedgerError::InsufficientBudget {
                    requested: amount,
                    available,
                });
            }
            state.held += amount;
        }

        let reservation = Reservation::new(Uuid::new_v4(), amount, self.clone());
        debug!(id = %reservation.id(), amount, "reservation held");
        Ok(reservation)
    }

    /// Resolves a hold. Returns the balance afterwards.
    pub(crate) fn settle(&self, id: Uuid, amount: u64, commit: bool) -> u64 {
        let mut state = self.lock();

        if self.kind == ScopeKind::Authoritative {
            state.held = state.held.saturating_sub(amount);
            if commit {
                state.remaining = state.remaining.saturating_sub(amount);
            }
        }

        if commit {
            state.commits += 1;
            info!(%id, amount, remaining = state.remaining, "reservation committed");
        } else {
            state.releases += 1;
            debug!(%id, amount, remaining = state.remaining, "reservation released");
        }

        state.remaining
    }
}
