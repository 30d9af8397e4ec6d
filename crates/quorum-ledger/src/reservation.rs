//! Provisional holds against a ledger scope.

use std::fmt;

use uuid::Uuid;

use crate::ledger::BudgetLedger;

/// A hold on part of a scope's balance.
///
/// Resolved exactly once: [`commit`](Self::commit) and
/// [`release`](Self::release) consume the reservation, so a second
/// resolution does not type-check. A reservation dropped without being
/// resolved (an early return, a cancelled future) is released.
#[must_use = "a reservation must be committed or released"]
pub struct Reservation {
    id: Uuid,
    amount: u64,
    ledger: BudgetLedger,
    resolved: bool,
}

impl Reservation {
    pub(crate) fn new(id: Uuid, amount: u64, ledger: BudgetLedger) -> Self {
        Self {
            id,
            amount,
            ledger,
            resolved: false,
        }
    }

    /// Unique id, for logs.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The amount held.
    #[inline]
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Debits the held amount. Returns the scope's remaining balance.
    pub fn commit(mut self) -> u64 {
        self.resolved = true;
        self.ledger.settle(self.id, self.amount, true)
    }

    /// Drops the hold without debiting. Returns the remaining balance.
    pub fn release(mut self) -> u64 {
        self.resolved = true;
        self.ledger.settle(self.id, self.amount, false)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.resolved {
            self.ledger.settle(self.id, self.amount, false);
        }
    }
}

impl fmt::Debug for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservation")
            .field("id", &self.id)
            .field("amount", &self.amount)
            .field("kind", &self.ledger.kind())
            .finish()
    }
}
