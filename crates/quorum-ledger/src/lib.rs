//! # Budget Ledger
//!
//! Per-scope budget accounting for purchase decisions: no spend happens
//! without a reservation, and no reservation outlives its decision.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`BudgetLedger`] | One scope's balance, serialized behind a mutex |
//! | [`Reservation`] | A hold resolved exactly once by commit or release |
//! | [`ScopeKind`] | Advisory (standalone evaluation) or authoritative (simulation) |
//!
//! ## Quick Start
//!
//! ```rust
//! use quorum_ledger::BudgetLedger;
//!
//! let ledger = BudgetLedger::authoritative(1000);
//!
//! // Hold the amount before asking the council
//! let hold = ledger.reserve(400)?;
//!
//! // ... council approves ...
//! hold.commit();
//!
//! assert_eq!(ledger.remaining(), 600);
//! # Ok::<(), quorum_ledger::LedgerError>(())
//! ```
//!
//! ## Guarantees
//!
//! - A failed reservation leaves the balance untouched
//! - Commit debits exactly the reserved amount; release debits nothing
//! - Concurrent reservations never overspend the scope
//! - Dropping an unresolved reservation releases it

mod error;
mod ledger;
mod reservation;

pub use error::{LedgerError, Result};
pub use ledger::{BudgetLedger, LedgerSnapshot, ScopeKind};
pub use reservation::Reservation;
