//! # Integration Tests
//!
//! Ledger behavior under concurrent use of one scope.

use std::sync::{Arc, Barrier};
use std::thread;

use quorum_ledger::{BudgetLedger, LedgerError};

#[test]
fn test_concurrent_reservations_never_overspend() {
    let ledger = BudgetLedger::authoritative(1000);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = ledger.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                match ledger.reserve(300) {
                    Ok(hold) => {
                        hold.commit();
                        true
                    }
                    Err(LedgerError::InsufficientBudget { .. }) => false,
                    Err(other) => panic!("unexpected error: {other}"),
                }
            })
        })
        .collect();

    let committed = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    // Only the prefix that fits: 3 × 300 ≤ 1000 < 4 × 300
    assert_eq!(committed, 3);
    assert_eq!(ledger.remaining(), 100);
    assert_eq!(ledger.spent() + ledger.remaining(), 1000);
    assert_eq!(ledger.held(), 0);
}

#[test]
fn test_concurrent_mixed_commit_and_release() {
    let ledger = BudgetLedger::authoritative(10_000);

    let handles: Vec<_> = (0..16u64)
        .map(|i| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    if let Ok(hold) = ledger.reserve(7) {
                        if i % 2 == 0 {
                            hold.commit();
                        } else {
                            hold.release();
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = ledger.snapshot();
    assert_eq!(snapshot.held, 0);
    assert_eq!(snapshot.commits + snapshot.releases, 16 * 50);
    assert_eq!(snapshot.spent(), snapshot.commits * 7);
    assert_eq!(snapshot.spent() + snapshot.remaining, 10_000);
}

#[test]
fn test_sequential_purchases_until_short() {
    // Three purchases of 400 against 1000: the third cannot be held.
    let ledger = BudgetLedger::authoritative(1000);
    let mut outcomes = Vec::new();

    for _ in 0..3 {
        match ledger.reserve(400) {
            Ok(hold) => {
                hold.commit();
                outcomes.push("committed");
            }
            Err(LedgerError::InsufficientBudget { available, .. }) => {
                assert_eq!(available, 200);
                outcomes.push("insufficient budget");
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(outcomes, ["committed", "committed", "insufficient budget"]);
    assert_eq!(ledger.spent(), 800);
    assert_eq!(ledger.remaining(), 200);
}

#[test]
fn test_holds_dropped_by_panicking_thread_are_released() {
    let ledger = BudgetLedger::authoritative(500);

    let worker = {
        let ledger = ledger.clone();
        thread::spawn(move || {
            let _hold = ledger.reserve(500).unwrap();
            panic!("worker died mid-decision");
        })
    };
    assert!(worker.join().is_err());

    assert_eq!(ledger.held(), 0);
    assert_eq!(ledger.remaining(), 500);
    ledger.reserve(500).unwrap().commit();
    assert!(ledger.is_exhausted());
}
