//! Property tests for the concurrency contracts
//!
//! Random concurrent interleavings of debits, credits, and full transfer
//! submissions, checking the invariants that must hold at every observable
//! point:
//!
//! - No lost updates: the final balance accounts for exactly the operations
//!   that reported success.
//! - No overdraw: a debit only ever succeeds against a covering balance
//!   (negative balances are unrepresentable, so overdraw would surface as a
//!   wrapped or lost update).
//! - Conservation: two-leg transfers never create or destroy funds, whatever
//!   mix of commits and rejections the interleaving produces.
//!
//! Each case spins up a multi-threaded runtime so the interleavings are real
//! parallel executions, not cooperative scheduling on one thread.

use std::sync::Arc;

use proptest::prelude::*;
use transfer_ledger::{
    InMemoryLedgerStore, InMemoryTransactionLog, LedgerStore, TransferOrchestrator,
    TransferRequest,
};

const ASSETS: [&str; 3] = ["gold", "silver", "copper"];
const OPENING_BALANCE: u64 = 1_000;

fn multi_thread_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_time()
        .build()
        .expect("runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn concurrent_debits_and_credits_lose_no_updates(
        ops in proptest::collection::vec((any::<bool>(), 1u64..50), 1..40)
    ) {
        let rt = multi_thread_runtime();
        rt.block_on(async move {
            let store = Arc::new(InMemoryLedgerStore::new());
            store.open_asset("gold", OPENING_BALANCE);

            let mut handles = Vec::new();
            for (is_debit, amount) in ops {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    if is_debit {
                        store.try_debit("gold", amount).await.ok().map(|_| (amount, 0))
                    } else {
                        store.credit("gold", amount).await.ok().map(|_| (0, amount))
                    }
                }));
            }

            let mut debited = 0u64;
            let mut credited = 0u64;
            for outcome in futures::future::join_all(handles).await {
                if let Some((debit, credit)) = outcome.unwrap() {
                    debited += debit;
                    credited += credit;
                }
            }

            let balance = store.get_balance("gold").await.unwrap();
            // Successful operations account exactly for the final balance;
            // debited never exceeds what the balance could cover.
            assert_eq!(balance, OPENING_BALANCE + credited - debited);
            assert!(debited <= OPENING_BALANCE + credited);
        });
    }

    #[test]
    fn concurrent_two_leg_transfers_conserve_total(
        ops in proptest::collection::vec((0usize..3, 0usize..3, 1u64..100), 1..32)
    ) {
        let rt = multi_thread_runtime();
        rt.block_on(async move {
            let ledger = Arc::new(InMemoryLedgerStore::new());
            for asset in ASSETS {
                ledger.open_asset(asset, OPENING_BALANCE);
            }
            let log = Arc::new(InMemoryTransactionLog::new());
            let orchestrator =
                Arc::new(TransferOrchestrator::new(Arc::clone(&ledger), log));

            let mut handles = Vec::new();
            for (i, (source, destination, amount)) in ops.into_iter().enumerate() {
                let orchestrator = Arc::clone(&orchestrator);
                handles.push(tokio::spawn(async move {
                    let request = TransferRequest::new(
                        format!("key-{i}"),
                        ASSETS[source],
                        amount,
                    )
                    .to(ASSETS[destination]);
                    orchestrator.submit(request).await
                }));
            }
            // Keys are unique, so every submission settles terminally.
            for outcome in futures::future::join_all(handles).await {
                outcome.unwrap().unwrap();
            }

            let total: u64 = ledger.assets().iter().map(|a| a.balance).sum();
            assert_eq!(total, OPENING_BALANCE * ASSETS.len() as u64);
        });
    }
}
