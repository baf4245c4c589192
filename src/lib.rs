//! Transfer Ledger Library
//! # Overview
//!
//! This library provides a concurrent single-asset balance-transfer ledger
//! with atomic debit/credit, idempotent transaction submission, and an
//! append-only transaction history.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Asset, TransferRequest, Transaction, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::orchestrator`] - Transfer settlement orchestration
//!   - [`core::ledger_store`] - Authoritative per-asset balances
//!   - [`core::transaction_log`] - Idempotency and audit records
//!   - [`core::traits`] - Store trait seams for pluggable backends
//!
//! # Transfer Lifecycle
//!
//! A submission creates a `PENDING` transaction which settles exactly once to
//! one of three terminal states:
//!
//! - **Committed**: The source was debited (and the destination credited, for
//!   two-party transfers)
//! - **Rejected**: The source balance did not cover the amount: a normal
//!   business outcome, the balance is unchanged
//! - **Failed**: Validation or a backing store failed; a debit stranded by a
//!   failed destination credit is compensated back to the source
//!
//! # Idempotency
//!
//! Every request carries a client-supplied idempotency key. Resubmitting a
//! settled key replays the stored result without re-executing; a key whose
//! first submission is still in flight fails with `Conflict` rather than
//! being silently merged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use transfer_ledger::{
//!     InMemoryLedgerStore, InMemoryTransactionLog, TransactionStatus, TransferOrchestrator,
//!     TransferRequest,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ledger = Arc::new(InMemoryLedgerStore::new());
//! ledger.open_asset("gold", 100);
//! let log = Arc::new(InMemoryTransactionLog::new());
//! let orchestrator = TransferOrchestrator::new(ledger, log);
//!
//! let result = orchestrator
//!     .submit(TransferRequest::new("k1", "gold", 30))
//!     .await
//!     .unwrap();
//! assert_eq!(result.status, TransactionStatus::Committed);
//! assert_eq!(result.balance_after, Some(70));
//! # }
//! ```

// Module declarations
pub mod core;
pub mod types;

pub use core::{
    InMemoryLedgerStore, InMemoryTransactionLog, LedgerStore, RetryPolicy, TransactionLog,
    TransferOrchestrator,
};
pub use types::{
    Asset, AssetId, LedgerError, Transaction, TransactionId, TransactionStatus, TransferRequest,
    TransferResult,
};
