//! Core business logic module
//!
//! This module contains the core transfer settlement components:
//! - `traits` - Store trait seams for interchangeable backends
//! - `ledger_store` - Authoritative per-asset balances (in-memory backend)
//! - `transaction_log` - Idempotency and audit records (in-memory backend)
//! - `orchestrator` - Transfer settlement orchestration

pub mod ledger_store;
pub mod orchestrator;
pub mod traits;
pub mod transaction_log;

pub use ledger_store::InMemoryLedgerStore;
pub use orchestrator::{RetryPolicy, TransferOrchestrator};
pub use traits::{LedgerStore, TransactionLog};
pub use transaction_log::InMemoryTransactionLog;
