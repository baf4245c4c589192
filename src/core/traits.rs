//! Store trait seams for the transfer ledger
//!
//! This module defines the trait abstractions that separate the orchestrator
//! from its backing stores. Any storage offering atomic per-key
//! read-modify-write (an in-memory concurrent map, a transactional database
//! row, a distributed key-value store) can stand behind these traits without
//! changing the orchestrator.
//!
//! All methods are `async`: reaching a backing store is a suspension point,
//! and implementations backed by remote storage may block or time out. The
//! in-memory implementations in this crate complete without suspending.

use crate::types::{LedgerError, Transaction, TransactionId, TransactionStatus};

/// Authoritative per-asset balance store
///
/// Operations on the same asset id are linearizable: they take effect in a
/// single total order, and no caller ever observes a negative balance or a
/// lost update. Operations on different assets may run concurrently.
#[allow(async_fn_in_trait)]
pub trait LedgerStore: Send + Sync {
    /// Read the current balance of an asset
    ///
    /// # Errors
    ///
    /// * `AssetNotFound` if the asset is unknown
    async fn get_balance(&self, asset_id: &str) -> Result<u64, LedgerError>;

    /// Atomically debit an asset iff its balance covers the amount
    ///
    /// Returns the balance after the debit. On failure no change is made.
    ///
    /// # Errors
    ///
    /// * `AssetNotFound` if the asset is unknown
    /// * `InsufficientFunds` if the balance is below `amount`
    async fn try_debit(&self, asset_id: &str, amount: u64) -> Result<u64, LedgerError>;

    /// Atomically credit an asset
    ///
    /// Returns the balance after the credit.
    ///
    /// # Errors
    ///
    /// * `AssetNotFound` if the asset is unknown
    /// * `ArithmeticOverflow` if the credit would overflow the balance
    async fn credit(&self, asset_id: &str, amount: u64) -> Result<u64, LedgerError>;
}

/// Append-only record of submitted transactions, keyed by idempotency key
///
/// Read-after-write consistency is required: once `append` or `mark_terminal`
/// returns success, a subsequent `lookup` by any caller observes the update.
#[allow(async_fn_in_trait)]
pub trait TransactionLog: Send + Sync {
    /// Find the transaction recorded under an idempotency key
    async fn lookup(&self, idempotency_key: &str) -> Result<Option<Transaction>, LedgerError>;

    /// Persist a new `PENDING` record
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` if the idempotency key is already recorded
    async fn append(&self, transaction: Transaction) -> Result<(), LedgerError>;

    /// Transition a `PENDING` record to a terminal state, exactly once
    ///
    /// Stamps the completion timestamp and returns the updated record.
    ///
    /// # Errors
    ///
    /// * `TransactionNotFound` if no record exists for the id
    /// * `InvalidTransition` if the record is already terminal, or if the
    ///   requested status is not terminal
    async fn mark_terminal(
        &self,
        transaction_id: TransactionId,
        status: TransactionStatus,
        reason: Option<String>,
        balance_after: Option<u64>,
    ) -> Result<Transaction, LedgerError>;
}
