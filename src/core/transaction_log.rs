//! Thread-safe in-memory transaction log
//!
//! This module provides `InMemoryTransactionLog`, the DashMap-backed
//! implementation of the [`TransactionLog`](crate::core::traits::TransactionLog)
//! trait.
//!
//! # Design
//!
//! Records are stored in a `DashMap` keyed by idempotency key; a secondary
//! index maps transaction id back to its key so `mark_terminal` can address
//! records by id. `append` uses the entry API so the existence check and the
//! insert happen under one entry lock, making it a conditional insert. `mark_terminal`
//! validates the transition while holding the record's entry lock, giving the
//! exactly-once terminal transition.
//!
//! # Purpose
//!
//! The log serves replay detection (the orchestrator consults it before
//! executing) and audit: terminal records are immutable and never deleted by
//! the core. Retention and compaction belong to an external collaborator.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::traits::TransactionLog;
use crate::types::{LedgerError, Transaction, TransactionId, TransactionStatus};

/// Thread-safe in-memory transaction log
///
/// # Thread Safety
///
/// All methods take `&self` and are safe to call concurrently. Read-after-write
/// consistency holds: once `append` or `mark_terminal` returns, any caller's
/// `lookup` observes the update.
#[derive(Debug, Default)]
pub struct InMemoryTransactionLog {
    /// Transaction records keyed by idempotency key
    by_key: DashMap<String, Transaction>,

    /// Secondary index: transaction id to idempotency key
    key_of: DashMap<TransactionId, String>,
}

impl InMemoryTransactionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            by_key: DashMap::new(),
            key_of: DashMap::new(),
        }
    }

    /// Snapshot of every record, in arbitrary order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.by_key
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl TransactionLog for InMemoryTransactionLog {
    async fn lookup(&self, idempotency_key: &str) -> Result<Option<Transaction>, LedgerError> {
        Ok(self
            .by_key
            .get(idempotency_key)
            .map(|entry| entry.value().clone()))
    }

    async fn append(&self, transaction: Transaction) -> Result<(), LedgerError> {
        let id = transaction.id;
        let key = transaction.idempotency_key.clone();

        match self.by_key.entry(key.clone()) {
            Entry::Occupied(_) => return Err(LedgerError::duplicate_key(&key)),
            Entry::Vacant(slot) => {
                slot.insert(transaction);
            }
        }
        // Index insert happens after the record is visible; the only caller
        // addressing this id is the task that just appended it.
        self.key_of.insert(id, key);
        Ok(())
    }

    async fn mark_terminal(
        &self,
        transaction_id: TransactionId,
        status: TransactionStatus,
        reason: Option<String>,
        balance_after: Option<u64>,
    ) -> Result<Transaction, LedgerError> {
        let key = self
            .key_of
            .get(&transaction_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::transaction_not_found(transaction_id))?;

        let mut entry = self
            .by_key
            .get_mut(&key)
            .ok_or_else(|| LedgerError::transaction_not_found(transaction_id))?;
        let record = entry.value_mut();

        if record.status.is_terminal() || !status.is_terminal() {
            return Err(LedgerError::invalid_transition(transaction_id, record.status));
        }

        record.status = status;
        record.failure_reason = reason;
        record.balance_after = balance_after;
        record.completed_at = Some(Utc::now());
        Ok(record.clone())
    }
}
