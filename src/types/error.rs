//! Error types for the transfer ledger
//!
//! This module defines the failure taxonomy used across the ledger store, the
//! transaction log, and the orchestrator. Each failure kind is a distinct
//! variant with enough context to diagnose it, rather than a single generic
//! failure bucket.
//!
//! # Error Categories
//!
//! - **Request outcomes**: unknown asset, invalid amount: terminal `FAILED`
//!   for the submitting request.
//! - **Business outcomes**: insufficient funds: terminal `REJECTED`, expected
//!   in normal operation and not logged as an error.
//! - **Idempotency**: duplicate key (resolved by re-reading the log) and
//!   conflict (a concurrent duplicate submission is still in flight; the
//!   caller retries with backoff).
//! - **Log integrity**: invalid transition, transaction not found.
//! - **Store faults**: timeout and unavailability of a backing store;
//!   retryable for read-only checks, never blindly retried for the debit.

use thiserror::Error;

use super::transfer::{TransactionId, TransactionStatus};

/// Main error type for the transfer ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The referenced asset does not exist in the ledger store
    ///
    /// Fatal to the submitting request: it settles as terminal FAILED.
    #[error("Unknown asset: {asset}")]
    AssetNotFound {
        /// Asset id that was not found
        asset: String,
    },

    /// The source balance does not cover the requested debit
    ///
    /// An expected business outcome, not an operational error. The request
    /// settles as terminal REJECTED and the balance is unchanged.
    #[error("Insufficient funds for asset {asset}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Asset id that was debited
        asset: String,
        /// Balance at the time of the attempt
        balance: u64,
        /// Requested debit amount
        requested: u64,
    },

    /// The transfer amount is not positive
    #[error("Invalid transfer amount: {amount} (must be positive)")]
    InvalidAmount {
        /// The offending amount
        amount: u64,
    },

    /// The idempotency key is already present in the transaction log
    ///
    /// Surfaced by `append` when two submissions race on the same key; the
    /// orchestrator resolves it by re-reading the log.
    #[error("Idempotency key '{key}' is already recorded")]
    DuplicateKey {
        /// The duplicated idempotency key
        key: String,
    },

    /// A submission with the same idempotency key is still in flight
    ///
    /// Transient: the caller retries later and is never silently merged with
    /// the in-flight execution.
    #[error("A transfer with idempotency key '{key}' is already in flight")]
    Conflict {
        /// The contended idempotency key
        key: String,
    },

    /// Attempted to terminally transition a record that is not `PENDING`
    ///
    /// Terminal records are immutable; a second transition is a log-integrity
    /// violation.
    #[error("Transaction {id} cannot transition: already {status}")]
    InvalidTransition {
        /// Transaction id
        id: TransactionId,
        /// Status the record already holds
        status: TransactionStatus,
    },

    /// No record exists for the given transaction id
    #[error("Transaction {id} not found")]
    TransactionNotFound {
        /// Transaction id that was not found
        id: TransactionId,
    },

    /// A credit would overflow the asset balance
    ///
    /// The credit is rejected to keep the balance well-defined.
    #[error("Arithmetic overflow crediting asset {asset}")]
    ArithmeticOverflow {
        /// Asset id whose balance would overflow
        asset: String,
    },

    /// A backing-store call timed out
    ///
    /// The operation may or may not have applied; destructive steps must not
    /// be retried without re-checking.
    #[error("Backing store timed out during {operation}")]
    StoreTimeout {
        /// Operation that timed out
        operation: String,
    },

    /// A backing store refused or dropped the call
    #[error("Backing store unavailable during {operation}")]
    StoreUnavailable {
        /// Operation that failed
        operation: String,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AssetNotFound error
    pub fn asset_not_found(asset: &str) -> Self {
        LedgerError::AssetNotFound {
            asset: asset.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(asset: &str, balance: u64, requested: u64) -> Self {
        LedgerError::InsufficientFunds {
            asset: asset.to_string(),
            balance,
            requested,
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: u64) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create a DuplicateKey error
    pub fn duplicate_key(key: &str) -> Self {
        LedgerError::DuplicateKey {
            key: key.to_string(),
        }
    }

    /// Create a Conflict error
    pub fn conflict(key: &str) -> Self {
        LedgerError::Conflict {
            key: key.to_string(),
        }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(id: TransactionId, status: TransactionStatus) -> Self {
        LedgerError::InvalidTransition { id, status }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(id: TransactionId) -> Self {
        LedgerError::TransactionNotFound { id }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(asset: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            asset: asset.to_string(),
        }
    }

    /// Create a StoreTimeout error
    pub fn store_timeout(operation: &str) -> Self {
        LedgerError::StoreTimeout {
            operation: operation.to_string(),
        }
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(operation: &str) -> Self {
        LedgerError::StoreUnavailable {
            operation: operation.to_string(),
        }
    }

    /// Whether this error is a transient store fault worth retrying for
    /// read-only operations
    pub fn is_store_fault(&self) -> bool {
        matches!(
            self,
            LedgerError::StoreTimeout { .. } | LedgerError::StoreUnavailable { .. }
        )
    }
}
