//! Transfer orchestration
//!
//! This module provides `TransferOrchestrator`, which coordinates the ledger
//! store and the transaction log to settle transfer submissions, and
//! `RetryPolicy`, the configuration for its bounded retry behavior.
//!
//! # Architecture
//!
//! ```text
//! TransferOrchestrator<S, L>
//!     ├── Arc<S: LedgerStore>     (authoritative balances)
//!     ├── Arc<L: TransactionLog>  (idempotency + audit records)
//!     └── RetryPolicy             (read retries, compensation retries)
//! ```
//!
//! # State machine
//!
//! Each submission drives one transaction record through
//! `PENDING -> {COMMITTED | REJECTED | FAILED}`. The transition is one-way and
//! happens exactly once; the terminal record is persisted before the result is
//! returned, so a result is never reported optimistically.
//!
//! # Thread Safety
//!
//! The orchestrator is cheap to clone (Arc-shared stores) and safe to use from
//! many tasks concurrently. It holds no lock of its own: per-asset ordering
//! comes entirely from the ledger store's atomicity contract, and duplicate
//! submissions are arbitrated by the transaction log's conditional insert.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::core::traits::{LedgerStore, TransactionLog};
use crate::types::{
    LedgerError, Transaction, TransactionId, TransactionStatus, TransferRequest, TransferResult,
};

/// Configuration for the orchestrator's bounded retries
///
/// Applies to read-only store checks (lookup, balance reads) and to the
/// compensation loop. The destructive debit step is never retried through this
/// policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts per retried operation
    pub max_attempts: u32,
    /// Base backoff between attempts; attempt `n` waits `backoff * n`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    /// Create a new RetryPolicy with custom values
    ///
    /// A zero `max_attempts` is invalid and falls back to the default.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        let default = Self::default();

        let max_attempts = if max_attempts == 0 {
            warn!(
                max_attempts,
                fallback = default.max_attempts,
                "invalid max_attempts, using default"
            );
            default.max_attempts
        } else {
            max_attempts
        };

        Self {
            max_attempts,
            backoff,
        }
    }
}

/// Coordinates validation, idempotency, debit/credit, and outcome recording
/// for transfer submissions
///
/// Generic over the two store traits so any backend with atomic per-key
/// read-modify-write can stand behind it without changing the orchestration
/// logic.
#[derive(Debug)]
pub struct TransferOrchestrator<S, L> {
    /// Authoritative balance store
    ledger: Arc<S>,

    /// Append-only transaction record, keyed by idempotency key
    log: Arc<L>,

    /// Bounded-retry configuration
    retry: RetryPolicy,
}

impl<S, L> Clone for TransferOrchestrator<S, L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            log: Arc::clone(&self.log),
            retry: self.retry,
        }
    }
}

impl<S, L> TransferOrchestrator<S, L>
where
    S: LedgerStore,
    L: TransactionLog,
{
    /// Create an orchestrator with the default retry policy
    pub fn new(ledger: Arc<S>, log: Arc<L>) -> Self {
        Self::with_retry_policy(ledger, log, RetryPolicy::default())
    }

    /// Create an orchestrator with a custom retry policy
    pub fn with_retry_policy(ledger: Arc<S>, log: Arc<L>, retry: RetryPolicy) -> Self {
        Self { ledger, log, retry }
    }

    /// Submit a transfer
    ///
    /// Settles the request to a terminal outcome and returns it:
    ///
    /// 1. A terminal record under the same idempotency key is replayed
    ///    unchanged: no re-execution, no double debit.
    /// 2. A `PENDING` record under the same key fails with `Conflict`; the
    ///    concurrent duplicate is never silently merged.
    /// 3. Otherwise a `PENDING` record is appended (an append racing with a
    ///    duplicate re-reads the log and resolves as case 1 or 2), the source
    ///    is validated and debited, the destination (if any) is credited with
    ///    compensation on failure, and the terminal outcome is persisted
    ///    before being returned.
    ///
    /// # Errors
    ///
    /// * `Conflict` - a submission with the same key is still in flight
    /// * `StoreTimeout` / `StoreUnavailable` - the log could not be read even
    ///   after bounded retries, or the terminal outcome could not be persisted
    pub async fn submit(&self, request: TransferRequest) -> Result<TransferResult, LedgerError> {
        if let Some(result) = self.check_existing(&request.idempotency_key).await? {
            return Ok(result);
        }

        let transaction = Transaction::pending(&request);
        let transaction_id = transaction.id;

        if let Err(err) = self.log.append(transaction).await {
            return match err {
                LedgerError::DuplicateKey { .. } => {
                    // Lost the append race; the winner's record decides.
                    match self.check_existing(&request.idempotency_key).await? {
                        Some(result) => Ok(result),
                        None => Err(LedgerError::conflict(&request.idempotency_key)),
                    }
                }
                other => Err(other),
            };
        }

        self.execute(transaction_id, &request).await
    }

    /// Resolve an idempotency key against the log: replay a terminal record,
    /// reject an in-flight duplicate, or report the key as unseen
    async fn check_existing(&self, key: &str) -> Result<Option<TransferResult>, LedgerError> {
        match self.lookup_with_retry(key).await? {
            Some(existing) if existing.status.is_terminal() => {
                debug!(
                    idempotency_key = %key,
                    transaction = %existing.id,
                    status = %existing.status,
                    "replaying stored result"
                );
                Ok(Some(TransferResult::from(&existing)))
            }
            Some(_) => Err(LedgerError::conflict(key)),
            None => Ok(None),
        }
    }

    /// Run the settlement steps for a freshly appended `PENDING` record
    async fn execute(
        &self,
        transaction_id: TransactionId,
        request: &TransferRequest,
    ) -> Result<TransferResult, LedgerError> {
        // Validation: the source must exist and the amount must be positive.
        if let Err(err) = self.get_balance_with_retry(&request.source).await {
            let reason = match err {
                LedgerError::AssetNotFound { .. } => format!("unknown asset: {}", request.source),
                err if err.is_store_fault() => "store timeout".to_string(),
                other => other.to_string(),
            };
            return self
                .finish(transaction_id, TransactionStatus::Failed, Some(reason), None)
                .await;
        }
        if request.amount == 0 {
            return self
                .finish(
                    transaction_id,
                    TransactionStatus::Failed,
                    Some("invalid amount".to_string()),
                    None,
                )
                .await;
        }

        // Debit. Never retried here: after a store fault the debit may or may
        // not have applied, so the transaction settles FAILED instead of
        // risking a double debit.
        let balance_after = match self.ledger.try_debit(&request.source, request.amount).await {
            Ok(balance) => balance,
            Err(LedgerError::InsufficientFunds { .. }) => {
                debug!(
                    transaction = %transaction_id,
                    source = %request.source,
                    amount = request.amount,
                    "transfer rejected: insufficient funds"
                );
                return self
                    .finish(
                        transaction_id,
                        TransactionStatus::Rejected,
                        Some("insufficient funds".to_string()),
                        None,
                    )
                    .await;
            }
            Err(LedgerError::AssetNotFound { .. }) => {
                return self
                    .finish(
                        transaction_id,
                        TransactionStatus::Failed,
                        Some(format!("unknown asset: {}", request.source)),
                        None,
                    )
                    .await;
            }
            Err(err) if err.is_store_fault() => {
                warn!(
                    transaction = %transaction_id,
                    source = %request.source,
                    %err,
                    "store fault during debit"
                );
                return self
                    .finish(
                        transaction_id,
                        TransactionStatus::Failed,
                        Some("store timeout".to_string()),
                        None,
                    )
                    .await;
            }
            Err(other) => {
                return self
                    .finish(
                        transaction_id,
                        TransactionStatus::Failed,
                        Some(other.to_string()),
                        None,
                    )
                    .await;
            }
        };

        // Credit the destination, compensating the debit on failure. From
        // this point the transaction must reach a terminal state.
        if let Some(destination) = &request.destination {
            if let Err(err) = self.ledger.credit(destination, request.amount).await {
                let base = match &err {
                    LedgerError::AssetNotFound { .. } => "destination invalid".to_string(),
                    other => format!("destination credit failed: {other}"),
                };
                let compensated = self
                    .compensate(transaction_id, &request.source, request.amount)
                    .await;
                let reason = if compensated {
                    format!("{base}, compensated")
                } else {
                    format!("{base}; compensation stuck on asset {}", request.source)
                };
                return self
                    .finish(transaction_id, TransactionStatus::Failed, Some(reason), None)
                    .await;
            }
        }

        info!(
            transaction = %transaction_id,
            source = %request.source,
            destination = request.destination.as_deref().unwrap_or("-"),
            amount = request.amount,
            balance_after,
            "transfer committed"
        );
        self.finish(
            transaction_id,
            TransactionStatus::Committed,
            None,
            Some(balance_after),
        )
        .await
    }

    /// Restore a debited source after a failed destination credit
    ///
    /// Retried with linear backoff up to the policy limit. Exhaustion is the
    /// one condition escalated as an operator-visible alert: the transfer is
    /// stuck partially applied and must not be silently swallowed.
    async fn compensate(&self, transaction_id: TransactionId, source: &str, amount: u64) -> bool {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.ledger.credit(source, amount).await {
                Ok(balance) => {
                    info!(
                        transaction = %transaction_id,
                        asset = %source,
                        amount,
                        balance,
                        "compensation applied, debit restored"
                    );
                    return true;
                }
                Err(err) if attempt < self.retry.max_attempts => {
                    warn!(
                        transaction = %transaction_id,
                        asset = %source,
                        amount,
                        attempt,
                        %err,
                        "compensation attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(err) => {
                    error!(
                        transaction = %transaction_id,
                        asset = %source,
                        amount,
                        attempts = attempt,
                        %err,
                        "compensation exhausted: transfer stuck partially applied"
                    );
                    return false;
                }
            }
        }
    }

    /// Persist the terminal outcome and build the caller-facing result from
    /// the stored record
    async fn finish(
        &self,
        transaction_id: TransactionId,
        status: TransactionStatus,
        reason: Option<String>,
        balance_after: Option<u64>,
    ) -> Result<TransferResult, LedgerError> {
        let record = self
            .log
            .mark_terminal(transaction_id, status, reason, balance_after)
            .await?;
        Ok(TransferResult::from(&record))
    }

    /// Log lookup with bounded retries on transient store faults
    async fn lookup_with_retry(&self, key: &str) -> Result<Option<Transaction>, LedgerError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.log.lookup(key).await {
                Ok(found) => return Ok(found),
                Err(err) if err.is_store_fault() && attempt < self.retry.max_attempts => {
                    warn!(idempotency_key = %key, attempt, %err, "log lookup failed, retrying");
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Balance read with bounded retries on transient store faults
    async fn get_balance_with_retry(&self, asset_id: &str) -> Result<u64, LedgerError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.ledger.get_balance(asset_id).await {
                Ok(balance) => return Ok(balance),
                Err(err) if err.is_store_fault() && attempt < self.retry.max_attempts => {
                    warn!(asset = %asset_id, attempt, %err, "balance read failed, retrying");
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
