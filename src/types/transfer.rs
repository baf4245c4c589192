//! Transfer-related types for the transfer ledger
//!
//! This module defines the request submitted by callers, the transaction record
//! persisted by the log, and the result returned to callers. The transaction
//! record carries everything needed to reconstruct the caller-facing result, so
//! an idempotent replay returns a value identical to the one returned by the
//! original execution.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Asset identifier
///
/// Assets are keyed by a caller-chosen unique string (e.g. "gold").
pub type AssetId = String;

/// Transaction identifier, generated by the orchestrator at submission
pub type TransactionId = Uuid;

/// Lifecycle status of a transaction
///
/// A transaction is created `Pending` and transitions exactly once to one of
/// the three terminal states. Terminal records are immutable and retained for
/// audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Submitted but not yet settled
    Pending,

    /// Debit (and credit, if two-party) applied in full
    Committed,

    /// Declined as a normal business outcome (insufficient funds)
    Rejected,

    /// Could not be completed (validation failure, store fault, compensated
    /// credit failure)
    Failed,
}

impl TransactionStatus {
    /// Whether this status admits no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Committed => "COMMITTED",
            TransactionStatus::Rejected => "REJECTED",
            TransactionStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A transfer submitted by a caller
///
/// The idempotency key is client-supplied and must be unique per logical
/// transfer: resubmitting the same key replays the stored outcome instead of
/// executing again. The destination is optional; a single-leg transfer debits
/// the source without a corresponding credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Client-supplied key identifying this logical transfer
    pub idempotency_key: String,

    /// Asset to debit
    pub source: AssetId,

    /// Asset to credit, if this is a two-party transfer
    pub destination: Option<AssetId>,

    /// Amount to move; must be positive
    pub amount: u64,

    /// Opaque caller-supplied payload, echoed back in the result and retained
    /// for audit. Ordered map so serialized results are deterministic.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl TransferRequest {
    /// Create a single-leg transfer request with empty metadata
    pub fn new(
        idempotency_key: impl Into<String>,
        source: impl Into<String>,
        amount: u64,
    ) -> Self {
        TransferRequest {
            idempotency_key: idempotency_key.into(),
            source: source.into(),
            destination: None,
            amount,
            metadata: BTreeMap::new(),
        }
    }

    /// Set the destination asset, making this a two-party transfer
    pub fn to(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}

/// Persisted transaction record
///
/// Owned exclusively by the transaction log. Created `Pending` at submission;
/// `mark_terminal` stamps the completion time and fills in the outcome fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Generated transaction id
    pub id: TransactionId,

    /// Client-supplied idempotency key (unique within the log)
    pub idempotency_key: String,

    /// Current lifecycle status
    pub status: TransactionStatus,

    /// Transfer amount
    pub amount: u64,

    /// Asset debited
    pub source: AssetId,

    /// Asset credited, if any
    pub destination: Option<AssetId>,

    /// Caller-supplied metadata, retained for audit
    pub metadata: BTreeMap<String, serde_json::Value>,

    /// When the transaction was submitted
    pub created_at: DateTime<Utc>,

    /// When the transaction reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,

    /// Why the transaction was rejected or failed
    pub failure_reason: Option<String>,

    /// Source balance after a committed debit, recorded so replays return the
    /// same figure the original execution did
    pub balance_after: Option<u64>,
}

impl Transaction {
    /// Create a new `Pending` record for a request, with a fresh id and the
    /// submission timestamp
    pub fn pending(request: &TransferRequest) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            idempotency_key: request.idempotency_key.clone(),
            status: TransactionStatus::Pending,
            amount: request.amount,
            source: request.source.clone(),
            destination: request.destination.clone(),
            metadata: request.metadata.clone(),
            created_at: Utc::now(),
            completed_at: None,
            failure_reason: None,
            balance_after: None,
        }
    }
}

/// Caller-facing outcome of a transfer submission
///
/// Built from the persisted transaction record, never from in-flight state, so
/// resubmitting a settled idempotency key yields an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResult {
    /// Generated transaction id
    pub transaction_id: TransactionId,

    /// Terminal status reached
    pub status: TransactionStatus,

    /// Source balance after the debit (committed transfers only)
    pub balance_after: Option<u64>,

    /// Completion timestamp
    pub timestamp: Option<DateTime<Utc>>,

    /// Reason for rejection or failure, if any
    pub failure_reason: Option<String>,

    /// Metadata echoed back from the request
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl From<&Transaction> for TransferResult {
    fn from(record: &Transaction) -> Self {
        TransferResult {
            transaction_id: record.id,
            status: record.status,
            balance_after: record.balance_after,
            timestamp: record.completed_at,
            failure_reason: record.failure_reason.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::pending(TransactionStatus::Pending, "\"PENDING\"", false)]
    #[case::committed(TransactionStatus::Committed, "\"COMMITTED\"", true)]
    #[case::rejected(TransactionStatus::Rejected, "\"REJECTED\"", true)]
    #[case::failed(TransactionStatus::Failed, "\"FAILED\"", true)]
    fn test_status_serialization_and_terminality(
        #[case] status: TransactionStatus,
        #[case] expected_json: &str,
        #[case] terminal: bool,
    ) {
        assert_eq!(serde_json::to_string(&status).unwrap(), expected_json);
        assert_eq!(status.is_terminal(), terminal);
    }

    #[test]
    fn test_request_builder() {
        let request = TransferRequest::new("k1", "gold", 30).to("silver");

        assert_eq!(request.idempotency_key, "k1");
        assert_eq!(request.source, "gold");
        assert_eq!(request.destination, Some("silver".to_string()));
        assert_eq!(request.amount, 30);
        assert!(request.metadata.is_empty());
    }

    #[test]
    fn test_pending_record_from_request() {
        let request = TransferRequest::new("k1", "gold", 30);
        let record = Transaction::pending(&request);

        assert_eq!(record.idempotency_key, "k1");
        assert_eq!(record.status, TransactionStatus::Pending);
        assert_eq!(record.amount, 30);
        assert_eq!(record.source, "gold");
        assert_eq!(record.destination, None);
        assert!(record.completed_at.is_none());
        assert!(record.failure_reason.is_none());
        assert!(record.balance_after.is_none());
    }

    #[test]
    fn test_fresh_id_per_pending_record() {
        let request = TransferRequest::new("k1", "gold", 30);

        let first = Transaction::pending(&request);
        let second = Transaction::pending(&request);

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_result_built_from_record() {
        let request = TransferRequest::new("k1", "gold", 30);
        let mut record = Transaction::pending(&request);
        record.status = TransactionStatus::Committed;
        record.completed_at = Some(Utc::now());
        record.balance_after = Some(70);

        let result = TransferResult::from(&record);

        assert_eq!(result.transaction_id, record.id);
        assert_eq!(result.status, TransactionStatus::Committed);
        assert_eq!(result.balance_after, Some(70));
        assert_eq!(result.timestamp, record.completed_at);
        assert_eq!(result.failure_reason, None);
    }

    #[test]
    fn test_result_serialization_is_deterministic() {
        let mut request = TransferRequest::new("k1", "gold", 30);
        request
            .metadata
            .insert("note".to_string(), serde_json::json!("settlement"));
        request
            .metadata
            .insert("batch".to_string(), serde_json::json!(7));

        let mut record = Transaction::pending(&request);
        record.status = TransactionStatus::Committed;
        record.completed_at = Some(Utc::now());
        record.balance_after = Some(70);

        let first = serde_json::to_string(&TransferResult::from(&record)).unwrap();
        let second = serde_json::to_string(&TransferResult::from(&record)).unwrap();

        assert_eq!(first, second);
    }
}
