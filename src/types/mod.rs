//! Types module
//!
//! Contains core data structures used throughout the crate.
//! This module organizes types into logical submodules:
//! - `asset`: Asset state owned by the ledger store
//! - `transfer`: Transfer requests, transaction records, and results
//! - `error`: Error taxonomy for the transfer ledger

pub mod asset;
pub mod error;
pub mod transfer;

pub use asset::Asset;
pub use error::LedgerError;
pub use transfer::{
    AssetId, Transaction, TransactionId, TransactionStatus, TransferRequest, TransferResult,
};
