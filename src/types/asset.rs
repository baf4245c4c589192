//! Asset state for the transfer ledger

use super::transfer::AssetId;

/// A single asset and its authoritative balance
///
/// Balances are unsigned, so a negative balance is unrepresentable; the ledger
/// store additionally guarantees that no debit is applied unless the balance
/// covers it, and that all arithmetic is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Unique asset identifier
    pub id: AssetId,

    /// Current balance
    pub balance: u64,
}

impl Asset {
    /// Create an asset with the given opening balance
    pub fn new(id: impl Into<String>, balance: u64) -> Self {
        Asset {
            id: id.into(),
            balance,
        }
    }
}
