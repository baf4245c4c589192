//! Thread-safe in-memory ledger store
//!
//! This module provides `InMemoryLedgerStore`, the DashMap-backed
//! implementation of the [`LedgerStore`](crate::core::traits::LedgerStore)
//! trait.
//!
//! # Design
//!
//! Balances live in a `DashMap` keyed by asset id. DashMap's internal sharding
//! gives fine-grained per-entry locking: operations on different assets
//! proceed in parallel, while operations on the same asset are serialized by
//! the entry lock. `try_debit` performs its balance check and decrement while
//! holding that lock, which makes the compare-and-debit atomic: no lost
//! updates, and a negative balance is never observable.
//!
//! No map guard is ever held across an await point; the async trait methods
//! complete synchronously once the entry lock is acquired.

use dashmap::DashMap;

use crate::core::traits::LedgerStore;
use crate::types::{Asset, AssetId, LedgerError};

/// Thread-safe in-memory balance store
///
/// # Thread Safety
///
/// All methods take `&self` and are safe to call from multiple tasks or
/// threads concurrently. Same-asset operations are linearized by DashMap's
/// entry locking; different assets never contend beyond shard granularity.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    /// Asset state keyed by asset id
    assets: DashMap<AssetId, Asset>,
}

impl InMemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
        }
    }

    /// Provision an asset with an opening balance
    ///
    /// Idempotent: if the asset already exists, the existing balance is kept
    /// (first occurrence wins) so concurrent provisioning is safe.
    pub fn open_asset(&self, asset_id: &str, initial_balance: u64) {
        self.assets
            .entry(asset_id.to_string())
            .or_insert_with(|| Asset::new(asset_id, initial_balance));
    }

    /// Snapshot of every asset, in arbitrary order
    ///
    /// The snapshot reflects each asset at the moment its entry was visited;
    /// concurrent mutations may or may not be included.
    pub fn assets(&self) -> Vec<Asset> {
        self.assets
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    async fn get_balance(&self, asset_id: &str) -> Result<u64, LedgerError> {
        self.assets
            .get(asset_id)
            .map(|entry| entry.value().balance)
            .ok_or_else(|| LedgerError::asset_not_found(asset_id))
    }

    async fn try_debit(&self, asset_id: &str, amount: u64) -> Result<u64, LedgerError> {
        let mut entry = self
            .assets
            .get_mut(asset_id)
            .ok_or_else(|| LedgerError::asset_not_found(asset_id))?;
        let asset = entry.value_mut();

        // checked_sub doubles as the funds check: None exactly when
        // balance < amount.
        let next = asset
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::insufficient_funds(asset_id, asset.balance, amount))?;
        asset.balance = next;
        Ok(next)
    }

    async fn credit(&self, asset_id: &str, amount: u64) -> Result<u64, LedgerError> {
        let mut entry = self
            .assets
            .get_mut(asset_id)
            .ok_or_else(|| LedgerError::asset_not_found(asset_id))?;
        let asset = entry.value_mut();

        let next = asset
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow(asset_id))?;
        asset.balance = next;
        Ok(next)
    }
}
