//! ItemStore trait definition
//!
//! Defines the abstract interface of the single-table key/value store.
//! This trait mirrors the public async methods of `Neo4jClient`,
//! enabling testing with the in-memory mock and future backend swaps.

use crate::store::models::{ItemKey, StoreItem};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Abstract interface for all item store operations.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Get a single item by its composite key
    async fn get_item(&self, key: &ItemKey) -> Result<Option<StoreItem>>;

    /// Get many items by explicit key list. Missing keys are silently absent
    /// from the result; result order is unspecified.
    async fn batch_get_items(&self, keys: &[ItemKey]) -> Result<Vec<StoreItem>>;

    /// Put (create or fully replace) every item in one atomic batch.
    async fn batch_write_items(&self, items: &[StoreItem]) -> Result<()>;

    /// Enumerate every item that carries a secondary-index key.
    ///
    /// Ordering follows the index, not the primary partition: sub-records of
    /// different entities may come back interleaved.
    async fn scan_index(&self) -> Result<Vec<StoreItem>>;

    /// All items of one partition whose range key starts with `range_key_prefix`.
    async fn query_partition(&self, hash_key: &str, range_key_prefix: &str)
        -> Result<Vec<StoreItem>>;

    /// Set a single attribute on an existing item.
    ///
    /// Returns `false` when no item exists under `key`.
    async fn update_attribute(&self, key: &ItemKey, name: &str, value: Value) -> Result<bool>;

    /// Delete an item (no-op when absent)
    async fn delete_item(&self, key: &ItemKey) -> Result<()>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<bool>;
}
