//! In-memory mock implementation of ItemStore for testing.
//!
//! Items live in a `tokio::sync::RwLock<BTreeMap<ItemKey, StoreItem>>`.
//! `scan_index` returns items ordered by `(range_key, gsi1pk)` rather than by
//! partition, so sub-records of different entities come back interleaved the
//! way a real index scan can return them.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::error::StoreError;
use crate::store::models::{ItemKey, StoreItem};
use crate::store::traits::ItemStore;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory mock implementation of ItemStore for testing.
#[derive(Default)]
pub struct MockItemStore {
    pub items: RwLock<BTreeMap<ItemKey, StoreItem>>,

    // Failure injection
    pub fail_scan: AtomicBool,
    pub fail_batch_get: AtomicBool,
    pub fail_query: AtomicBool,
    /// Fail any batch write that contains an item whose range key contains this marker
    pub fail_writes_matching: RwLock<Option<String>>,

    // Call accounting
    pub write_calls: AtomicUsize,
    pub scan_calls: AtomicUsize,
}

impl MockItemStore {
    /// Create a new empty MockItemStore.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed items into the store.
    pub async fn with_items(self, items: impl IntoIterator<Item = StoreItem>) -> Self {
        {
            let mut map = self.items.write().await;
            for item in items {
                map.insert(item.key(), item);
            }
        }
        self
    }

    /// Make every scan fail.
    pub fn failing_scan(self) -> Self {
        self.fail_scan.store(true, Ordering::SeqCst);
        self
    }

    /// Make every batch get fail.
    pub fn failing_batch_get(self) -> Self {
        self.fail_batch_get.store(true, Ordering::SeqCst);
        self
    }

    /// Make every partition query fail.
    pub fn failing_query(self) -> Self {
        self.fail_query.store(true, Ordering::SeqCst);
        self
    }

    /// Make batch writes fail when they touch a range key containing `marker`.
    pub async fn failing_writes_matching(self, marker: &str) -> Self {
        *self.fail_writes_matching.write().await = Some(marker.to_string());
        self
    }

    // ========================================================================
    // Inspection helpers
    // ========================================================================

    pub async fn item(&self, hash_key: &str, range_key: &str) -> Option<StoreItem> {
        self.items
            .read()
            .await
            .get(&ItemKey::new(hash_key, range_key))
            .cloned()
    }

    pub async fn count_with_range_prefix(&self, hash_key: &str, prefix: &str) -> usize {
        self.items
            .read()
            .await
            .values()
            .filter(|i| i.hash_key == hash_key && i.range_key.starts_with(prefix))
            .count()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemStore for MockItemStore {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<StoreItem>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn batch_get_items(&self, keys: &[ItemKey]) -> Result<Vec<StoreItem>> {
        if self.fail_batch_get.load(Ordering::SeqCst) {
            return Err(StoreError::Query("mock batch get failure".into()).into());
        }
        let map = self.items.read().await;
        // Reverse request order: callers must not rely on it
        let mut seen = std::collections::HashSet::new();
        Ok(keys
            .iter()
            .rev()
            .filter(|k| seen.insert((*k).clone()))
            .filter_map(|k| map.get(k).cloned())
            .collect())
    }

    async fn batch_write_items(&self, items: &[StoreItem]) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(marker) = self.fail_writes_matching.read().await.as_deref() {
            if items.iter().any(|i| i.range_key.contains(marker)) {
                return Err(StoreError::BatchWrite(format!(
                    "mock batch write failure on '{}'",
                    marker
                ))
                .into());
            }
        }

        let mut map = self.items.write().await;
        for item in items {
            map.insert(item.key(), item.clone());
        }
        Ok(())
    }

    async fn scan_index(&self) -> Result<Vec<StoreItem>> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scan.load(Ordering::SeqCst) {
            return Err(StoreError::TableMissing("mock scan failure".into()).into());
        }
        let mut items: Vec<StoreItem> = self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.gsi1pk.is_some())
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            (a.range_key.as_str(), a.gsi1pk.as_deref())
                .cmp(&(b.range_key.as_str(), b.gsi1pk.as_deref()))
        });
        Ok(items)
    }

    async fn query_partition(
        &self,
        hash_key: &str,
        range_key_prefix: &str,
    ) -> Result<Vec<StoreItem>> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(StoreError::Query("mock query failure".into()).into());
        }
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.hash_key == hash_key && i.range_key.starts_with(range_key_prefix))
            .cloned()
            .collect())
    }

    async fn update_attribute(&self, key: &ItemKey, name: &str, value: Value) -> Result<bool> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut map = self.items.write().await;
        match map.get_mut(key) {
            Some(item) => {
                item.attributes.insert(name.to_string(), value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.items.write().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_interleaves_partitions() {
        let store = MockItemStore::new()
            .with_items(vec![
                StoreItem::new("STARTUP#a", "STARTUP#METADATA").with_gsi1pk("ka"),
                StoreItem::new("STARTUP#a", "STARTUP#CONTACTS").with_gsi1pk("ka"),
                StoreItem::new("STARTUP#b", "STARTUP#METADATA").with_gsi1pk("kb"),
                StoreItem::new("STARTUP#b", "STARTUP#CONTACTS").with_gsi1pk("kb"),
                StoreItem::new("STARTUP#a", "STARTUP#SUGGESTION#STARTUP#b"),
            ])
            .await;

        let scanned = store.scan_index().await.unwrap();
        let keys: Vec<_> = scanned.iter().map(|i| i.hash_key.as_str()).collect();
        // Unindexed suggestion row is excluded; partitions are not contiguous
        assert_eq!(keys, vec!["STARTUP#a", "STARTUP#b", "STARTUP#a", "STARTUP#b"]);
    }

    #[tokio::test]
    async fn test_failing_batch_get_and_query() {
        let store = MockItemStore::new().failing_batch_get().failing_query();
        assert!(store
            .batch_get_items(&[ItemKey::new("STARTUP#a", "STARTUP#METADATA")])
            .await
            .is_err());
        assert!(store.query_partition("STARTUP#a", "STARTUP#").await.is_err());
    }

    #[tokio::test]
    async fn test_failing_writes_leave_state_untouched() {
        let store = MockItemStore::new().failing_writes_matching("METADATA").await;
        let result = store
            .batch_write_items(&[
                StoreItem::new("STARTUP#a", "STARTUP#CONTACTS"),
                StoreItem::new("STARTUP#a", "STARTUP#METADATA"),
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(store.len().await, 0);
        assert_eq!(store.writes(), 1);
    }
}
