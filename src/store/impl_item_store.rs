//! `ItemStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use serde_json::Value;

use super::client::Neo4jClient;
use super::models::{ItemKey, StoreItem};
use super::traits::ItemStore;

#[async_trait]
impl ItemStore for Neo4jClient {
    async fn get_item(&self, key: &ItemKey) -> anyhow::Result<Option<StoreItem>> {
        self.get_item(key).await
    }

    async fn batch_get_items(&self, keys: &[ItemKey]) -> anyhow::Result<Vec<StoreItem>> {
        self.batch_get_items(keys).await
    }

    async fn batch_write_items(&self, items: &[StoreItem]) -> anyhow::Result<()> {
        self.batch_write_items(items).await
    }

    async fn scan_index(&self) -> anyhow::Result<Vec<StoreItem>> {
        self.scan_index().await
    }

    async fn query_partition(
        &self,
        hash_key: &str,
        range_key_prefix: &str,
    ) -> anyhow::Result<Vec<StoreItem>> {
        self.query_partition(hash_key, range_key_prefix).await
    }

    async fn update_attribute(
        &self,
        key: &ItemKey,
        name: &str,
        value: Value,
    ) -> anyhow::Result<bool> {
        self.update_attribute(key, name, value).await
    }

    async fn delete_item(&self, key: &ItemKey) -> anyhow::Result<()> {
        self.delete_item(key).await
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }
}
