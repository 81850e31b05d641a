//! Neo4j-backed item store
//!
//! The single table is modelled as `(:Item)` nodes keyed by
//! `(hash_key, range_key)`. The attribute map is kept as a JSON string so
//! nested list-valued sub-records (contacts, founders, portfolio...) survive
//! unchanged. `gsi1pk` is a plain indexed property and plays the role of the
//! secondary index used for full-table enumeration.

use super::models::{Attributes, ItemKey, StoreItem};
use crate::error::StoreError;
use anyhow::{Context, Result};
use neo4rs::{query, Graph, Query};
use serde_json::Value;
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the item constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT item_key IF NOT EXISTS FOR (i:Item) REQUIRE (i.hash_key, i.range_key) IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX item_hash_key IF NOT EXISTS FOR (i:Item) ON (i.hash_key)",
            "CREATE INDEX item_gsi1pk IF NOT EXISTS FOR (i:Item) ON (i.gsi1pk)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query returning `i` item nodes
    async fn fetch_items(&self, q: Query) -> Result<Vec<StoreItem>> {
        let mut result = self
            .graph
            .execute(q)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut items = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            let node: neo4rs::Node = row.get("i")?;
            items.push(self.node_to_item(&node)?);
        }
        Ok(items)
    }

    /// Build the upsert query for one item
    fn put_query(item: &StoreItem) -> Result<Query> {
        let attributes = serde_json::to_string(&item.attributes)
            .with_context(|| format!("Failed to encode attributes of {}", item.hash_key))?;

        let cypher = match item.gsi1pk {
            Some(_) => {
                r#"
                MERGE (i:Item {hash_key: $hash_key, range_key: $range_key})
                SET i.attributes = $attributes, i.gsi1pk = $gsi1pk
                "#
            }
            None => {
                r#"
                MERGE (i:Item {hash_key: $hash_key, range_key: $range_key})
                SET i.attributes = $attributes
                REMOVE i.gsi1pk
                "#
            }
        };

        let mut q = query(cypher)
            .param("hash_key", item.hash_key.clone())
            .param("range_key", item.range_key.clone())
            .param("attributes", attributes);
        if let Some(gsi1pk) = &item.gsi1pk {
            q = q.param("gsi1pk", gsi1pk.clone());
        }
        Ok(q)
    }

    // ========================================================================
    // Item operations
    // ========================================================================

    /// Get a single item by key
    pub async fn get_item(&self, key: &ItemKey) -> Result<Option<StoreItem>> {
        let q = query(
            r#"
            MATCH (i:Item {hash_key: $hash_key, range_key: $range_key})
            RETURN i
            "#,
        )
        .param("hash_key", key.hash_key.clone())
        .param("range_key", key.range_key.clone());

        Ok(self.fetch_items(q).await?.into_iter().next())
    }

    /// Get many items by explicit key list
    pub async fn batch_get_items(&self, keys: &[ItemKey]) -> Result<Vec<StoreItem>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let hash_keys: Vec<String> = keys.iter().map(|k| k.hash_key.clone()).collect();
        let range_keys: Vec<String> = keys.iter().map(|k| k.range_key.clone()).collect();

        let q = query(
            r#"
            UNWIND range(0, size($hash_keys) - 1) AS idx
            MATCH (i:Item {hash_key: $hash_keys[idx], range_key: $range_keys[idx]})
            RETURN DISTINCT i
            "#,
        )
        .param("hash_keys", hash_keys)
        .param("range_keys", range_keys);

        self.fetch_items(q).await
    }

    /// Put every item inside one transaction
    pub async fn batch_write_items(&self, items: &[StoreItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let queries = items
            .iter()
            .map(Self::put_query)
            .collect::<Result<Vec<_>>>()?;

        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| StoreError::BatchWrite(e.to_string()))?;
        txn.run_queries(queries)
            .await
            .map_err(|e| StoreError::BatchWrite(e.to_string()))?;
        txn.commit()
            .await
            .map_err(|e| StoreError::BatchWrite(e.to_string()))?;

        tracing::debug!(count = items.len(), "Batch wrote items");
        Ok(())
    }

    /// Enumerate every item carrying a secondary-index key
    pub async fn scan_index(&self) -> Result<Vec<StoreItem>> {
        let q = query(
            r#"
            MATCH (i:Item)
            WHERE i.gsi1pk IS NOT NULL
            RETURN i
            ORDER BY i.gsi1pk, i.range_key
            "#,
        );
        self.fetch_items(q).await
    }

    /// Range query inside one partition
    pub async fn query_partition(
        &self,
        hash_key: &str,
        range_key_prefix: &str,
    ) -> Result<Vec<StoreItem>> {
        let q = query(
            r#"
            MATCH (i:Item {hash_key: $hash_key})
            WHERE i.range_key STARTS WITH $prefix
            RETURN i
            ORDER BY i.range_key
            "#,
        )
        .param("hash_key", hash_key)
        .param("prefix", range_key_prefix);

        self.fetch_items(q).await
    }

    /// Set one attribute on an existing item
    pub async fn update_attribute(&self, key: &ItemKey, name: &str, value: Value) -> Result<bool> {
        let Some(mut item) = self.get_item(key).await? else {
            return Ok(false);
        };
        item.attributes.insert(name.to_string(), value);
        self.batch_write_items(std::slice::from_ref(&item)).await?;
        Ok(true)
    }

    /// Delete an item
    pub async fn delete_item(&self, key: &ItemKey) -> Result<()> {
        let q = query(
            r#"
            MATCH (i:Item {hash_key: $hash_key, range_key: $range_key})
            DETACH DELETE i
            "#,
        )
        .param("hash_key", key.hash_key.clone())
        .param("range_key", key.range_key.clone());

        self.graph
            .run(q)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    /// Check connectivity
    pub async fn health_check(&self) -> Result<bool> {
        let mut result = self.graph.execute(query("RETURN 1 AS ok")).await?;
        Ok(result.next().await?.is_some())
    }

    /// Helper to convert Neo4j node to StoreItem
    fn node_to_item(&self, node: &neo4rs::Node) -> Result<StoreItem> {
        let hash_key: String = node.get("hash_key")?;
        let range_key: String = node.get("range_key")?;
        let raw: String = node.get("attributes").unwrap_or_else(|_| "{}".to_string());
        let attributes: Attributes =
            serde_json::from_str(&raw).map_err(|e| StoreError::Decode {
                hash_key: hash_key.clone(),
                range_key: range_key.clone(),
                reason: e.to_string(),
            })?;

        Ok(StoreItem {
            hash_key,
            range_key,
            gsi1pk: node.get("gsi1pk").ok(),
            attributes,
        })
    }
}
