//! Entity store access layer
//!
//! Reads and writes profile sub-records through an [`ItemStore`] and turns
//! them into typed [`EntitySchema`] values. Store failures are logged and
//! returned as `INTERNAL_SERVER_ERROR`; nothing is retried here.

use super::builder::reconstruct_entities;
use super::models::{EntitySchema, RecordKind};
use crate::error::ErrorResponse;
use crate::store::{ItemKey, ItemStore, StoreItem};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Attribute flipped once an entity has received suggestions
pub const FOR_SUGGESTION_GENERATION: &str = "forSuggestionGeneration";

pub struct EntityRepository {
    store: Arc<dyn ItemStore>,
}

impl EntityRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Enumerate every profile through the secondary index.
    ///
    /// Returns the reconstructed entities together with the raw items they
    /// were built from (the orchestrator flips flags on the raw METADATA rows).
    pub async fn get_entity_list(
        &self,
    ) -> Result<(Vec<EntitySchema>, Vec<StoreItem>), ErrorResponse> {
        let items = self.store.scan_index().await.map_err(|e| {
            error!("Error scanning entity index: {:#}", e);
            ErrorResponse::from(e)
        })?;

        let entities = reconstruct_entities(&items).map_err(|e| {
            error!("Error reconstructing entities: {:#}", e);
            ErrorResponse::from(e)
        })?;

        debug!(
            items = items.len(),
            entities = entities.len(),
            "Loaded entity list"
        );
        Ok((entities, items))
    }

    /// Fetch explicit `(hashKey, rangeKey)` pairs and merge them per entity.
    pub async fn batch_get_entities(
        &self,
        item_keys: &[ItemKey],
    ) -> Result<Vec<EntitySchema>, ErrorResponse> {
        if item_keys.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.store.batch_get_items(item_keys).await.map_err(|e| {
            error!("Error getting entities: {:#}", e);
            ErrorResponse::from(e)
        })?;

        reconstruct_entities(&items).map_err(|e| {
            error!("Error reconstructing entities: {:#}", e);
            ErrorResponse::from(e)
        })
    }

    /// Set `forSuggestionGeneration` on the METADATA records among `records`.
    ///
    /// Records whose sort key does not contain `METADATA` are skipped; all
    /// updates go out in one batch.
    pub async fn update_entity_for_suggestion_generation(
        &self,
        records: &[StoreItem],
        update_value: bool,
    ) -> Result<(), ErrorResponse> {
        let updated: Vec<StoreItem> = records
            .iter()
            .filter(|r| r.range_key.contains(RecordKind::Metadata.suffix()))
            .map(|r| {
                r.clone()
                    .with_attribute(FOR_SUGGESTION_GENERATION, Value::Bool(update_value))
            })
            .collect();

        if updated.is_empty() {
            debug!("No METADATA records to update");
            return Ok(());
        }

        info!(
            count = updated.len(),
            value = update_value,
            "Updating entities for suggestion generation"
        );

        self.store.batch_write_items(&updated).await.map_err(|e| {
            error!("Error updating entity for suggestion generation: {:#}", e);
            ErrorResponse::from(e)
        })
    }

    /// Write a full profile (METADATA plus whichever auxiliaries are set).
    ///
    /// The entity is queued for matchmaking and indexed under a fresh `gsi1pk`.
    pub async fn put_entity(
        &self,
        entity: &EntitySchema,
        created_at: &str,
    ) -> Result<usize, ErrorResponse> {
        if entity.id().is_empty() {
            return Err(ErrorResponse::bad_request("Entity id must not be empty"));
        }

        let mut queued = entity.clone();
        queued.set_for_suggestion_generation(true);

        let gsi1pk = uuid::Uuid::new_v4().to_string();
        let items = queued.to_items(&gsi1pk, created_at)?;

        self.store.batch_write_items(&items).await.map_err(|e| {
            error!("Error writing entity {}: {:#}", entity.hash_key(), e);
            ErrorResponse::from(e)
        })?;

        Ok(items.len())
    }
}
