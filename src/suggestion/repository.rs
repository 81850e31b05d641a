//! Suggestion persistence layer
//!
//! Suggestion rows live in the entity partitions of the same table,
//! separated from profile sub-records by the `SUGGESTION` sort key prefix.

use super::models::*;
use crate::entity::EntityType;
use crate::error::ErrorResponse;
use crate::store::{ItemKey, ItemStore, StoreItem};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct SuggestionRepository {
    store: Arc<dyn ItemStore>,
}

impl SuggestionRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Persist every match as two directed rows, one per entity, in a single
    /// atomic batch. A pair repeated in the list keeps its last occurrence.
    pub async fn save_suggestions(
        &self,
        match_list: &SuggestionMatchList,
    ) -> Result<usize, ErrorResponse> {
        let created_at = local_timestamp();
        let mut rows: BTreeMap<ItemKey, StoreItem> = BTreeMap::new();

        for m in &match_list.matches {
            m.validate().map_err(|e| {
                ErrorResponse::internal(format!("Failed to save suggestions: {}", e))
            })?;

            for (i, entity) in m.match_pair.iter().enumerate() {
                let partner = &m.match_pair[1 - i];
                let item = Suggestion::directed(partner, m.certainty, &m.rationale, &created_at)
                    .to_item(entity.entity_type, &entity.entity_id)?;
                rows.insert(item.key(), item);
            }
        }

        if rows.is_empty() {
            return Ok(0);
        }

        let items: Vec<StoreItem> = rows.into_values().collect();
        self.store.batch_write_items(&items).await.map_err(|e| {
            let msg = format!("Failed to save suggestions: {:#}", e);
            error!("{}", msg);
            ErrorResponse::internal(msg)
        })?;

        info!(rows = items.len(), "Suggestions saved successfully");
        Ok(items.len())
    }

    /// All suggestion rows stored under one entity's partition.
    pub async fn get_suggestions(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Vec<Suggestion>, ErrorResponse> {
        let items = self
            .store
            .query_partition(
                &entity_type.partition_key(entity_id),
                &suggestion_prefix(entity_type),
            )
            .await
            .map_err(|e| {
                let msg = format!("Failed to get suggestions: {:#}", e);
                error!("{}", msg);
                ErrorResponse::internal(msg)
            })?;

        let mut suggestions = Vec::with_capacity(items.len());
        for item in &items {
            match Suggestion::from_item(item) {
                Ok(s) => suggestions.push(s),
                Err(e) => warn!("Skipping malformed suggestion row: {:#}", e),
            }
        }
        Ok(suggestions)
    }

    /// Mark (or unmark) one suggestion as saved by the entity's user.
    pub async fn set_suggestion_saved(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        pair_type: EntityType,
        pair_id: &str,
        is_saved: bool,
    ) -> Result<(), ErrorResponse> {
        let key = ItemKey::new(
            entity_type.partition_key(entity_id),
            suggestion_range_key(entity_type, pair_type, pair_id),
        );

        let found = self
            .store
            .update_attribute(&key, "isSaved", Value::Bool(is_saved))
            .await
            .map_err(|e| {
                error!("Failed to update suggestion: {:#}", e);
                ErrorResponse::from(e)
            })?;

        if !found {
            return Err(ErrorResponse::not_found(format!(
                "No suggestion from {} to {}",
                key.hash_key,
                pair_type.partition_key(pair_id)
            )));
        }
        Ok(())
    }
}
