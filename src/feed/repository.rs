//! Saved-profile rows

use super::models::*;
use crate::entity::EntityType;
use crate::error::ErrorResponse;
use crate::store::{ItemKey, ItemStore};
use crate::suggestion::local_timestamp;
use std::sync::Arc;
use tracing::error;

pub struct SavedProfileRepository {
    store: Arc<dyn ItemStore>,
}

impl SavedProfileRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub async fn get_saved_profiles(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Vec<SavedProfile>, ErrorResponse> {
        let items = self
            .store
            .query_partition(
                &entity_type.partition_key(entity_id),
                &saved_profile_prefix(entity_type),
            )
            .await
            .map_err(|e| {
                let msg = format!("Failed to get profiles: {:#}", e);
                error!("{}", msg);
                ErrorResponse::internal(msg)
            })?;

        items
            .iter()
            .map(SavedProfile::from_item)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(ErrorResponse::from)
    }

    pub async fn save_profile(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        saved_type: EntityType,
        saved_id: &str,
    ) -> Result<SavedProfile, ErrorResponse> {
        let saved = SavedProfile {
            saved_profile_id: saved_id.to_string(),
            saved_profile_type: saved_type,
            created_at: local_timestamp(),
        };
        let item = saved.to_item(entity_type, entity_id)?;

        self.store
            .batch_write_items(std::slice::from_ref(&item))
            .await
            .map_err(|e| {
                error!("Failed to save profile: {:#}", e);
                ErrorResponse::from(e)
            })?;
        Ok(saved)
    }

    pub async fn unsave_profile(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        saved_type: EntityType,
        saved_id: &str,
    ) -> Result<(), ErrorResponse> {
        let key = ItemKey::new(
            entity_type.partition_key(entity_id),
            saved_profile_range_key(entity_type, saved_type, saved_id),
        );
        self.store.delete_item(&key).await.map_err(|e| {
            error!("Failed to remove saved profile: {:#}", e);
            ErrorResponse::from(e)
        })
    }
}
