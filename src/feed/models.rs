//! Read-side models of the suggestion feed

use crate::entity::{EntitySchema, EntityType, KEY_DELIMITER};
use crate::store::StoreItem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Sort key discriminator of saved-profile rows
pub const SAVED_PROFILE_DISCRIMINATOR: &str = "SAVED_PROFILE";

/// `"<entityType>#SAVED_PROFILE#"`
pub fn saved_profile_prefix(entity_type: EntityType) -> String {
    format!(
        "{}{d}{}{d}",
        entity_type.as_str(),
        SAVED_PROFILE_DISCRIMINATOR,
        d = KEY_DELIMITER
    )
}

pub fn saved_profile_range_key(
    entity_type: EntityType,
    saved_type: EntityType,
    saved_id: &str,
) -> String {
    format!(
        "{}{}{}{}",
        saved_profile_prefix(entity_type),
        saved_type.as_str(),
        KEY_DELIMITER,
        saved_id
    )
}

/// A profile bookmarked by an entity's user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProfile {
    pub saved_profile_id: String,
    pub saved_profile_type: EntityType,
    pub created_at: String,
}

impl SavedProfile {
    pub fn to_item(&self, entity_type: EntityType, entity_id: &str) -> Result<StoreItem> {
        let attributes = serde_json::to_value(self).context("Failed to encode saved profile")?;
        Ok(StoreItem::new(
            entity_type.partition_key(entity_id),
            saved_profile_range_key(entity_type, self.saved_profile_type, &self.saved_profile_id),
        )
        .with_object(attributes))
    }

    pub fn from_item(item: &StoreItem) -> Result<Self> {
        serde_json::from_value(item.attributes_value()).with_context(|| {
            format!(
                "Failed to decode saved profile {} / {}",
                item.hash_key, item.range_key
            )
        })
    }

    pub fn hash_key(&self) -> String {
        self.saved_profile_type.partition_key(&self.saved_profile_id)
    }
}

/// A profile as served by the feed: the reconstructed entity plus the
/// per-viewer suggestion data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedProfile {
    #[serde(flatten)]
    pub entity: EntitySchema,
    /// Match certainty as a 0-100 percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certainty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub is_saved: bool,
}

/// Split a comma-separated selection of auxiliary fields (`"contacts,portfolio"`).
pub fn parse_fields(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
