//! Suggestion models
//!
//! `SuggestionMatchList` is what the matchmaking model returns; its JSON
//! schema (generated with schemars, field docs become descriptions) is the
//! structured output contract. A `Suggestion` is one persisted, directed edge.

use crate::entity::{EntityType, KEY_DELIMITER};
use crate::store::StoreItem;
use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Sort key discriminator of suggestion rows
pub const SUGGESTION_DISCRIMINATOR: &str = "SUGGESTION";

/// UTC offset of the ecosystem's local time (Asia/Manila, no DST)
const LOCAL_OFFSET_SECS: i32 = 8 * 3600;

/// Current time as ISO-8601 in the ecosystem's local offset (`+08:00`)
pub fn local_timestamp() -> String {
    let offset = FixedOffset::east_opt(LOCAL_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    Utc::now()
        .with_timezone(&offset)
        .to_rfc3339_opts(SecondsFormat::Micros, false)
}

// ============================================================================
// Model output
// ============================================================================

/// One side of a suggested match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchedEntity {
    /// The unique identifier of the entity (startupId or enablerId) that will be used to look up additional details
    pub entity_id: String,
    /// The type of the entity (STARTUP or ENABLER)
    pub entity_type: EntityType,
    /// The display name of the entity (startUpName or enablerName) that will be shown in the match results
    pub name: String,
}

impl MatchedEntity {
    /// Partition key of the matched entity (`TYPE#id`)
    pub fn hash_key(&self) -> String {
        self.entity_type.partition_key(&self.entity_id)
    }
}

/// A pairing proposed by the matchmaking model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionMatch {
    /// A pair of entities that are suggested matches. Must contain exactly 2 entities representing either startup-startup, startup-enabler, or enabler-enabler matches
    #[schemars(length(min = 2, max = 2))]
    pub match_pair: Vec<MatchedEntity>,
    /// A confidence score between 0 and 1 indicating how strong the match is based on the analysis of compatibility factors like industry alignment, stage fit, etc.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub certainty: f64,
    /// A detailed explanation of why these entities are a good match, including specific compatibility points, potential synergies, and suggested collaboration opportunities
    pub rationale: String,
}

impl SuggestionMatch {
    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.match_pair.len() != 2 {
            return Err(format!(
                "matchPair must contain exactly 2 entities, got {}",
                self.match_pair.len()
            ));
        }
        if !(0.0..=1.0).contains(&self.certainty) {
            return Err(format!(
                "certainty must be between 0 and 1, got {}",
                self.certainty
            ));
        }
        if let Some(entity) = self.match_pair.iter().find(|e| e.entity_id.trim().is_empty()) {
            return Err(format!("entityId must not be empty (name: {})", entity.name));
        }
        let (a, b) = (&self.match_pair[0], &self.match_pair[1]);
        if a.entity_id == b.entity_id && a.entity_type == b.entity_type {
            return Err(format!("an entity cannot be matched with itself ({})", a.entity_id));
        }
        Ok(())
    }

}

/// Structured output of one matchmaking round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionMatchList {
    /// An ordered list of suggested matches, sorted by certainty score from highest to lowest. Each match contains the pair of entities and detailed rationale for the suggestion
    pub matches: Vec<SuggestionMatch>,
}

impl SuggestionMatchList {
    pub fn new(matches: Vec<SuggestionMatch>) -> Self {
        Self { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Validate every match, reporting the first failure with its index.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (i, m) in self.matches.iter().enumerate() {
            m.validate().map_err(|e| format!("matches[{}]: {}", i, e))?;
        }
        Ok(())
    }

    /// Partition keys of every entity appearing in any pair.
    ///
    /// Keyed by type and id, so `STARTUP#x` does not cover `ENABLER#x`.
    pub fn covered_keys(&self) -> BTreeSet<String> {
        self.matches
            .iter()
            .flat_map(|m| m.match_pair.iter().map(MatchedEntity::hash_key))
            .collect()
    }

    pub fn extend(&mut self, other: SuggestionMatchList) {
        self.matches.extend(other.matches);
    }

    /// JSON schema handed to the model as its output contract.
    ///
    /// Sub-schemas are inlined so the schema is self-contained.
    pub fn output_schema() -> Value {
        let settings = schemars::gen::SchemaSettings::draft07().with(|s| {
            s.inline_subschemas = true;
        });
        let root = settings
            .into_generator()
            .into_root_schema_for::<SuggestionMatchList>();
        serde_json::to_value(root.schema).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

// ============================================================================
// Persisted edge
// ============================================================================

/// `"<entityType>#SUGGESTION#"`, the prefix of an entity's suggestion rows
pub fn suggestion_prefix(entity_type: EntityType) -> String {
    format!(
        "{}{d}{}{d}",
        entity_type.as_str(),
        SUGGESTION_DISCRIMINATOR,
        d = KEY_DELIMITER
    )
}

/// Sort key of the suggestion row pointing at `(pair_type, pair_id)`
pub fn suggestion_range_key(
    entity_type: EntityType,
    pair_type: EntityType,
    pair_id: &str,
) -> String {
    format!(
        "{}{}{}{}",
        suggestion_prefix(entity_type),
        pair_type.as_str(),
        KEY_DELIMITER,
        pair_id
    )
}

/// One directed suggestion row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub suggestion_id: String,
    /// Bare id of the suggested partner
    pub match_pair_id: String,
    pub match_pair_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_pair_name: Option<String>,
    pub certainty: f64,
    pub rationale: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_saved: Option<bool>,
}

impl Suggestion {
    /// Edge from `entity` to `partner` for an accepted match.
    pub fn directed(
        partner: &MatchedEntity,
        certainty: f64,
        rationale: &str,
        created_at: &str,
    ) -> Self {
        Self {
            suggestion_id: uuid::Uuid::new_v4().to_string(),
            match_pair_id: partner.entity_id.clone(),
            match_pair_type: partner.entity_type,
            match_pair_name: Some(partner.name.clone()),
            certainty,
            rationale: rationale.to_string(),
            created_at: created_at.to_string(),
            is_saved: None,
        }
    }

    pub fn to_item(&self, entity_type: EntityType, entity_id: &str) -> Result<StoreItem> {
        let attributes = serde_json::to_value(self).context("Failed to encode suggestion")?;
        Ok(StoreItem::new(
            entity_type.partition_key(entity_id),
            suggestion_range_key(entity_type, self.match_pair_type, &self.match_pair_id),
        )
        .with_object(attributes))
    }

    pub fn from_item(item: &StoreItem) -> Result<Self> {
        serde_json::from_value(item.attributes_value()).with_context(|| {
            format!(
                "Failed to decode suggestion {} / {}",
                item.hash_key, item.range_key
            )
        })
    }

    /// Partition key of the suggested partner
    pub fn match_pair_hash_key(&self) -> String {
        self.match_pair_type.partition_key(&self.match_pair_id)
    }
}
