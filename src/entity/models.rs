//! Entity models: Startups and Enablers
//!
//! A profile is stored as several items sharing the partition key
//! `"<TYPE>#<id>"`; the sort key suffix says which sub-record an item holds.

use crate::store::StoreItem;
use anyhow::{anyhow, Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key delimiter of the single-table layout.
pub const KEY_DELIMITER: char = '#';

// ============================================================================
// Entity type and record kinds
// ============================================================================

/// Variant of a profile entity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Startup,
    Enabler,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Startup => "STARTUP",
            EntityType::Enabler => "ENABLER",
        }
    }

    /// Partition key shared by every sub-record of the entity
    pub fn partition_key(&self, id: &str) -> String {
        format!("{}{}{}", self.as_str(), KEY_DELIMITER, id)
    }

    /// Sub-records besides METADATA that this variant may have
    pub fn auxiliary_records(&self) -> &'static [RecordKind] {
        match self {
            EntityType::Startup => &[
                RecordKind::Contacts,
                RecordKind::Milestones,
                RecordKind::Founders,
            ],
            EntityType::Enabler => &[
                RecordKind::Contacts,
                RecordKind::InvestmentCriteria,
                RecordKind::Portfolio,
            ],
        }
    }

    /// Auxiliary record holding the given profile field (`"contacts"`, `"portfolio"`...)
    pub fn record_for_field(&self, field: &str) -> Option<RecordKind> {
        self.auxiliary_records()
            .iter()
            .copied()
            .find(|kind| kind.field_name() == Some(field))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STARTUP" => Ok(EntityType::Startup),
            "ENABLER" => Ok(EntityType::Enabler),
            _ => Err(anyhow!("Unknown entity type: {}", s)),
        }
    }
}

/// Split a partition key `"<TYPE>#<id>"` on its first delimiter.
pub fn split_partition_key(hash_key: &str) -> Option<(EntityType, &str)> {
    let (ty, id) = hash_key.split_once(KEY_DELIMITER)?;
    if id.is_empty() {
        return None;
    }
    Some((ty.parse().ok()?, id))
}

/// Kind of profile sub-record, identified by the sort key suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Metadata,
    Contacts,
    Milestones,
    Founders,
    InvestmentCriteria,
    Portfolio,
}

impl RecordKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            RecordKind::Metadata => "METADATA",
            RecordKind::Contacts => "CONTACTS",
            RecordKind::Milestones => "MILESTONES",
            RecordKind::Founders => "FOUNDERS",
            RecordKind::InvestmentCriteria => "INVESTMENT_CRITERIA",
            RecordKind::Portfolio => "PORTFOLIO",
        }
    }

    /// Attribute name carrying the list of an auxiliary record
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            RecordKind::Metadata => None,
            RecordKind::Contacts => Some("contacts"),
            RecordKind::Milestones => Some("milestones"),
            RecordKind::Founders => Some("founders"),
            RecordKind::InvestmentCriteria => Some("investmentCriteria"),
            RecordKind::Portfolio => Some("portfolio"),
        }
    }

    pub fn range_key(&self, entity_type: EntityType) -> String {
        format!("{}{}{}", entity_type.as_str(), KEY_DELIMITER, self.suffix())
    }

    /// Resolve a sort key to a record kind valid for `entity_type`.
    ///
    /// Returns `None` for rows that are not profile sub-records (suggestions,
    /// saved profiles) and for suffixes the variant does not have.
    pub fn from_range_key(entity_type: EntityType, range_key: &str) -> Option<Self> {
        let suffix = range_key
            .strip_prefix(entity_type.as_str())?
            .strip_prefix(KEY_DELIMITER)?;
        if suffix == RecordKind::Metadata.suffix() {
            return Some(RecordKind::Metadata);
        }
        entity_type
            .auxiliary_records()
            .iter()
            .copied()
            .find(|kind| kind.suffix() == suffix)
    }
}

// ============================================================================
// Nested value types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<LatLng>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_achieved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Founder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    // Stored attribute name keeps the lowercase "k"
    #[serde(
        default,
        rename = "photoObjectkey",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_object_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_startup_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_supported: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_supporting_to_present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_and_impact: Option<String>,
}

// ============================================================================
// METADATA records
// ============================================================================

/// Fields held by a `STARTUP#METADATA` item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_up_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_object_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_founded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_model: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_suggestion_generation: Option<bool>,
}

/// Fields held by an `ENABLER#METADATA` item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnablerMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabler_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_object_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_founded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_focus: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_type: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage_focus: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_stage_preference: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_business_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_suggestion_generation: Option<bool>,
}

// ============================================================================
// Reconstructed profiles
// ============================================================================

/// A startup profile assembled from its sub-records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupProfile {
    pub startup_id: String,
    #[serde(flatten)]
    pub metadata: StartupMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<Milestone>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founders: Option<Vec<Founder>>,
}

/// An enabler profile assembled from its sub-records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnablerProfile {
    pub enabler_id: String,
    #[serde(flatten)]
    pub metadata: EnablerMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_criteria: Option<Vec<InvestmentCriteria>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<Vec<PortfolioItem>>,
}

/// A reconstructed entity, tagged by variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum EntitySchema {
    Startup(StartupProfile),
    Enabler(EnablerProfile),
}

impl EntitySchema {
    pub fn id(&self) -> &str {
        match self {
            EntitySchema::Startup(s) => &s.startup_id,
            EntitySchema::Enabler(e) => &e.enabler_id,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            EntitySchema::Startup(_) => EntityType::Startup,
            EntitySchema::Enabler(_) => EntityType::Enabler,
        }
    }

    /// Display name (`startUpName` / `enablerName`), if METADATA was seen
    pub fn name(&self) -> Option<&str> {
        match self {
            EntitySchema::Startup(s) => s.metadata.start_up_name.as_deref(),
            EntitySchema::Enabler(e) => e.metadata.enabler_name.as_deref(),
        }
    }

    pub fn hash_key(&self) -> String {
        self.entity_type().partition_key(self.id())
    }

    /// Whether the entity is queued for the next matchmaking pass
    pub fn for_suggestion_generation(&self) -> bool {
        match self {
            EntitySchema::Startup(s) => s.metadata.for_suggestion_generation,
            EntitySchema::Enabler(e) => e.metadata.for_suggestion_generation,
        }
        .unwrap_or(false)
    }

    /// Mark the entity as queued (or not) for matchmaking
    pub fn set_for_suggestion_generation(&mut self, value: bool) {
        match self {
            EntitySchema::Startup(s) => s.metadata.for_suggestion_generation = Some(value),
            EntitySchema::Enabler(e) => e.metadata.for_suggestion_generation = Some(value),
        }
    }

    fn set_created_at_if_missing(&mut self, created_at: &str) {
        let slot = match self {
            EntitySchema::Startup(s) => &mut s.metadata.created_at,
            EntitySchema::Enabler(e) => &mut e.metadata.created_at,
        };
        if slot.is_none() {
            *slot = Some(created_at.to_string());
        }
    }

    /// Decompose the profile into its physical items.
    ///
    /// METADATA is always produced; an auxiliary item only when its list is set.
    /// Every item carries `gsi1pk` so it shows up in the index scan.
    pub fn to_items(&self, gsi1pk: &str, created_at: &str) -> Result<Vec<StoreItem>> {
        let mut entity = self.clone();
        entity.set_created_at_if_missing(created_at);

        let entity_type = entity.entity_type();
        let hash_key = entity.hash_key();
        let record = |kind: RecordKind| {
            StoreItem::new(hash_key.clone(), kind.range_key(entity_type)).with_gsi1pk(gsi1pk)
        };

        let metadata = match &entity {
            EntitySchema::Startup(s) => serde_json::to_value(&s.metadata),
            EntitySchema::Enabler(e) => serde_json::to_value(&e.metadata),
        }
        .with_context(|| format!("Failed to encode metadata of {}", hash_key))?;

        let mut items = vec![record(RecordKind::Metadata).with_object(metadata)];

        let auxiliaries: Vec<(RecordKind, Option<serde_json::Value>)> = match &entity {
            EntitySchema::Startup(s) => vec![
                (RecordKind::Contacts, encode_list(&s.contacts)?),
                (RecordKind::Milestones, encode_list(&s.milestones)?),
                (RecordKind::Founders, encode_list(&s.founders)?),
            ],
            EntitySchema::Enabler(e) => vec![
                (RecordKind::Contacts, encode_list(&e.contacts)?),
                (RecordKind::InvestmentCriteria, encode_list(&e.investment_criteria)?),
                (RecordKind::Portfolio, encode_list(&e.portfolio)?),
            ],
        };

        for (kind, value) in auxiliaries {
            if let (Some(value), Some(field)) = (value, kind.field_name()) {
                items.push(record(kind).with_attribute(field, value));
            }
        }

        Ok(items)
    }
}

fn encode_list<T: Serialize>(list: &Option<Vec<T>>) -> Result<Option<serde_json::Value>> {
    list.as_ref()
        .map(serde_json::to_value)
        .transpose()
        .context("Failed to encode auxiliary record")
}
