//! Entity reconstruction from fragmented sub-records
//!
//! Items are grouped into an accumulator keyed by entity id, never by
//! adjacency: an index scan may return the sub-records of different entities
//! interleaved. Each sub-record kind fills exactly one slot of a typed
//! builder, so the result does not depend on the order items arrive in.

use super::models::*;
use crate::error::StoreError;
use crate::store::StoreItem;
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Builder for a startup profile
#[derive(Debug, Default)]
pub struct StartupBuilder {
    metadata: Option<StartupMetadata>,
    contacts: Option<Vec<Contact>>,
    milestones: Option<Vec<Milestone>>,
    founders: Option<Vec<Founder>>,
}

impl StartupBuilder {
    fn apply(&mut self, kind: RecordKind, item: &StoreItem) -> Result<()> {
        match kind {
            RecordKind::Metadata => self.metadata = Some(decode_object(item)?),
            RecordKind::Contacts => self.contacts = decode_list(item, kind)?,
            RecordKind::Milestones => self.milestones = decode_list(item, kind)?,
            RecordKind::Founders => self.founders = decode_list(item, kind)?,
            RecordKind::InvestmentCriteria | RecordKind::Portfolio => {}
        }
        Ok(())
    }

    pub fn build(self, startup_id: String) -> StartupProfile {
        StartupProfile {
            startup_id,
            metadata: self.metadata.unwrap_or_default(),
            contacts: self.contacts,
            milestones: self.milestones,
            founders: self.founders,
        }
    }
}

/// Builder for an enabler profile
#[derive(Debug, Default)]
pub struct EnablerBuilder {
    metadata: Option<EnablerMetadata>,
    contacts: Option<Vec<Contact>>,
    investment_criteria: Option<Vec<InvestmentCriteria>>,
    portfolio: Option<Vec<PortfolioItem>>,
}

impl EnablerBuilder {
    fn apply(&mut self, kind: RecordKind, item: &StoreItem) -> Result<()> {
        match kind {
            RecordKind::Metadata => self.metadata = Some(decode_object(item)?),
            RecordKind::Contacts => self.contacts = decode_list(item, kind)?,
            RecordKind::InvestmentCriteria => self.investment_criteria = decode_list(item, kind)?,
            RecordKind::Portfolio => self.portfolio = decode_list(item, kind)?,
            RecordKind::Milestones | RecordKind::Founders => {}
        }
        Ok(())
    }

    pub fn build(self, enabler_id: String) -> EnablerProfile {
        EnablerProfile {
            enabler_id,
            metadata: self.metadata.unwrap_or_default(),
            contacts: self.contacts,
            investment_criteria: self.investment_criteria,
            portfolio: self.portfolio,
        }
    }
}

/// In-progress entity of either variant
#[derive(Debug)]
enum EntityBuilder {
    Startup(StartupBuilder),
    Enabler(EnablerBuilder),
}

impl EntityBuilder {
    fn new(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::Startup => EntityBuilder::Startup(StartupBuilder::default()),
            EntityType::Enabler => EntityBuilder::Enabler(EnablerBuilder::default()),
        }
    }

    fn apply(&mut self, kind: RecordKind, item: &StoreItem) -> Result<()> {
        match self {
            EntityBuilder::Startup(b) => b.apply(kind, item),
            EntityBuilder::Enabler(b) => b.apply(kind, item),
        }
    }

    fn build(self, id: String) -> EntitySchema {
        match self {
            EntityBuilder::Startup(b) => EntitySchema::Startup(b.build(id)),
            EntityBuilder::Enabler(b) => EntitySchema::Enabler(b.build(id)),
        }
    }
}

/// Mapping from entity id to its in-progress builder.
///
/// Keyed by `(id, type)` so an id reused across variants yields two
/// entities instead of merging unrelated records.
#[derive(Debug, Default)]
pub struct EntityAccumulator {
    entries: BTreeMap<(String, EntityType), EntityBuilder>,
}

impl EntityAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw item into its entity.
    ///
    /// Items whose keys do not describe a profile sub-record are skipped.
    pub fn push(&mut self, item: &StoreItem) -> Result<()> {
        let Some((entity_type, id)) = split_partition_key(&item.hash_key) else {
            warn!(hash_key = %item.hash_key, "Skipping item with unrecognized partition key");
            return Ok(());
        };
        let Some(kind) = RecordKind::from_range_key(entity_type, &item.range_key) else {
            debug!(
                hash_key = %item.hash_key,
                range_key = %item.range_key,
                "Skipping non-profile item"
            );
            return Ok(());
        };

        self.entries
            .entry((id.to_string(), entity_type))
            .or_insert_with(|| EntityBuilder::new(entity_type))
            .apply(kind, item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build one schema per entity, ordered by id.
    pub fn finish(self) -> Vec<EntitySchema> {
        self.entries
            .into_iter()
            .map(|((id, _), builder)| builder.build(id))
            .collect()
    }
}

/// Reconstruct typed entities from raw items in any order.
pub fn reconstruct_entities<'a>(
    items: impl IntoIterator<Item = &'a StoreItem>,
) -> Result<Vec<EntitySchema>> {
    let mut acc = EntityAccumulator::new();
    for item in items {
        acc.push(item)?;
    }
    Ok(acc.finish())
}

fn decode_object<T: DeserializeOwned>(item: &StoreItem) -> Result<T> {
    serde_json::from_value(item.attributes_value()).map_err(|e| decode_error(item, e).into())
}

/// Decode the list attribute of an auxiliary record; an absent attribute
/// leaves the field unset.
fn decode_list<T: DeserializeOwned>(item: &StoreItem, kind: RecordKind) -> Result<Option<Vec<T>>> {
    let Some(value) = kind.field_name().and_then(|field| item.get(field)) else {
        return Ok(None);
    };
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| decode_error(item, e).into())
}

fn decode_error(item: &StoreItem, e: serde_json::Error) -> StoreError {
    StoreError::Decode {
        hash_key: item.hash_key.clone(),
        range_key: item.range_key.clone(),
        reason: e.to_string(),
    }
}
