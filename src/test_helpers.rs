//! Test helper factories and mock state builders
//!
//! Raw item factories mirror how profiles are laid out in the table, so
//! tests exercise the same reconstruction path as production.
#![allow(dead_code)]

use crate::entity::*;
use crate::llm::mock::MockMatchmaker;
use crate::llm::Matchmaker;
use crate::store::mock::MockItemStore;
use crate::store::StoreItem;
use crate::suggestion::{MatchedEntity, SuggestionMatch};
use crate::{AppState, Config, LlmConfig};
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Mock state builders
// ============================================================================

pub fn mock_config() -> Config {
    Config {
        neo4j_uri: "bolt://mock:7687".to_string(),
        neo4j_user: "neo4j".to_string(),
        neo4j_password: "mock".to_string(),
        server_port: 0,
        llm: LlmConfig::default(),
    }
}

/// AppState over an in-memory store and a covering mock matchmaker
pub fn mock_app_state() -> AppState {
    mock_app_state_with(Arc::new(MockItemStore::new()), Arc::new(MockMatchmaker::covering()))
}

pub fn mock_app_state_with(
    store: Arc<MockItemStore>,
    matchmaker: Arc<dyn Matchmaker>,
) -> AppState {
    AppState {
        store,
        matchmaker,
        config: Arc::new(mock_config()),
    }
}

// ============================================================================
// Raw item factories
// ============================================================================

fn gsi1pk(id: &str) -> String {
    format!("gsi-{}", id)
}

/// METADATA item of either variant
pub fn test_metadata_item(
    entity_type: EntityType,
    id: &str,
    name: &str,
    for_suggestion_generation: bool,
) -> StoreItem {
    let attributes = match entity_type {
        EntityType::Startup => json!({
            "startUpName": name,
            "email": format!("{}@startup.ph", id.to_lowercase()),
            "startupStage": "Seed",
            "industries": ["Agritech"],
            "revenueModel": ["B2B"],
            "description": format!("{} builds tools for Davao farmers", name),
            "location": {"address": "Davao City", "latlng": {"lat": 7.07, "lng": 125.61}},
            "dateFounded": "2022-05-01",
            "createdAt": "2024-11-02T09:30:00+08:00",
            "forSuggestionGeneration": for_suggestion_generation,
        }),
        EntityType::Enabler => json!({
            "enablerName": name,
            "email": format!("{}@enabler.ph", id.to_lowercase()),
            "organizationType": ["Angel Network"],
            "industryFocus": ["Agritech", "Fintech"],
            "supportType": ["Funding", "Mentorship"],
            "fundingStageFocus": ["Pre-seed", "Seed"],
            "investmentAmount": 500000.0,
            "startupStagePreference": ["Seed"],
            "preferredBusinessModels": ["B2B"],
            "createdAt": "2024-10-15T14:00:00+08:00",
            "forSuggestionGeneration": for_suggestion_generation,
        }),
    };

    StoreItem::new(
        entity_type.partition_key(id),
        RecordKind::Metadata.range_key(entity_type),
    )
    .with_gsi1pk(gsi1pk(id))
    .with_object(attributes)
}

fn aux_item(entity_type: EntityType, id: &str, kind: RecordKind, value: serde_json::Value) -> StoreItem {
    StoreItem::new(entity_type.partition_key(id), kind.range_key(entity_type))
        .with_gsi1pk(gsi1pk(id))
        .with_attribute(kind.field_name().unwrap_or_default(), value)
}

/// METADATA, CONTACTS, MILESTONES, FOUNDERS (in that order)
pub fn test_startup_items(id: &str, name: &str, for_suggestion_generation: bool) -> Vec<StoreItem> {
    let ty = EntityType::Startup;
    vec![
        test_metadata_item(ty, id, name, for_suggestion_generation),
        aux_item(
            ty,
            id,
            RecordKind::Contacts,
            json!([{"platform": "email", "value": format!("hello@{}.ph", id.to_lowercase())}]),
        ),
        aux_item(
            ty,
            id,
            RecordKind::Milestones,
            json!([{"title": "First 100 farmers", "dateAchieved": "2024-03-01"}]),
        ),
        aux_item(
            ty,
            id,
            RecordKind::Founders,
            json!([{
                "founderId": format!("{}-f1", id),
                "name": "Maria Santos",
                "role": "CEO",
                "contacts": [{"platform": "linkedin", "value": "maria-santos"}]
            }]),
        ),
    ]
}

/// METADATA, CONTACTS, INVESTMENT_CRITERIA (in that order)
pub fn test_enabler_items(id: &str, name: &str, for_suggestion_generation: bool) -> Vec<StoreItem> {
    let ty = EntityType::Enabler;
    vec![
        test_metadata_item(ty, id, name, for_suggestion_generation),
        aux_item(
            ty,
            id,
            RecordKind::Contacts,
            json!([{"platform": "website", "value": format!("https://{}.ph", id.to_lowercase())}]),
        ),
        aux_item(
            ty,
            id,
            RecordKind::InvestmentCriteria,
            json!([{"criteriaName": "Traction", "details": "At least 6 months of revenue"}]),
        ),
    ]
}

// ============================================================================
// Typed factories
// ============================================================================

pub fn test_startup(id: &str, name: &str, for_suggestion_generation: bool) -> EntitySchema {
    EntitySchema::Startup(StartupProfile {
        startup_id: id.to_string(),
        metadata: StartupMetadata {
            start_up_name: Some(name.to_string()),
            industries: Some(vec!["Agritech".to_string()]),
            startup_stage: Some("Seed".to_string()),
            for_suggestion_generation: Some(for_suggestion_generation),
            ..Default::default()
        },
        ..Default::default()
    })
}

pub fn test_enabler(id: &str, name: &str, for_suggestion_generation: bool) -> EntitySchema {
    EntitySchema::Enabler(EnablerProfile {
        enabler_id: id.to_string(),
        metadata: EnablerMetadata {
            enabler_name: Some(name.to_string()),
            industry_focus: Some(vec!["Agritech".to_string()]),
            for_suggestion_generation: Some(for_suggestion_generation),
            ..Default::default()
        },
        ..Default::default()
    })
}

/// A match between two `(id, type)` entities, named after their ids
pub fn test_match(
    a: (&str, EntityType),
    b: (&str, EntityType),
    certainty: f64,
) -> SuggestionMatch {
    let side = |(id, entity_type): (&str, EntityType)| MatchedEntity {
        entity_id: id.to_string(),
        entity_type,
        name: format!("{} name", id),
    };
    SuggestionMatch {
        match_pair: vec![side(a), side(b)],
        certainty,
        rationale: format!("{} and {} share an agritech focus", a.0, b.0),
    }
}
