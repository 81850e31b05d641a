//! Suggestion orchestrator
//!
//! One run: load candidates, select targets, round 1 against every target,
//! a single round 2 for targets round 1 left uncovered, persist everything,
//! then clear `forSuggestionGeneration` on the targets. Any failure ends the
//! run with an [`ErrorResponse`]; no partial match list is returned.

use crate::entity::{EntityRepository, EntitySchema};
use crate::error::ErrorResponse;
use crate::llm::Matchmaker;
use crate::store::{ItemStore, StoreItem};
use crate::suggestion::{SuggestionMatchList, SuggestionRepository};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drives matchmaking runs
pub struct SuggestionOrchestrator {
    entities: EntityRepository,
    suggestions: SuggestionRepository,
    matchmaker: Arc<dyn Matchmaker>,
}

impl SuggestionOrchestrator {
    pub fn new(store: Arc<dyn ItemStore>, matchmaker: Arc<dyn Matchmaker>) -> Self {
        Self {
            entities: EntityRepository::new(store.clone()),
            suggestions: SuggestionRepository::new(store),
            matchmaker,
        }
    }

    /// Generate suggestions for every queued entity, optionally restricted to
    /// `entity_ids_selected` (an empty filter means no filter).
    pub async fn get_suggestions(
        &self,
        entity_ids_selected: Option<&[String]>,
    ) -> Result<SuggestionMatchList, ErrorResponse> {
        let filter = entity_ids_selected.filter(|ids| !ids.is_empty());
        debug!(?filter, "Starting suggestion generation");

        let (available, raw_items) = self.entities.get_entity_list().await.map_err(|e| {
            warn!(status = %e.status, "Failed to get entity list: {}", e.response);
            e
        })?;
        info!(
            entities_available_count = available.len(),
            "Successfully retrieved entity list"
        );

        let targets = select_targets(&available, filter);
        if targets.is_empty() {
            error!("No entities selected");
            return Err(ErrorResponse::bad_request("No entities selected"));
        }
        info!(
            entities_selected_count = targets.len(),
            "Filtered selected entities"
        );

        // Round 1
        let mut all_matches = self
            .matchmaker
            .generate_response(&available, &targets)
            .await
            .map_err(|e| {
                warn!("Failed to generate initial suggestions: {}", e.response);
                e
            })?;
        let covered = all_matches.covered_keys();
        info!(
            entities_with_suggestions_count = covered.len(),
            matches_generated = all_matches.len(),
            "Initial suggestions generated"
        );

        // Round 2, once, for whatever round 1 missed
        let missing: Vec<EntitySchema> = targets
            .iter()
            .filter(|t| !covered.contains(&t.hash_key()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            info!(
                missing_entities_count = missing.len(),
                "Generating additional suggestions for missing entities"
            );
            let additional = self
                .matchmaker
                .generate_response(&available, &missing)
                .await
                .map_err(|e| {
                    warn!("Failed to generate additional suggestions: {}", e.response);
                    e
                })?;

            let covered_now = additional.covered_keys();
            let still_missing = missing
                .iter()
                .filter(|t| !covered_now.contains(&t.hash_key()))
                .count();
            if still_missing > 0 {
                warn!(
                    still_missing,
                    "Some selected entities received no suggestion after the second round"
                );
            }
            info!(
                additional_matches_count = additional.len(),
                "Additional suggestions generated successfully"
            );
            all_matches.extend(additional);
        }

        self.suggestions
            .save_suggestions(&all_matches)
            .await
            .map_err(|e| {
                warn!("Failed to save suggestions: {}", e.response);
                e
            })?;

        let target_keys: HashSet<String> = targets.iter().map(EntitySchema::hash_key).collect();
        let target_records: Vec<StoreItem> = raw_items
            .into_iter()
            .filter(|item| target_keys.contains(&item.hash_key))
            .collect();
        self.entities
            .update_entity_for_suggestion_generation(&target_records, false)
            .await
            .map_err(|e| {
                error!(
                    "Failed to update entity for suggestion generation: {}",
                    e.response
                );
                e
            })?;

        info!(
            total_matches_count = all_matches.len(),
            "Suggestion generation completed successfully"
        );
        Ok(all_matches)
    }
}

/// Entities queued for matchmaking, restricted to `filter` when given.
pub fn select_targets(available: &[EntitySchema], filter: Option<&[String]>) -> Vec<EntitySchema> {
    available
        .iter()
        .filter(|e| e.for_suggestion_generation())
        .filter(|e| filter.map_or(true, |ids| ids.iter().any(|id| id == e.id())))
        .cloned()
        .collect()
}
