//! Suggestion feed usecases
//!
//! Serves an entity's suggested and saved profiles. Partner profiles are
//! fetched with one batch get: the METADATA record of every partner plus
//! the auxiliary records the caller asked for.

use super::models::{FeedProfile, SavedProfile};
use super::repository::SavedProfileRepository;
use crate::entity::{EntityRepository, EntitySchema, EntityType, RecordKind};
use crate::error::ErrorResponse;
use crate::store::{ItemKey, ItemStore};
use crate::suggestion::{Suggestion, SuggestionRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub struct SuggestionFeed {
    entities: EntityRepository,
    suggestions: SuggestionRepository,
    saved: SavedProfileRepository,
}

impl SuggestionFeed {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            entities: EntityRepository::new(store.clone()),
            suggestions: SuggestionRepository::new(store.clone()),
            saved: SavedProfileRepository::new(store),
        }
    }

    /// Profiles suggested to an entity, best match first.
    ///
    /// Any store failure yields an empty feed.
    pub async fn suggested_profiles(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        fields: &[String],
    ) -> Vec<FeedProfile> {
        match self.try_suggested_profiles(entity_type, entity_id, fields).await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(%entity_type, entity_id, "Returning empty suggestion feed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_suggested_profiles(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        fields: &[String],
    ) -> Result<Vec<FeedProfile>, ErrorResponse> {
        let mut suggestions = self
            .suggestions
            .get_suggestions(entity_type, entity_id)
            .await?;
        suggestions.sort_by(|a, b| {
            b.certainty
                .total_cmp(&a.certainty)
                .then_with(|| a.match_pair_id.cmp(&b.match_pair_id))
        });

        let targets: Vec<(EntityType, &str)> = suggestions
            .iter()
            .map(|s| (s.match_pair_type, s.match_pair_id.as_str()))
            .collect();
        let mut by_key = self.fetch_profiles(&targets, fields).await?;

        Ok(suggestions
            .iter()
            .filter_map(|s: &Suggestion| {
                let entity = by_key.remove(&(s.match_pair_type, s.match_pair_id.clone()))?;
                Some(FeedProfile {
                    entity,
                    certainty: Some(s.certainty * 100.0),
                    rationale: Some(s.rationale.clone()),
                    is_saved: s.is_saved.unwrap_or(false),
                })
            })
            .collect())
    }

    /// Profiles an entity has saved, all flagged `isSaved`.
    ///
    /// Any store failure yields an empty feed.
    pub async fn saved_profiles(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        fields: &[String],
    ) -> Vec<FeedProfile> {
        let result = async {
            let saved = self.saved.get_saved_profiles(entity_type, entity_id).await?;
            let targets: Vec<(EntityType, &str)> = saved
                .iter()
                .map(|p: &SavedProfile| (p.saved_profile_type, p.saved_profile_id.as_str()))
                .collect();
            let by_key = self.fetch_profiles(&targets, fields).await?;
            Ok::<_, ErrorResponse>(
                by_key
                    .into_values()
                    .map(|entity| FeedProfile {
                        entity,
                        certainty: None,
                        rationale: None,
                        is_saved: true,
                    })
                    .collect::<Vec<_>>(),
            )
        }
        .await;

        match result {
            Ok(mut profiles) => {
                profiles.sort_by(|a, b| a.entity.id().cmp(b.entity.id()));
                profiles
            }
            Err(e) => {
                warn!(%entity_type, entity_id, "Returning empty saved profiles: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn set_suggestion_saved(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        pair_type: EntityType,
        pair_id: &str,
        is_saved: bool,
    ) -> Result<(), ErrorResponse> {
        self.suggestions
            .set_suggestion_saved(entity_type, entity_id, pair_type, pair_id, is_saved)
            .await
    }

    pub async fn save_profile(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        saved_type: EntityType,
        saved_id: &str,
    ) -> Result<SavedProfile, ErrorResponse> {
        self.saved
            .save_profile(entity_type, entity_id, saved_type, saved_id)
            .await
    }

    pub async fn unsave_profile(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        saved_type: EntityType,
        saved_id: &str,
    ) -> Result<(), ErrorResponse> {
        self.saved
            .unsave_profile(entity_type, entity_id, saved_type, saved_id)
            .await
    }

    /// Batch-get METADATA plus requested auxiliaries of every target.
    async fn fetch_profiles(
        &self,
        targets: &[(EntityType, &str)],
        fields: &[String],
    ) -> Result<HashMap<(EntityType, String), EntitySchema>, ErrorResponse> {
        let keys = profile_item_keys(targets, fields);
        let entities = self.entities.batch_get_entities(&keys).await?;
        Ok(entities
            .into_iter()
            .map(|e| ((e.entity_type(), e.id().to_string()), e))
            .collect())
    }
}

/// Item keys for `targets`: METADATA always, auxiliaries only when their
/// field is in `fields` and exists for the target's variant.
pub fn profile_item_keys(targets: &[(EntityType, &str)], fields: &[String]) -> Vec<ItemKey> {
    let mut keys = Vec::new();
    for (entity_type, id) in targets {
        let hash_key = entity_type.partition_key(id);
        keys.push(ItemKey::new(
            hash_key.clone(),
            RecordKind::Metadata.range_key(*entity_type),
        ));
        for kind in fields
            .iter()
            .filter_map(|f| entity_type.record_for_field(f))
        {
            keys.push(ItemKey::new(hash_key.clone(), kind.range_key(*entity_type)));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockItemStore;
    use crate::suggestion::SuggestionMatchList;
    use crate::test_helpers::*;

    async fn seeded_feed() -> (Arc<MockItemStore>, SuggestionFeed) {
        let mut items = test_startup_items("s1", "Acme", false);
        items.extend(test_enabler_items("e1", "Mindanao Angels", false));
        items.extend(test_startup_items("s2", "Durian Labs", false));
        let store = Arc::new(MockItemStore::new().with_items(items).await);

        SuggestionRepository::new(store.clone())
            .save_suggestions(&SuggestionMatchList::new(vec![
                test_match(("s1", EntityType::Startup), ("e1", EntityType::Enabler), 0.82),
                test_match(("s1", EntityType::Startup), ("s2", EntityType::Startup), 0.91),
            ]))
            .await
            .unwrap();

        let feed = SuggestionFeed::new(store.clone());
        (store, feed)
    }

    #[test]
    fn test_profile_item_keys_respect_variant_fields() {
        let fields = vec!["founders".to_string(), "portfolio".to_string()];
        let keys = profile_item_keys(
            &[(EntityType::Startup, "s1"), (EntityType::Enabler, "e1")],
            &fields,
        );
        assert_eq!(
            keys,
            vec![
                ItemKey::new("STARTUP#s1", "STARTUP#METADATA"),
                ItemKey::new("STARTUP#s1", "STARTUP#FOUNDERS"),
                ItemKey::new("ENABLER#e1", "ENABLER#METADATA"),
                ItemKey::new("ENABLER#e1", "ENABLER#PORTFOLIO"),
            ]
        );
    }

    #[tokio::test]
    async fn test_suggested_profiles_scale_certainty_and_sort() {
        let (_, feed) = seeded_feed().await;

        let profiles = feed
            .suggested_profiles(EntityType::Startup, "s1", &["founders".to_string()])
            .await;
        assert_eq!(profiles.len(), 2);

        assert_eq!(profiles[0].entity.id(), "s2");
        assert!((profiles[0].certainty.unwrap() - 91.0).abs() < 1e-9);
        let EntitySchema::Startup(s2) = &profiles[0].entity else {
            panic!("expected startup");
        };
        assert!(s2.founders.is_some());
        assert!(s2.contacts.is_none());

        assert_eq!(profiles[1].entity.id(), "e1");
        assert!(!profiles[1].is_saved);
    }

    #[tokio::test]
    async fn test_suggestion_saved_flag_reaches_feed() {
        let (_, feed) = seeded_feed().await;
        feed.set_suggestion_saved(EntityType::Startup, "s1", EntityType::Enabler, "e1", true)
            .await
            .unwrap();

        let profiles = feed.suggested_profiles(EntityType::Startup, "s1", &[]).await;
        let e1 = profiles.iter().find(|p| p.entity.id() == "e1").unwrap();
        assert!(e1.is_saved);
    }

    #[tokio::test]
    async fn test_feed_failure_is_empty() {
        let mut items = test_startup_items("s1", "Acme", false);
        items.extend(test_enabler_items("e1", "Mindanao Angels", false));
        let store = Arc::new(
            MockItemStore::new()
                .with_items(items)
                .await
                .failing_batch_get(),
        );
        SuggestionRepository::new(store.clone())
            .save_suggestions(&SuggestionMatchList::new(vec![test_match(
                ("s1", EntityType::Startup),
                ("e1", EntityType::Enabler),
                0.82,
            )]))
            .await
            .unwrap();
        let feed = SuggestionFeed::new(store);

        assert!(feed
            .suggested_profiles(EntityType::Startup, "s1", &[])
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_saved_profiles_are_flagged() {
        let (_, feed) = seeded_feed().await;
        feed.save_profile(EntityType::Enabler, "e1", EntityType::Startup, "s1")
            .await
            .unwrap();

        let profiles = feed
            .saved_profiles(EntityType::Enabler, "e1", &["contacts".to_string()])
            .await;
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].is_saved);
        assert_eq!(profiles[0].entity.name(), Some("Acme"));

        feed.unsave_profile(EntityType::Enabler, "e1", EntityType::Startup, "s1")
            .await
            .unwrap();
        assert!(feed
            .saved_profiles(EntityType::Enabler, "e1", &[])
            .await
            .is_empty());
    }
}
