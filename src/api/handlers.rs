//! API request handlers

use crate::entity::{EntitySchema, EntityType};
use crate::error::ErrorResponse;
use crate::feed::{parse_fields, FeedProfile, SavedProfile};
use crate::suggestion::SuggestionMatchList;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// Health check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: bool,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ok = state.store.health_check().await.unwrap_or(false);

    let (code, status) = if store_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: store_ok,
        }),
    )
}

// ============================================================================
// Entities
// ============================================================================

/// List every indexed profile
pub async fn list_entities(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntitySchema>>, ErrorResponse> {
    let (entities, _) = state.entities().get_entity_list().await?;
    Ok(Json(entities))
}

// ============================================================================
// Suggestion generation
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSuggestionsRequest {
    #[serde(default)]
    pub entity_ids: Option<Vec<String>>,
}

/// Run a matchmaking round. The body is optional; `{}` or no body selects
/// every queued entity.
pub async fn generate_suggestions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuggestionMatchList>, ErrorResponse> {
    let req: GenerateSuggestionsRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateSuggestionsRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ErrorResponse::bad_request(format!("Invalid request body: {}", e)))?
    };

    info!(filter = ?req.entity_ids, "Suggestion generation requested");
    let matches = state
        .orchestrator()
        .get_suggestions(req.entity_ids.as_deref())
        .await?;
    Ok(Json(matches))
}

// ============================================================================
// Feed
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    pub fields: Option<String>,
}

fn parse_entity_type(raw: &str) -> Result<EntityType, ErrorResponse> {
    raw.parse()
        .map_err(|e: anyhow::Error| ErrorResponse::bad_request(e.to_string()))
}

pub async fn get_suggested_profiles(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Vec<FeedProfile>>, ErrorResponse> {
    let entity_type = parse_entity_type(&entity_type)?;
    let fields = parse_fields(query.fields.as_deref());
    debug!(%entity_type, entity_id, ?fields, "Fetching suggested profiles");

    Ok(Json(
        state
            .feed()
            .suggested_profiles(entity_type, &entity_id, &fields)
            .await,
    ))
}

pub async fn get_saved_profiles(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Vec<FeedProfile>>, ErrorResponse> {
    let entity_type = parse_entity_type(&entity_type)?;
    let fields = parse_fields(query.fields.as_deref());

    Ok(Json(
        state
            .feed()
            .saved_profiles(entity_type, &entity_id, &fields)
            .await,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionSavedResponse {
    pub match_pair_id: String,
    pub match_pair_type: EntityType,
    pub is_saved: bool,
}

async fn set_suggestion_saved(
    state: AppState,
    (entity_type, entity_id, pair_type, pair_id): (String, String, String, String),
    is_saved: bool,
) -> Result<Json<SuggestionSavedResponse>, ErrorResponse> {
    let entity_type = parse_entity_type(&entity_type)?;
    let pair_type = parse_entity_type(&pair_type)?;

    state
        .feed()
        .set_suggestion_saved(entity_type, &entity_id, pair_type, &pair_id, is_saved)
        .await?;

    Ok(Json(SuggestionSavedResponse {
        match_pair_id: pair_id,
        match_pair_type: pair_type,
        is_saved,
    }))
}

pub async fn mark_suggestion_saved(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String, String)>,
) -> Result<Json<SuggestionSavedResponse>, ErrorResponse> {
    set_suggestion_saved(state, path, true).await
}

pub async fn unmark_suggestion_saved(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String, String)>,
) -> Result<Json<SuggestionSavedResponse>, ErrorResponse> {
    set_suggestion_saved(state, path, false).await
}

pub async fn save_profile(
    State(state): State<AppState>,
    Path((entity_type, entity_id, saved_type, saved_id)): Path<(String, String, String, String)>,
) -> Result<(StatusCode, Json<SavedProfile>), ErrorResponse> {
    let entity_type = parse_entity_type(&entity_type)?;
    let saved_type = parse_entity_type(&saved_type)?;

    let saved = state
        .feed()
        .save_profile(entity_type, &entity_id, saved_type, &saved_id)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn unsave_profile(
    State(state): State<AppState>,
    Path((entity_type, entity_id, saved_type, saved_id)): Path<(String, String, String, String)>,
) -> Result<StatusCode, ErrorResponse> {
    let entity_type = parse_entity_type(&entity_type)?;
    let saved_type = parse_entity_type(&saved_type)?;

    state
        .feed()
        .unsave_profile(entity_type, &entity_id, saved_type, &saved_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Error handling
// ============================================================================

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let body = Json(serde_json::json!({
            "error": self.response,
            "status": self.status.as_u16(),
        }));

        (self.status, body).into_response()
    }
}
