//! API route definitions

use super::handlers;
use crate::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Entities
        // ====================================================================
        .route("/api/entities", get(handlers::list_entities))
        // ====================================================================
        // Matchmaking
        // ====================================================================
        .route(
            "/api/suggestions/generate",
            post(handlers::generate_suggestions),
        )
        // ====================================================================
        // Feed
        // ====================================================================
        .route(
            "/api/entities/{entity_type}/{entity_id}/suggestions",
            get(handlers::get_suggested_profiles),
        )
        .route(
            "/api/entities/{entity_type}/{entity_id}/suggestions/{pair_type}/{pair_id}/saved",
            put(handlers::mark_suggestion_saved).delete(handlers::unmark_suggestion_saved),
        )
        .route(
            "/api/entities/{entity_type}/{entity_id}/saved-profiles",
            get(handlers::get_saved_profiles),
        )
        .route(
            "/api/entities/{entity_type}/{entity_id}/saved-profiles/{pair_type}/{pair_id}",
            put(handlers::save_profile).delete(handlers::unsave_profile),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
