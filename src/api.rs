//! HTTP API endpoints for read-only state.
//!
//! Everything that mutates the session goes through the WebSocket command surface.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::clues::PREBUILT_TOPICS;
use crate::protocol::PublicGame;
use crate::state::{AppState, MAX_GRID_SIZE, MIN_GRID_SIZE};

/// Response structure for topic selection in the create form
#[derive(Debug, Clone, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<String>,
    /// Configured clue providers in the order they are tried (empty = clues must be supplied)
    pub providers: Vec<String>,
    pub min_grid_size: usize,
    pub max_grid_size: usize,
}

/// Routes under /api
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/topics", get(list_topics))
        .route("/api/players/{player_id}", get(get_player))
}

/// Public snapshot of the current session.
///
/// GET /api/state
///
/// Returns `null` when no session exists.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<Option<PublicGame>> {
    Json(state.public_snapshot().await)
}

/// GET /api/topics
pub async fn list_topics(State(state): State<Arc<AppState>>) -> Json<TopicsResponse> {
    let providers = state
        .clues
        .as_ref()
        .map(|manager| manager.provider_names())
        .unwrap_or_default();

    Json(TopicsResponse {
        topics: PREBUILT_TOPICS.iter().map(|t| t.to_string()).collect(),
        providers,
        min_grid_size: MIN_GRID_SIZE,
        max_grid_size: MAX_GRID_SIZE,
    })
}

/// A player's own ticket and standing.
///
/// GET /api/players/{player_id}
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Response {
    match state.player_view(&player_id).await {
        Some(view) => Json(view).into_response(),
        None => (StatusCode::NOT_FOUND, "Player not found").into_response(),
    }
}
