//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::{conversion::room_detail, http::RoomDetailDto},
    ui::state::AppState,
};

/// Liveness endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

/// Health check endpoint
pub async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get room detail by ID
///
/// Rooms are never created explicitly, so an unknown id returns the defaults.
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    match state.room_snapshot_query.fetch(&room_id).await {
        Ok(snapshot) => Ok(Json(room_detail(room_id, snapshot))),
        Err(e) => {
            tracing::error!("Failed to read room '{}': {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
