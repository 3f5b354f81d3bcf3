//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{infrastructure::dto::http::RaceSnapshotDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current race: phase, text, start time and standings
pub async fn race_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RaceSnapshotDto>, StatusCode> {
    match state.coordinator.snapshot().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            tracing::error!("Failed to read race state: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
