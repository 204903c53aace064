//! Coordinator and device snapshot handlers

use axum::{extract::State, Json};

use crate::coordinator::CoordinatorStatus;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/status - Coordinator state
pub async fn get_status(State(state): State<AppState>) -> Json<CoordinatorStatus> {
    Json(state.coordinator.status().await)
}

/// GET /api/devices - Normalized snapshot from the last successful poll
pub async fn list_devices(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.coordinator.snapshot().await;
    let devices = snapshot.data.unwrap_or_default();

    Json(serde_json::json!({
        "last_update_success": snapshot.last_update_success,
        "last_update_success_time": snapshot.last_update_success_time,
        "total": devices.len(),
        "devices": devices,
    }))
}

/// POST /api/refresh - Poll the portal now
pub async fn trigger_refresh(
    State(state): State<AppState>,
) -> Result<Json<CoordinatorStatus>, AppError> {
    state.coordinator.refresh().await?;
    state.sensors.sync_entities().await;
    Ok(Json(state.coordinator.status().await))
}
