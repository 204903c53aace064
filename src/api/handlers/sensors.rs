//! Sensor entity handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppError;
use crate::sensors::SensorView;
use crate::state::AppState;

/// GET /api/sensors - All sensor entities with current state
pub async fn list_sensors(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sensors = state.sensors.views().await;
    Json(serde_json::json!({
        "total": sensors.len(),
        "sensors": sensors,
    }))
}

/// GET /api/sensors/:unique_id - One sensor entity
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> Result<Json<SensorView>, AppError> {
    state
        .sensors
        .view(&unique_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Sensor {} not found", unique_id)))
}

/// GET /api/devices/:uid/sensors - Sensor entities of one camera
pub async fn get_device_sensors(
    State(state): State<AppState>,
    Path(device_uid): Path<String>,
) -> Result<Json<Vec<SensorView>>, AppError> {
    let sensors = state.sensors.device_views(&device_uid).await;
    if sensors.is_empty() {
        return Err(AppError::NotFound(format!("Device {} not found", device_uid)));
    }
    Ok(Json(sensors))
}
