//! API module - HTTP handlers and routes

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        // Coordinator
        .route("/api/status", get(handlers::get_status))
        .route("/api/refresh", post(handlers::trigger_refresh))
        // Devices and sensors
        .route("/api/devices", get(handlers::list_devices))
        .route("/api/devices/:uid/sensors", get(handlers::get_device_sensors))
        .route("/api/sensors", get(handlers::list_sensors))
        .route("/api/sensors/:unique_id", get(handlers::get_sensor))
        // Credential validation
        .route("/api/config/validate", post(handlers::validate_credentials))
}
