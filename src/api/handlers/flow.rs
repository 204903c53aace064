//! Credential validation handler

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::flow::validate_input;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/config/validate - Check an account before it is configured
pub async fn validate_credentials(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Json<serde_json::Value> {
    match validate_input(&state.ubox_template, &req.username, &req.password).await {
        Ok(info) => Json(serde_json::json!({
            "ok": true,
            "title": info.title,
        })),
        Err(e) => Json(serde_json::json!({
            "ok": false,
            "errors": { "base": e.code() },
        })),
    }
}
