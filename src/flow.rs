//! Credential validation for new portal accounts
//!
//! Mirrors the one-time setup form: the submitted account is used to log in
//! and fetch the device list once before it is accepted.

use serde::Serialize;
use thiserror::Error;

use crate::config::UboxConfig;
use crate::ubox::{UboxClient, UboxError};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FlowInfo {
    pub title: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Cannot connect: {0}")]
    CannotConnect(String),

    #[error("Invalid authentication: {0}")]
    InvalidAuth(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl FlowError {
    /// Error key shown under the form's `base` field
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::CannotConnect(_) => "cannot_connect",
            FlowError::InvalidAuth(_) => "invalid_auth",
            FlowError::Unknown(_) => "unknown",
        }
    }
}

impl From<UboxError> for FlowError {
    fn from(err: UboxError) -> Self {
        match err {
            UboxError::Auth(msg) => FlowError::InvalidAuth(msg),
            UboxError::Api(msg) => FlowError::CannotConnect(msg),
        }
    }
}

/// Validate credentials against the portal
///
/// `template` supplies the endpoints and client identity; its credentials are
/// replaced by the submitted ones.
pub async fn validate_input(
    template: &UboxConfig,
    username: &str,
    password: &str,
) -> Result<FlowInfo, FlowError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(FlowError::InvalidAuth(
            "username and password are required".to_string(),
        ));
    }

    let mut config = template.clone();
    config.username = username.to_string();
    config.password = password.to_string();

    let client = UboxClient::new(config).map_err(|e| FlowError::Unknown(e.to_string()))?;

    let result = async {
        client.authenticate().await?;
        client.get_device_list().await
    }
    .await;
    client.close().await;

    match result {
        Ok(devices) => {
            tracing::info!(
                "[Flow] Successfully connected to Ubox API, found {} devices",
                devices.len()
            );
            Ok(FlowInfo {
                title: format!("Ubia Cameras ({})", username),
            })
        }
        Err(e) => {
            tracing::warn!("[Flow] Validation failed for {}: {}", username, e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn template(base_url: &str) -> UboxConfig {
        let mut config = UboxConfig::with_credentials("", "");
        config.base_url = base_url.to_string();
        config.timeout_secs = 2;
        config
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            FlowError::from(UboxError::Auth("x".into())).code(),
            "invalid_auth"
        );
        assert_eq!(
            FlowError::from(UboxError::Api("x".into())).code(),
            "cannot_connect"
        );
        assert_eq!(FlowError::Unknown("x".into()).code(), "unknown");
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_without_network() {
        let err = validate_input(&template("http://127.0.0.1:1"), "  ", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_auth");
    }

    #[tokio::test]
    async fn test_success_title() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "data": { "Token": "tok" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/user/device_list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "data": { "infos": [] }
            })))
            .mount(&server)
            .await;

        let info = validate_input(&template(&server.uri()), "me@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(info.title, "Ubia Cameras (me@example.com)");
    }

    #[tokio::test]
    async fn test_invalid_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = validate_input(&template(&server.uri()), "me@example.com", "bad")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_auth");
    }

    #[tokio::test]
    async fn test_cannot_connect() {
        let err = validate_input(&template("http://127.0.0.1:1"), "me@example.com", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "cannot_connect");
    }
}
