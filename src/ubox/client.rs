//! Ubox portal HTTP client
//!
//! Login yields a user token that is sent on every device-list request.
//! An expired token (HTTP 401 or a positive `code` in the body) is dropped,
//! the client logs in again and retries the request once.

use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

use crate::config::UboxConfig;
use crate::ubox::models::DeviceRecord;
use crate::ubox::normalize::normalize_device_list;
use crate::ubox::signature::hmac_sha1_base64;

/// Header carrying the user token on authenticated requests
const AUTH_TOKEN_HEADER: &str = "x-ubia-auth-usertoken";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UboxError {
    /// Credentials or token rejected by the portal
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),
}

impl UboxError {
    pub fn is_auth(&self) -> bool {
        matches!(self, UboxError::Auth(_))
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    account: &'a str,
    password: String,
    lang: &'a str,
    app: &'a str,
    device_token: &'a str,
    app_version: &'a str,
    brand: &'a str,
    device_type: i32,
}

enum DeviceListOutcome {
    Devices(Vec<DeviceRecord>),
    TokenRejected,
}

pub struct UboxClient {
    config: UboxConfig,
    login_url: Url,
    device_list_url: Url,
    http_client: Client,
    token: RwLock<Option<String>>,
}

impl UboxClient {
    pub fn new(config: UboxConfig) -> Result<Self, UboxError> {
        let login_url = config
            .login_url()
            .map_err(|e| UboxError::Api(format!("Invalid login URL: {}", e)))?;
        let device_list_url = config
            .device_list_url()
            .map_err(|e| UboxError::Api(format!("Invalid device list URL: {}", e)))?;

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UboxError::Api(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            login_url,
            device_list_url,
            http_client,
            token: RwLock::new(None),
        })
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Log in and store a fresh user token
    pub async fn authenticate(&self) -> Result<(), UboxError> {
        self.login().await.map(|_| ())
    }

    async fn login(&self) -> Result<String, UboxError> {
        let body = LoginRequest {
            account: &self.config.username,
            password: hmac_sha1_base64(&self.config.password),
            lang: &self.config.lang,
            app: &self.config.app,
            device_token: &self.config.device_token,
            app_version: &self.config.app_version,
            brand: &self.config.brand,
            device_type: self.config.device_type,
        };

        let resp = self
            .http_client
            .post(self.login_url.clone())
            .header(header::ACCEPT, "*/*")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, "authentication"))?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                return Err(UboxError::Auth("Invalid credentials".to_string()));
            }
            status => {
                return Err(UboxError::Api(format!(
                    "Authentication failed with status {}",
                    status.as_u16()
                )));
            }
        }

        let result: Value = resp
            .json()
            .await
            .map_err(|e| transport_error(e, "authentication"))?;

        let code = response_code(&result);
        let token = result
            .pointer("/data/Token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty());

        let token = match token {
            Some(t) if code <= 0 => t.to_string(),
            _ => {
                let msg = result
                    .get("msg")
                    .and_then(|m| m.as_str())
                    .unwrap_or("no token in login response");
                return Err(UboxError::Auth(format!(
                    "Login rejected (code {}): {}",
                    code, msg
                )));
            }
        };

        {
            let mut stored = self.token.write().await;
            *stored = Some(token.clone());
        }

        tracing::info!("[Ubox] Authenticated as {}", self.config.username);
        Ok(token)
    }

    async fn ensure_token(&self) -> Result<String, UboxError> {
        {
            let token = self.token.read().await;
            if let Some(ref t) = *token {
                return Ok(t.clone());
            }
        }
        self.login().await
    }

    async fn clear_token(&self) {
        let mut token = self.token.write().await;
        *token = None;
    }

    /// Fetch and normalize the account's device list
    pub async fn get_device_list(&self) -> Result<Vec<DeviceRecord>, UboxError> {
        let token = self.ensure_token().await?;

        if let DeviceListOutcome::Devices(devices) = self.request_device_list(&token).await? {
            return Ok(devices);
        }

        tracing::info!("[Ubox] Token expired, re-authenticating");
        self.clear_token().await;
        let token = self.login().await?;

        match self.request_device_list(&token).await? {
            DeviceListOutcome::Devices(devices) => Ok(devices),
            DeviceListOutcome::TokenRejected => {
                self.clear_token().await;
                Err(UboxError::Auth(
                    "Device list rejected after re-authentication".to_string(),
                ))
            }
        }
    }

    async fn request_device_list(&self, token: &str) -> Result<DeviceListOutcome, UboxError> {
        let resp = self
            .http_client
            .post(self.device_list_url.clone())
            .header(header::ACCEPT, "*/*")
            .header(AUTH_TOKEN_HEADER, token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| transport_error(e, "device list request"))?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Ok(DeviceListOutcome::TokenRejected),
            status => {
                return Err(UboxError::Api(format!(
                    "API request failed with status {}",
                    status.as_u16()
                )));
            }
        }

        let result: Value = resp
            .json()
            .await
            .map_err(|e| transport_error(e, "device list request"))?;

        let code = response_code(&result);
        if code > 0 {
            tracing::debug!(
                "[Ubox] Device list returned code {}: {:?}",
                code,
                result.get("msg")
            );
            return Ok(DeviceListOutcome::TokenRejected);
        }

        let devices = normalize_device_list(&result);
        tracing::debug!("[Ubox] Device list: {} devices", devices.len());
        Ok(DeviceListOutcome::Devices(devices))
    }

    /// Drop the session; the next call logs in again
    pub async fn close(&self) {
        self.clear_token().await;
        tracing::debug!("[Ubox] Session closed for {}", self.config.username);
    }
}

/// Body `code`, sent either as a number or a numeric string; missing is 0
fn response_code(result: &Value) -> i64 {
    match result.get("code") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn transport_error(e: reqwest::Error, during: &str) -> UboxError {
    if e.is_timeout() {
        UboxError::Api(format!("Timeout during {}", during))
    } else if e.is_decode() {
        UboxError::Api(format!("Invalid response during {}: {}", during, e))
    } else {
        UboxError::Api(format!("Connection error during {}: {}", during, e))
    }
}
