//! Configuration module

use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub ubox: UboxConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    pub discord: Option<DiscordConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Vendor portal account and the client identity sent at login
#[derive(Clone, Deserialize)]
pub struct UboxConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_device_list_path")]
    pub device_list_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_app")]
    pub app: String,
    #[serde(default = "default_device_token")]
    pub device_token: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default = "default_device_type")]
    pub device_type: i32,
}

impl UboxConfig {
    /// Portal settings with default endpoints for the given account
    pub fn with_credentials(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            base_url: default_base_url(),
            login_path: default_login_path(),
            device_list_path: default_device_list_path(),
            timeout_secs: default_timeout_secs(),
            lang: default_lang(),
            app: default_app(),
            device_token: default_device_token(),
            app_version: default_app_version(),
            brand: default_brand(),
            device_type: default_device_type(),
        }
    }

    pub fn login_url(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(&self.base_url)?.join(&self.login_path)?)
    }

    pub fn device_list_url(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(&self.base_url)?.join(&self.device_list_path)?)
    }
}

impl std::fmt::Debug for UboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UboxConfig")
            .field("username", &self.username)
            .field("password", &"REDACTED")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .field("device_list_path", &self.device_list_path)
            .field("timeout_secs", &self.timeout_secs)
            .field("app", &self.app)
            .field("app_version", &self.app_version)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval_secs(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8123
}

fn default_base_url() -> String {
    "https://portal.ubianet.com".to_string()
}

fn default_login_path() -> String {
    "/api/v3/login".to_string()
}

fn default_device_list_path() -> String {
    "/api/v2/user/device_list".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_app() -> String {
    "ubox".to_string()
}

fn default_device_token() -> String {
    "dgffr486dgfr0egrferfrgg4778l5e".to_string()
}

fn default_app_version() -> String {
    "1.1.115".to_string()
}

fn default_brand() -> String {
    "iPhone15,2(18.1)".to_string()
}

fn default_device_type() -> i32 {
    2
}

fn default_scan_interval_secs() -> u64 {
    300
}

fn default_failure_threshold() -> u32 {
    3
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("UBOX").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.ubox.username.trim().is_empty() || self.ubox.password.is_empty() {
            anyhow::bail!("ubox.username and ubox.password must be configured");
        }
        if self.coordinator.scan_interval_secs == 0 {
            anyhow::bail!("coordinator.scan_interval_secs must be greater than zero");
        }
        self.ubox.login_url()?;
        self.ubox.device_list_url()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let cfg = UboxConfig::with_credentials("user@example.com", "secret");
        assert_eq!(
            cfg.login_url().unwrap().as_str(),
            "https://portal.ubianet.com/api/v3/login"
        );
        assert_eq!(
            cfg.device_list_url().unwrap().as_str(),
            "https://portal.ubianet.com/api/v2/user/device_list"
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let cfg = UboxConfig::with_credentials("user@example.com", "hunter2");
        let rendered = format!("{:?}", cfg);
        assert!(rendered.contains("user@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let config = Config {
            server: ServerConfig::default(),
            ubox: UboxConfig::with_credentials("", ""),
            coordinator: CoordinatorConfig::default(),
            discord: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            server: ServerConfig::default(),
            ubox: UboxConfig::with_credentials("user", "pass"),
            coordinator: CoordinatorConfig {
                scan_interval_secs: 0,
                failure_threshold: 3,
            },
            discord: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_coordinator_defaults() {
        let cfg = CoordinatorConfig::default();
        assert_eq!(cfg.scan_interval_secs, 300);
        assert_eq!(cfg.failure_threshold, 3);
    }
}
