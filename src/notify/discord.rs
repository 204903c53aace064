//! Discord webhook notifications

use chrono::Utc;
use serde::Serialize;

/// Alert severity, mapped to embed colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// Discord notifier
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<DiscordField>,
}

#[derive(Serialize)]
struct DiscordField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    embeds: Vec<DiscordEmbed>,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.filter(|url| !url.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Send a Discord notification
    async fn send(&self, embed: DiscordEmbed) {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            tracing::debug!("Discord webhook URL not configured");
            return;
        };

        let payload = DiscordWebhookPayload {
            embeds: vec![embed],
        };

        match self
            .client
            .post(webhook_url)
            .json(&payload)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) => {
                if !response.status().is_success() {
                    tracing::warn!("Discord webhook returned status: {}", response.status());
                }
            }
            Err(e) => {
                tracing::error!("Failed to send Discord notification: {}", e);
            }
        }
    }

    /// Convert severity to Discord embed color
    fn severity_to_color(severity: Severity) -> u32 {
        match severity {
            Severity::Medium => 0xf39c12,   // Orange
            Severity::High => 0xe74c3c,     // Red
            Severity::Critical => 0x9b59b6, // Purple
        }
    }

    fn severity_for(consecutive_failures: u32) -> Severity {
        if consecutive_failures >= 5 {
            Severity::Critical
        } else if consecutive_failures >= 3 {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    /// Notify that device polling keeps failing
    pub async fn notify_poll_failure(&self, account: &str, consecutive_failures: u32, error: &str) {
        let embed = DiscordEmbed {
            title: "Camera Polling Failed".to_string(),
            description: format!("Ubox device list for {} cannot be fetched", account),
            color: Self::severity_to_color(Self::severity_for(consecutive_failures)),
            timestamp: Utc::now().to_rfc3339(),
            fields: vec![
                DiscordField {
                    name: "Account".to_string(),
                    value: account.to_string(),
                    inline: true,
                },
                DiscordField {
                    name: "Consecutive Failures".to_string(),
                    value: consecutive_failures.to_string(),
                    inline: true,
                },
                DiscordField {
                    name: "Error".to_string(),
                    value: error.to_string(),
                    inline: false,
                },
            ],
        };

        self.send(embed).await;
    }

    /// Notify that polling works again
    pub async fn notify_poll_recovery(&self, account: &str, device_count: usize) {
        let embed = DiscordEmbed {
            title: "Camera Polling Recovered".to_string(),
            description: format!("Ubox device list for {} is available again", account),
            color: 0x2ecc71, // Green
            timestamp: Utc::now().to_rfc3339(),
            fields: vec![
                DiscordField {
                    name: "Account".to_string(),
                    value: account.to_string(),
                    inline: true,
                },
                DiscordField {
                    name: "Devices".to_string(),
                    value: device_count.to_string(),
                    inline: true,
                },
            ],
        };

        self.send(embed).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_severity_escalates() {
        assert_eq!(DiscordNotifier::severity_for(1), Severity::Medium);
        assert_eq!(DiscordNotifier::severity_for(3), Severity::High);
        assert_eq!(DiscordNotifier::severity_for(7), Severity::Critical);
    }

    #[test]
    fn test_empty_url_is_unconfigured() {
        assert!(!DiscordNotifier::new(Some(String::new())).is_configured());
        assert!(!DiscordNotifier::new(None).is_configured());
        assert!(DiscordNotifier::new(Some("http://hook".to_string())).is_configured());
    }

    #[tokio::test]
    async fn test_failure_posts_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(body_partial_json(serde_json::json!({
                "embeds": [{ "title": "Camera Polling Failed" }]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(Some(format!("{}/webhook", server.uri())));
        notifier
            .notify_poll_failure("user@example.com", 3, "Timeout during authentication")
            .await;
    }
}
