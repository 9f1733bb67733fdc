//! Messaging-bot webhook notification channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::events::NotifyEvent;
use crate::NotifyChannel;

/// Environment variable for the webhook endpoint URL.
const ENV_WEBHOOK_ENDPOINT: &str = "WA_BOT_ENDPOINT";

/// Webhook notification channel.
///
/// Posts `{"text": <message>, "tagall": true}` to the configured
/// endpoint. The `tagall` flag asks the receiving bot to alert every
/// member of the group it forwards to.
pub struct WebhookChannel {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create a webhook channel from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let endpoint = std::env::var(ENV_WEBHOOK_ENDPOINT).ok();

        if endpoint.is_some() {
            debug!("Webhook notifications enabled");
        } else {
            debug!("Webhook notifications disabled (WA_BOT_ENDPOINT not set)");
        }

        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    /// Create a webhook channel with a specific endpoint.
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint: Some(endpoint),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotifyChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn send(&self, event: &NotifyEvent) -> Result<(), ChannelError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| ChannelError::NotConfigured(ENV_WEBHOOK_ENDPOINT.to_string()))?;

        let payload = WebhookPayload {
            text: event.text(),
            tagall: true,
        };

        debug!(channel = "webhook", title = %event.title(), "Sending notification");

        let response = self.client.post(endpoint).json(&payload).send().await?;

        if response.status().is_success() {
            debug!(channel = "webhook", "Notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "webhook",
                status = %status,
                body = %body,
                "Webhook request failed"
            );

            Err(ChannelError::Other(format!(
                "webhook returned {status}: {body}"
            )))
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct WebhookPayload {
    text: String,
    tagall: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_tagall() {
        let payload = WebhookPayload {
            text: "hello".to_string(),
            tagall: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["tagall"], true);
    }

    #[tokio::test]
    async fn unconfigured_channel_reports_not_configured() {
        let channel = WebhookChannel {
            endpoint: None,
            client: reqwest::Client::new(),
        };
        assert!(!channel.enabled());

        let err = channel
            .send(&NotifyEvent::new_story_link("alice", "http://x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::NotConfigured(_)));
    }
}
