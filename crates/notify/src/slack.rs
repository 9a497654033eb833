use async_trait::async_trait;
use athena_ports::Notification;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::dispatch::Deliver;
use crate::error::DeliveryError;

const SLACK_API_URL: &str = "https://slack.com/api";

/// Slack transport settings
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub token: String,
    pub default_channel: String,
    pub api_url: String,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>, default_channel: impl Into<String>) -> Self {
        SlackConfig {
            token: token.into(),
            default_channel: default_channel.into(),
            api_url: SLACK_API_URL.to_string(),
        }
    }
}

/// Posts notifications with `chat.postMessage`
pub struct SlackDeliverer {
    client: Client,
    config: SlackConfig,
}

impl SlackDeliverer {
    pub fn new(config: SlackConfig) -> Self {
        SlackDeliverer {
            client: Client::new(),
            config,
        }
    }

    pub fn default_channel(&self) -> &str {
        &self.config.default_channel
    }
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Deliver for SlackDeliverer {
    fn name(&self) -> &str {
        "slack"
    }

    async fn deliver(
        &self,
        channel: Option<&str>,
        notification: &Notification,
    ) -> Result<(), DeliveryError> {
        let channel = channel.unwrap_or(self.config.default_channel.as_str());
        if channel.is_empty() {
            return Err(DeliveryError::NoRecipient);
        }

        let url = format!("{}/chat.postMessage", self.config.api_url);
        let resp: PostMessageResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&json!({ "channel": channel, "text": notification.text }))
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            return Err(DeliveryError::Api(
                resp.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(())
    }
}
