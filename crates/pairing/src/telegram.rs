//! Telegram Bot API client

use async_trait::async_trait;
use athena_notify::{Deliver, DeliveryError};
use athena_ports::{ChatBot, ChatError, ChatMessage, ChatUser, Notification};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::interaction::Interaction;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    from: Option<User>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Deserialize)]
struct User {
    id: i64,
    #[serde(default)]
    username: Option<String>,
}

/// Long-polling Telegram bot
pub struct TelegramBot {
    client: Client,
    api_url: String,
    token: String,
    id: String,
    poll_timeout: Duration,
    offset: AtomicI64,
}

impl TelegramBot {
    /// The bot id is the part of the token before `:`
    pub fn new(token: impl Into<String>, poll_timeout: Duration) -> Result<Self, ChatError> {
        let token = token.into();
        let id = match token.split_once(':') {
            Some((id, _)) if !id.is_empty() => id.to_string(),
            _ => return Err(ChatError::Parse("malformed telegram bot token".to_string())),
        };

        let client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(|e| ChatError::Http(e.to_string()))?;

        Ok(TelegramBot {
            client,
            api_url: TELEGRAM_API_URL.to_string(),
            token,
            id,
            poll_timeout,
            offset: AtomicI64::new(0),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, ChatError> {
        let resp: ApiResponse<T> = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        if !resp.ok {
            return Err(ChatError::Api {
                code: resp.error_code.unwrap_or_default(),
                description: resp.description.unwrap_or_default(),
            });
        }
        resp.result
            .ok_or_else(|| ChatError::Parse(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl ChatBot for TelegramBot {
    fn identity(&self) -> &str {
        &self.id
    }

    async fn poll(&self) -> Result<Vec<ChatMessage>, ChatError> {
        let offset = self.offset.load(Ordering::Acquire);
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": self.poll_timeout.as_secs(),
                    "allowed_updates": ["message"],
                }),
            )
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::Release);
        }

        let messages = updates
            .into_iter()
            .filter_map(|update| {
                let message = update.message?;
                let from = message.from?;
                Some(ChatMessage {
                    chat_id: message.chat.id,
                    from: ChatUser {
                        id: from.id,
                        username: from.username,
                    },
                    text: message.text?,
                })
            })
            .collect();
        Ok(messages)
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChatError> {
        let _: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }
}

/// Delivers notifications to the paired owner's chat
pub struct TelegramDeliverer {
    interaction: Arc<Interaction>,
}

impl TelegramDeliverer {
    pub fn new(interaction: Arc<Interaction>) -> Self {
        TelegramDeliverer { interaction }
    }
}

#[async_trait]
impl Deliver for TelegramDeliverer {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(
        &self,
        _channel: Option<&str>,
        notification: &Notification,
    ) -> Result<(), DeliveryError> {
        match self.interaction.send_to_owner(&notification.text).await {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(DeliveryError::Api(e.to_string())),
            None => Err(DeliveryError::NoRecipient),
        }
    }
}
