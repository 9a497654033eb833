use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Sender of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// An incoming text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub from: ChatUser,
    pub text: String,
}

/// Messaging bot client used for operator interaction
#[async_trait]
pub trait ChatBot: Send + Sync {
    /// Stable identity of the bot, used to namespace its pairing session
    fn identity(&self) -> &str;

    /// Long-poll for new messages; an empty batch means the poll timed out
    async fn poll(&self) -> Result<Vec<ChatMessage>, ChatError>;

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChatError>;
}
