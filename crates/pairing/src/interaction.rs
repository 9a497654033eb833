use athena_ports::{ChatBot, ChatError, ChatMessage, OtpProvider, Store, StoreExt};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;

use crate::session::PairingSession;

const AUTH_COMMAND: &str = "/auth";
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Result of an `/auth` attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Session claimed by the sender
    Paired,
    /// Sender already owns the session
    AlreadyPaired,
    /// Wrong code, or the session belongs to someone else
    Rejected,
    /// Code was valid but the claim could not be persisted
    SaveFailed,
}

/// Operator-facing side of a bot: authentication and owner messaging
pub struct Interaction {
    bot: Arc<dyn ChatBot>,
    store: Box<dyn Store>,
    otp: Arc<dyn OtpProvider>,
    session: RwLock<PairingSession>,
    /// Serializes claims; the session lock is never held across a store save
    claim: Mutex<()>,
}

impl Interaction {
    pub fn new(
        bot: Arc<dyn ChatBot>,
        store: Box<dyn Store>,
        otp: Arc<dyn OtpProvider>,
        session: PairingSession,
    ) -> Self {
        Interaction {
            bot,
            store,
            otp,
            session: RwLock::new(session),
            claim: Mutex::new(()),
        }
    }

    pub fn is_paired(&self) -> bool {
        self.session.read().is_claimed()
    }

    pub fn session(&self) -> PairingSession {
        self.session.read().clone()
    }

    /// Poll the bot until the task is dropped
    pub async fn run(self: Arc<Self>) {
        tracing::info!(bot = self.bot.identity(), paired = self.is_paired(), "starting bot interaction");
        loop {
            match self.bot.poll().await {
                Ok(messages) => {
                    for message in &messages {
                        self.handle_message(message).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(bot = self.bot.identity(), "bot poll failed: {}", e);
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                }
            }
        }
    }

    pub async fn handle_message(&self, message: &ChatMessage) {
        let mut parts = message.text.split_whitespace();
        let command = parts.next().unwrap_or_default();
        // Group chats address commands as `/auth@<bot>`
        let command = command.split_once('@').map_or(command, |(command, _)| command);

        if command == AUTH_COMMAND {
            let code = parts.next().unwrap_or_default();
            self.authenticate(message, code).await;
            return;
        }

        let (paired, is_owner) = {
            let session = self.session.read();
            (session.is_claimed(), session.is_owner(&message.from))
        };

        let reply = if !paired {
            Some("Please authenticate first: /auth <code>")
        } else if is_owner {
            Some("Unknown command")
        } else {
            None
        };

        match reply {
            Some(text) => self.reply(message.chat_id, text).await,
            None => tracing::debug!(user = message.from.id, "ignoring message from non-owner"),
        }
    }

    /// Validate `code` and claim the session for the sender
    pub async fn authenticate(&self, message: &ChatMessage, code: &str) -> AuthOutcome {
        let outcome = self.try_claim(message, code);

        let reply = match outcome {
            AuthOutcome::Paired => {
                tracing::info!(user = message.from.id, chat = message.chat_id, "bot paired with owner");
                "Authenticated. You will now receive notifications here."
            }
            AuthOutcome::AlreadyPaired => "Already authenticated.",
            AuthOutcome::Rejected => {
                tracing::warn!(user = message.from.id, "rejected authentication attempt");
                "Authentication failed."
            }
            AuthOutcome::SaveFailed => "Authentication failed: could not save the session, please retry.",
        };
        self.reply(message.chat_id, reply).await;
        outcome
    }

    fn try_claim(&self, message: &ChatMessage, code: &str) -> AuthOutcome {
        let _claiming = self.claim.lock();

        let claimed = {
            let session = self.session.read();

            if session.is_claimed() {
                return if session.is_owner(&message.from) {
                    AuthOutcome::AlreadyPaired
                } else {
                    AuthOutcome::Rejected
                };
            }

            if code.is_empty() {
                return AuthOutcome::Rejected;
            }

            let token_matches = session.auth_token.as_deref() == Some(code);
            if !token_matches && !self.otp.validate(&session.otp_key, code, Utc::now()) {
                return AuthOutcome::Rejected;
            }

            session.claimed_by(&message.from, message.chat_id)
        };

        if let Err(e) = self.store.save(&claimed) {
            tracing::error!("failed to save pairing session: {}", e);
            return AuthOutcome::SaveFailed;
        }

        *self.session.write() = claimed;
        AuthOutcome::Paired
    }

    /// Send `text` to the owner's chat; `None` when not paired yet
    pub async fn send_to_owner(&self, text: &str) -> Option<Result<(), ChatError>> {
        let chat_id = self.session.read().owner_chat?;
        Some(self.bot.send(chat_id, text).await)
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.bot.send(chat_id, text).await {
            tracing::warn!(chat = chat_id, "failed to reply: {}", e);
        }
    }
}
