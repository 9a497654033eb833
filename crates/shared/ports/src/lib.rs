//! Athena Ports
//!
//! Port definitions (traits) for the environment orchestration core.
//! These define the boundaries between orchestration logic and the external
//! systems it coordinates: exchanges and their streams, persistence, history
//! sync, notifiers, chat bots and one-time password providers.

mod chat;
mod error;
mod exchange;
mod notifier;
mod otp;
mod persistence;
mod stream;
mod sync;

pub use chat::{ChatBot, ChatMessage, ChatUser};
pub use error::{ChatError, ExchangeError, OtpError, StoreError, StreamError, SyncError};
pub use exchange::{Exchange, MarginExchange};
pub use notifier::{Notification, Notifier};
pub use otp::{OtpKey, OtpProvider};
pub use persistence::{Persistence, Store, StoreExt};
pub use stream::{EventHandler, StandardStream, Stream};
pub use sync::SyncService;
