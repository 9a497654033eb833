//! Athena Notify
//!
//! Decides which communication channel receives each domain event and
//! delivers the rendered text.
//!
//! ## Architecture
//!
//! ```text
//!   session name ──► PatternChannelRouter (session rules) ──┐
//!                                                           │ channel
//!   typed event ──► ObjectChannelRouter ──► PatternChannelRouter (symbol rules)
//!                                                           │
//!                                                           ▼
//!                                 ┌─────────────────────────────────┐
//!                                 │          Notifiability          │
//!                                 │  notify / notify_to / templates │
//!                                 └───────────────┬─────────────────┘
//!                                                 │ try_send
//!                                 ┌───────────────▼─────────────────┐
//!                                 │  QueuedNotifier ──► Deliver     │
//!                                 │  (Slack, Telegram, ...)         │
//!                                 └─────────────────────────────────┘
//! ```
//!
//! [`ErrorLogLayer`] forwards ERROR log events to an error channel once a
//! notifier is attached to it.
//!
//! Routing misses are not errors: the caller falls back to `notify`, which
//! broadcasts to every registered notifier's default destination.

pub mod dispatch;
pub mod error;
pub mod error_log;
pub mod notifiability;
pub mod object_router;
pub mod pattern_router;
pub mod slack;
pub mod template;

pub use dispatch::{Deliver, QueuedNotifier};
pub use error::{DeliveryError, RenderError, RouteError};
pub use error_log::ErrorLogLayer;
pub use notifiability::Notifiability;
pub use object_router::ObjectChannelRouter;
pub use pattern_router::PatternChannelRouter;
pub use slack::{SlackConfig, SlackDeliverer};
pub use template::TemplateRenderer;
