use athena_core::{EventKind, SymbolEvent};
use serde_json::Value;

/// A rendered message plus the event it was rendered from
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub kind: Option<EventKind>,
    /// The source event as JSON, for notifiers that render attachments
    pub payload: Option<Value>,
}

impl Notification {
    pub fn text(text: impl Into<String>) -> Self {
        Notification {
            text: text.into(),
            kind: None,
            payload: None,
        }
    }

    pub fn for_event<E: SymbolEvent>(text: impl Into<String>, event: &E) -> Self {
        Notification {
            text: text.into(),
            kind: Some(E::KIND),
            payload: serde_json::to_value(event).ok(),
        }
    }
}

/// Outbound notification transport.
///
/// Both methods are called from stream listener tasks and must not block:
/// implementations queue the message and deliver it elsewhere.
pub trait Notifier: Send + Sync {
    /// Send to the notifier's default destination
    fn notify(&self, notification: &Notification);

    /// Send to a specific channel; notifiers without channels fall back to `notify`
    fn notify_to(&self, channel: &str, notification: &Notification);
}
