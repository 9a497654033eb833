//! Forwarding of ERROR log events to a notification channel
//!
//! [`ErrorLogLayer`] is composed into the process subscriber at startup and
//! stays inert until a sink is attached, which happens once the notifiers are
//! configured:
//!
//! ```text
//!   tracing::error!(..) ──► ErrorLogLayer ──► Notifier::notify_to(error_channel)
//! ```

use athena_ports::{Notification, Notifier};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Events from this crate are never forwarded, a failing transport would
/// otherwise feed its own errors back into the queue.
const OWN_TARGET: &str = "athena_notify";

struct Sink {
    notifier: Arc<dyn Notifier>,
    channel: String,
}

/// `tracing_subscriber` layer sending ERROR events to a channel.
///
/// Clones share the sink, so the handle kept by the environment and the
/// layer installed in the subscriber see the same attachment.
#[derive(Clone, Default)]
pub struct ErrorLogLayer {
    sink: Arc<RwLock<Option<Sink>>>,
}

impl ErrorLogLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start forwarding to `channel` through `notifier`, replacing any earlier sink
    pub fn attach(&self, notifier: Arc<dyn Notifier>, channel: impl Into<String>) {
        *self.sink.write() = Some(Sink {
            notifier,
            channel: channel.into(),
        });
    }

    pub fn detach(&self) {
        *self.sink.write() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.sink.read().is_some()
    }
}

impl<S: Subscriber> Layer<S> for ErrorLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() != Level::ERROR || metadata.target().starts_with(OWN_TARGET) {
            return;
        }

        // The guard is released before notifying, the notifier may log
        let (notifier, channel) = match self.sink.read().as_ref() {
            Some(sink) => (Arc::clone(&sink.notifier), sink.channel.clone()),
            None => return,
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let text = visitor.into_text(metadata.target());
        notifier.notify_to(&channel, &Notification::text(text));
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn into_text(self, target: &str) -> String {
        let mut text = format!("[{}] {}", target, self.message);
        for field in self.fields {
            text.push(' ');
            text.push_str(&field);
        }
        text
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: &Notification) {
            self.sent.lock().push((String::new(), notification.text.clone()));
        }

        fn notify_to(&self, channel: &str, notification: &Notification) {
            self.sent
                .lock()
                .push((channel.to_string(), notification.text.clone()));
        }
    }

    fn with_layer(layer: &ErrorLogLayer, f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_error_events_are_forwarded() {
        let layer = ErrorLogLayer::new();
        let recorder = Arc::new(Recorder::default());
        layer.attach(recorder.clone(), "#errors");

        with_layer(&layer, || {
            tracing::error!(target: "athena_environment::sync", session = "binance", "sync failed: {}", "timeout");
        });

        let sent = recorder.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "#errors");
        assert_eq!(
            sent[0].1,
            "[athena_environment::sync] sync failed: timeout session=binance"
        );
    }

    #[test]
    fn test_lower_levels_are_ignored() {
        let layer = ErrorLogLayer::new();
        let recorder = Arc::new(Recorder::default());
        layer.attach(recorder.clone(), "#errors");

        with_layer(&layer, || {
            tracing::warn!("queue almost full");
            tracing::info!("connected");
        });

        assert!(recorder.sent.lock().is_empty());
    }

    #[test]
    fn test_own_events_are_not_forwarded() {
        let layer = ErrorLogLayer::new();
        let recorder = Arc::new(Recorder::default());
        layer.attach(recorder.clone(), "#errors");

        with_layer(&layer, || {
            tracing::error!(target: "athena_notify::dispatch", "delivery failed");
        });

        assert!(recorder.sent.lock().is_empty());
    }

    #[test]
    fn test_detached_layer_is_inert() {
        let layer = ErrorLogLayer::new();
        let recorder = Arc::new(Recorder::default());
        layer.attach(recorder.clone(), "#errors");
        layer.detach();
        assert!(!layer.is_attached());

        with_layer(&layer, || tracing::error!("lost"));

        assert!(recorder.sent.lock().is_empty());
    }
}
