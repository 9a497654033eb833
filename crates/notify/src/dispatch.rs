//! Non-blocking notifier front-end
//!
//! Stream handlers call [`Notifier`] methods from the stream listener task.
//! [`QueuedNotifier`] only enqueues; a dispatcher task drains the queue and
//! hands each message to a [`Deliver`] transport.

use async_trait::async_trait;
use athena_ports::{Notification, Notifier};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::error::DeliveryError;

/// Transport that actually sends a notification
#[async_trait]
pub trait Deliver: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// `channel` is `None` for the transport's default destination
    async fn deliver(
        &self,
        channel: Option<&str>,
        notification: &Notification,
    ) -> Result<(), DeliveryError>;
}

struct Envelope {
    channel: Option<String>,
    notification: Notification,
}

/// Notifier that queues messages for a background dispatcher task
pub struct QueuedNotifier {
    name: String,
    tx: mpsc::Sender<Envelope>,
}

impl QueuedNotifier {
    /// Spawn the dispatcher task for `transport` on the current runtime
    pub fn spawn<D: Deliver>(transport: D, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Envelope>(capacity);
        let name = transport.name().to_string();

        let handle = tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                if let Err(e) = transport
                    .deliver(envelope.channel.as_deref(), &envelope.notification)
                    .await
                {
                    tracing::warn!(
                        notifier = transport.name(),
                        channel = envelope.channel.as_deref().unwrap_or("default"),
                        "failed to deliver notification: {}",
                        e
                    );
                }
            }
            tracing::debug!(notifier = transport.name(), "notification queue closed");
        });

        (QueuedNotifier { name, tx }, handle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn enqueue(&self, channel: Option<&str>, notification: &Notification) {
        let envelope = Envelope {
            channel: channel.map(str::to_string),
            notification: notification.clone(),
        };

        match self.tx.try_send(envelope) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(notifier = %self.name, "notification queue full, dropping message");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(notifier = %self.name, "notification dispatcher stopped, dropping message");
            }
        }
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, notification: &Notification) {
        self.enqueue(None, notification);
    }

    fn notify_to(&self, channel: &str, notification: &Notification) {
        self.enqueue(Some(channel), notification);
    }
}
