use athena_core::{EventKind, SymbolEvent};
use athena_ports::{Notification, Notifier};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

use crate::error::RenderError;
use crate::object_router::ObjectChannelRouter;
use crate::pattern_router::PatternChannelRouter;
use crate::template::TemplateRenderer;

/// Registered notifiers plus the routers that pick their channels
pub struct Notifiability {
    notifiers: RwLock<Vec<Arc<dyn Notifier>>>,
    session_router: Arc<PatternChannelRouter>,
    symbol_router: Arc<PatternChannelRouter>,
    object_router: ObjectChannelRouter,
    templates: RwLock<TemplateRenderer>,
}

impl Notifiability {
    pub fn new() -> Self {
        Notifiability {
            notifiers: RwLock::new(Vec::new()),
            session_router: Arc::new(PatternChannelRouter::new()),
            symbol_router: Arc::new(PatternChannelRouter::new()),
            object_router: ObjectChannelRouter::new(),
            templates: RwLock::new(TemplateRenderer::new()),
        }
    }

    pub fn add_notifier(&self, notifier: Arc<dyn Notifier>) {
        self.notifiers.write().push(notifier);
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.read().len()
    }

    /// Routes keyed by session name
    pub fn session_router(&self) -> &Arc<PatternChannelRouter> {
        &self.session_router
    }

    /// Routes keyed by symbol
    pub fn symbol_router(&self) -> &Arc<PatternChannelRouter> {
        &self.symbol_router
    }

    pub fn object_router(&self) -> &ObjectChannelRouter {
        &self.object_router
    }

    pub fn route_session(&self, session: &str) -> Option<String> {
        self.session_router.route(session)
    }

    pub fn route_symbol(&self, symbol: &str) -> Option<String> {
        self.symbol_router.route(symbol)
    }

    pub fn route_object(&self, obj: &dyn Any) -> Option<String> {
        self.object_router.route(obj)
    }

    /// Route events of type `E` through the symbol router
    pub fn route_by_symbol<E: SymbolEvent>(&self) {
        let symbols = Arc::clone(&self.symbol_router);
        self.object_router
            .register_typed(move |event: &E| symbols.route(event.symbol()));
    }

    /// Override the template used for `kind`
    pub fn set_template(&self, kind: EventKind, template: &str) -> Result<(), RenderError> {
        self.templates.write().register(kind, template)
    }

    pub fn render<E: SymbolEvent>(&self, event: &E) -> Result<String, RenderError> {
        self.templates.read().render(event)
    }

    /// Broadcast to every notifier's default destination
    pub fn notify(&self, notification: &Notification) {
        for notifier in self.notifiers.read().iter() {
            notifier.notify(notification);
        }
    }

    pub fn notify_to(&self, channel: &str, notification: &Notification) {
        for notifier in self.notifiers.read().iter() {
            notifier.notify_to(channel, notification);
        }
    }

    /// Render `event`, route it through the object router and send it.
    ///
    /// Unrouted events are broadcast. A render failure drops the event.
    pub fn notify_object<E: SymbolEvent>(&self, event: &E) {
        let text = match self.render(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(kind = %E::KIND, symbol = event.symbol(), "notification dropped: {}", e);
                return;
            }
        };

        let notification = Notification::for_event(text, event);
        match self.route_object(event) {
            Some(channel) => self.notify_to(&channel, &notification),
            None => self.notify(&notification),
        }
    }
}

impl Default for Notifiability {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use athena_core::{OrderType, Side, SubmitOrder};
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(Option<String>, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) {
            self.sent.lock().push((None, notification.text.clone()));
        }

        fn notify_to(&self, channel: &str, notification: &Notification) {
            self.sent
                .lock()
                .push((Some(channel.to_string()), notification.text.clone()));
        }
    }

    fn submit(symbol: &str) -> SubmitOrder {
        SubmitOrder {
            client_order_id: Some("c-1".to_string()),
            symbol: symbol.to_string(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            quantity: dec!(1),
            price: Some(dec!(100)),
        }
    }

    #[test]
    fn test_notify_reaches_all_notifiers() {
        let notifiability = Notifiability::new();
        let a = Arc::new(RecordingNotifier::default());
        let b = Arc::new(RecordingNotifier::default());
        notifiability.add_notifier(a.clone());
        notifiability.add_notifier(b.clone());

        notifiability.notify(&Notification::text("hello"));
        notifiability.notify_to("ops", &Notification::text("to ops"));

        assert_eq!(notifiability.notifier_count(), 2);
        for notifier in [a, b] {
            let sent = notifier.sent.lock();
            assert_eq!(sent[0], (None, "hello".to_string()));
            assert_eq!(sent[1], (Some("ops".to_string()), "to ops".to_string()));
        }
    }

    #[test]
    fn test_notify_object_routes_by_symbol() {
        let notifiability = Notifiability::new();
        let recorder = Arc::new(RecordingNotifier::default());
        notifiability.add_notifier(recorder.clone());
        notifiability
            .symbol_router()
            .add_route([("BTC*", "alerts-btc")])
            .unwrap();
        notifiability.route_by_symbol::<SubmitOrder>();

        notifiability.notify_object(&submit("BTCUSDT"));
        notifiability.notify_object(&submit("ETHUSDT"));

        let sent = recorder.sent.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0.as_deref(), Some("alerts-btc"));
        assert_eq!(sent[0].1, "submitting BUY LIMIT order: BTCUSDT 1 @ 100");
        assert_eq!(sent[1].0, None);
    }

    #[test]
    fn test_render_failure_drops_notification() {
        let notifiability = Notifiability::new();
        let recorder = Arc::new(RecordingNotifier::default());
        notifiability.add_notifier(recorder.clone());
        notifiability
            .set_template(EventKind::SubmitOrder, "{{missing}}")
            .unwrap();

        notifiability.notify_object(&submit("BTCUSDT"));
        assert!(recorder.sent.lock().is_empty());
    }
}
