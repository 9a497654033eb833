//! Notification routing policy
//!
//! Binds a [`RoutingMode`] per event kind to the session streams:
//!
//! ```text
//!   $silent   nothing installed
//!   $session  per session: ChannelHandler(channel)  when session_router matches
//!                          BroadcastHandler          otherwise
//!   $symbol   object matcher: event ──► symbol_router.route(event.symbol)
//!             every session:  ObjectRoutedHandler (route, else broadcast)
//! ```
//!
//! SubmitOrder and ProfitAndLoss events are not stream events; for them only
//! the object matcher is registered and strategies send them through
//! [`Notifiability::notify_object`].

use athena_core::{Order, ProfitAndLossReport, SubmitOrder, SymbolEvent, Trade};
use athena_notify::{Notifiability, PatternChannelRouter, TemplateRenderer};
use athena_ports::{EventHandler, Notification, Stream};
use std::sync::Arc;

use crate::config::{NotificationConfig, RoutingMode};
use crate::error::ConfigError;
use crate::registry::SessionRegistry;

fn render<E: SymbolEvent>(notifiability: &Notifiability, event: &E) -> Option<Notification> {
    match notifiability.render(event) {
        Ok(text) => Some(Notification::for_event(text, event)),
        Err(e) => {
            tracing::error!(kind = %E::KIND, symbol = event.symbol(), "notification dropped: {}", e);
            None
        }
    }
}

/// Sends every event of one session to a fixed channel
pub struct ChannelHandler {
    notifiability: Arc<Notifiability>,
    channel: String,
}

impl<E: SymbolEvent> EventHandler<E> for ChannelHandler {
    fn handle(&self, event: &E) {
        if let Some(notification) = render(&self.notifiability, event) {
            self.notifiability.notify_to(&self.channel, &notification);
        }
    }
}

/// Sends every event to each notifier's default destination
pub struct BroadcastHandler {
    notifiability: Arc<Notifiability>,
}

impl<E: SymbolEvent> EventHandler<E> for BroadcastHandler {
    fn handle(&self, event: &E) {
        if let Some(notification) = render(&self.notifiability, event) {
            self.notifiability.notify(&notification);
        }
    }
}

/// Routes each event through the object router
pub struct ObjectRoutedHandler {
    notifiability: Arc<Notifiability>,
}

impl<E: SymbolEvent> EventHandler<E> for ObjectRoutedHandler {
    fn handle(&self, event: &E) {
        self.notifiability.notify_object(event);
    }
}

/// Add the configured routes and templates, then install the routing policy.
///
/// Installed handlers can not be removed, so this must run once per process.
/// Nothing is changed when a pattern or template in `config` is invalid.
pub fn configure_routing(
    notifiability: &Arc<Notifiability>,
    sessions: &SessionRegistry,
    config: &NotificationConfig,
) -> Result<(), ConfigError> {
    validate(config)?;

    notifiability.symbol_router().add_route(&config.symbol_channels)?;
    notifiability.session_router().add_route(&config.session_channels)?;

    for (kind, template) in &config.templates {
        notifiability.set_template(*kind, template)?;
    }

    let Some(routing) = &config.routing else {
        return Ok(());
    };

    install_stream_routing::<Trade>(routing.trade, notifiability, sessions, |stream, handler| {
        stream.on_trade_update(handler)
    });
    install_stream_routing::<Order>(routing.order, notifiability, sessions, |stream, handler| {
        stream.on_order_update(handler)
    });
    register_object_routing::<SubmitOrder>(routing.submit_order, notifiability);
    register_object_routing::<ProfitAndLossReport>(routing.pnl, notifiability);
    Ok(())
}

fn validate(config: &NotificationConfig) -> Result<(), ConfigError> {
    PatternChannelRouter::with_routes(&config.symbol_channels)?;
    PatternChannelRouter::with_routes(&config.session_channels)?;

    let mut templates = TemplateRenderer::new();
    for (kind, template) in &config.templates {
        templates.register(*kind, template)?;
    }
    Ok(())
}

fn install_stream_routing<E: SymbolEvent>(
    mode: RoutingMode,
    notifiability: &Arc<Notifiability>,
    sessions: &SessionRegistry,
    attach: fn(&dyn Stream, Arc<dyn EventHandler<E>>),
) {
    match mode {
        RoutingMode::Silent => {}
        RoutingMode::Session => {
            for (name, session) in sessions.iter() {
                let handler: Arc<dyn EventHandler<E>> = match notifiability.route_session(name) {
                    Some(channel) => {
                        tracing::debug!(session = name, kind = %E::KIND, %channel, "routing session notifications");
                        Arc::new(ChannelHandler {
                            notifiability: Arc::clone(notifiability),
                            channel,
                        })
                    }
                    None => Arc::new(BroadcastHandler {
                        notifiability: Arc::clone(notifiability),
                    }),
                };
                attach(session.stream().as_ref(), handler);
            }
        }
        RoutingMode::Symbol => {
            notifiability.route_by_symbol::<E>();
            let handler: Arc<dyn EventHandler<E>> = Arc::new(ObjectRoutedHandler {
                notifiability: Arc::clone(notifiability),
            });
            for (_, session) in sessions.iter() {
                attach(session.stream().as_ref(), Arc::clone(&handler));
            }
        }
    }
}

fn register_object_routing<E: SymbolEvent>(mode: RoutingMode, notifiability: &Notifiability) {
    match mode {
        RoutingMode::Silent => {}
        RoutingMode::Symbol => notifiability.route_by_symbol::<E>(),
        RoutingMode::Session => {
            tracing::warn!(kind = %E::KIND, "$session routing is not supported for this event kind, ignoring");
        }
    }
}

