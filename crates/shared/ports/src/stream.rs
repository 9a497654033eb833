use std::sync::Arc;

use async_trait::async_trait;
use athena_core::{Order, StreamChannel, SubscribeOptions, Subscription, Trade};
use parking_lot::RwLock;

use crate::error::StreamError;

/// Callback invoked from a stream's listener task.
///
/// Handlers run on the stream task, so they must return quickly.
pub trait EventHandler<E>: Send + Sync {
    fn handle(&self, event: &E);
}

impl<E, F> EventHandler<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn handle(&self, event: &E) {
        self(event)
    }
}

/// Market and user data stream of an exchange session
#[async_trait]
pub trait Stream: Send + Sync {
    fn subscribe(&self, channel: StreamChannel, symbol: &str, options: SubscribeOptions);

    fn on_trade_update(&self, handler: Arc<dyn EventHandler<Trade>>);

    fn on_order_update(&self, handler: Arc<dyn EventHandler<Order>>);

    /// Open the stream; resolves once connected or failed
    async fn connect(&self) -> Result<(), StreamError>;

    async fn close(&self) -> Result<(), StreamError>;
}

/// Subscription and callback bookkeeping shared by stream implementations.
///
/// Exchange streams embed a `StandardStream` and call the `emit_*` methods
/// from their listener task.
#[derive(Default)]
pub struct StandardStream {
    subscriptions: RwLock<Vec<Subscription>>,
    trade_handlers: RwLock<Vec<Arc<dyn EventHandler<Trade>>>>,
    order_handlers: RwLock<Vec<Arc<dyn EventHandler<Order>>>>,
}

impl StandardStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: StreamChannel, symbol: &str, options: SubscribeOptions) {
        self.subscriptions
            .write()
            .push(Subscription::new(channel, symbol).with_options(options));
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.read().clone()
    }

    pub fn on_trade_update(&self, handler: Arc<dyn EventHandler<Trade>>) {
        self.trade_handlers.write().push(handler);
    }

    pub fn on_order_update(&self, handler: Arc<dyn EventHandler<Order>>) {
        self.order_handlers.write().push(handler);
    }

    pub fn emit_trade_update(&self, trade: &Trade) {
        // Snapshot so a handler can register further handlers without deadlocking
        let handlers = self.trade_handlers.read().clone();
        for handler in handlers {
            handler.handle(trade);
        }
    }

    pub fn emit_order_update(&self, order: &Order) {
        let handlers = self.order_handlers.read().clone();
        for handler in handlers {
            handler.handle(order);
        }
    }

    pub fn trade_handler_count(&self) -> usize {
        self.trade_handlers.read().len()
    }

    pub fn order_handler_count(&self) -> usize {
        self.order_handlers.read().len()
    }
}
