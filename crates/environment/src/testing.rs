//! Test doubles shared by unit tests

use async_trait::async_trait;
use athena_core::{Balance, Market, Order, StreamChannel, SubscribeOptions, Trade};
use athena_ports::{
    EventHandler, Exchange, ExchangeError, MarginExchange, StandardStream, Stream, StreamError,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
pub struct StubStream {
    pub inner: StandardStream,
}

#[async_trait]
impl Stream for StubStream {
    fn subscribe(&self, channel: StreamChannel, symbol: &str, options: SubscribeOptions) {
        self.inner.subscribe(channel, symbol, options);
    }

    fn on_trade_update(&self, handler: Arc<dyn EventHandler<Trade>>) {
        self.inner.on_trade_update(handler);
    }

    fn on_order_update(&self, handler: Arc<dyn EventHandler<Order>>) {
        self.inner.on_order_update(handler);
    }

    async fn connect(&self) -> Result<(), StreamError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StreamError> {
        Ok(())
    }
}

pub struct StubExchange {
    name: String,
    pub markets: Vec<Market>,
    pub balances: Vec<Balance>,
    pub margin_calls: Mutex<Vec<String>>,
    pub supports_margin: bool,
}

impl StubExchange {
    pub fn new(name: &str) -> Self {
        StubExchange {
            name: name.to_string(),
            markets: Vec::new(),
            balances: Vec::new(),
            margin_calls: Mutex::new(Vec::new()),
            supports_margin: false,
        }
    }
}

#[async_trait]
impl Exchange for StubExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_stream(&self) -> Arc<dyn Stream> {
        Arc::new(StubStream::default())
    }

    async fn query_markets(&self) -> Result<Vec<Market>, ExchangeError> {
        Ok(self.markets.clone())
    }

    async fn query_balances(&self) -> Result<Vec<Balance>, ExchangeError> {
        Ok(self.balances.clone())
    }

    fn as_margin(&self) -> Option<&dyn MarginExchange> {
        if self.supports_margin { Some(self) } else { None }
    }
}

impl MarginExchange for StubExchange {
    fn use_margin(&self) {
        self.margin_calls.lock().push("cross".to_string());
    }

    fn use_isolated_margin(&self, symbol: &str) {
        self.margin_calls.lock().push(format!("isolated:{}", symbol));
    }
}

pub fn stub_exchange(name: &str) -> Arc<dyn Exchange> {
    Arc::new(StubExchange::new(name))
}
