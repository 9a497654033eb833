#![allow(dead_code)]

use async_trait::async_trait;
use athena_core::{
    Balance, Market, Order, OrderStatus, OrderType, Side, StreamChannel, SubscribeOptions, Trade,
};
use athena_ports::{
    EventHandler, Exchange, ExchangeError, MarginExchange, Notification, Notifier, StandardStream,
    Stream, StreamError, SyncError, SyncService,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

// ---- Exchange ----

#[derive(Default)]
pub struct FakeStream {
    pub inner: StandardStream,
    pub fail_connect: bool,
    pub connected: AtomicBool,
    pub closed: AtomicBool,
}

#[async_trait]
impl Stream for FakeStream {
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
        if self.fail_connect {
            return Err(StreamError::Connection("refused".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), StreamError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeExchange {
    pub name: String,
    pub markets: Vec<Market>,
    pub balances: Vec<Balance>,
    pub stream: Arc<FakeStream>,
    pub supports_margin: bool,
    pub margin_calls: Mutex<Vec<String>>,
    pub balance_queries: AtomicUsize,
}

impl FakeExchange {
    pub fn new(name: &str) -> Self {
        FakeExchange {
            name: name.to_string(),
            markets: Vec::new(),
            balances: Vec::new(),
            stream: Arc::new(FakeStream::default()),
            supports_margin: false,
            margin_calls: Mutex::new(Vec::new()),
            balance_queries: AtomicUsize::new(0),
        }
    }

    pub fn with_markets(mut self, markets: Vec<Market>) -> Self {
        self.markets = markets;
        self
    }

    pub fn with_balances(mut self, balances: Vec<Balance>) -> Self {
        self.balances = balances;
        self
    }

    pub fn with_margin(mut self) -> Self {
        self.supports_margin = true;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.stream = Arc::new(FakeStream {
            fail_connect: true,
            ..FakeStream::default()
        });
        self
    }
}

#[async_trait]
impl Exchange for FakeExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_stream(&self) -> Arc<dyn Stream> {
        self.stream.clone()
    }

    async fn query_markets(&self) -> Result<Vec<Market>, ExchangeError> {
        Ok(self.markets.clone())
    }

    async fn query_balances(&self) -> Result<Vec<Balance>, ExchangeError> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.balances.clone())
    }

    fn as_margin(&self) -> Option<&dyn MarginExchange> {
        if self.supports_margin { Some(self) } else { None }
    }
}

impl MarginExchange for FakeExchange {
    fn use_margin(&self) {
        self.margin_calls.lock().push("cross".to_string());
    }

    fn use_isolated_margin(&self, symbol: &str) {
        self.margin_calls.lock().push(format!("isolated:{}", symbol));
    }
}

// ---- Notifier ----

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Option<String>, Notification)>>,
}

impl RecordingNotifier {
    pub fn channels(&self) -> Vec<Option<String>> {
        self.sent.lock().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, n)| n.text.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.sent.lock().push((None, notification.clone()));
    }

    fn notify_to(&self, channel: &str, notification: &Notification) {
        self.sent
            .lock()
            .push((Some(channel.to_string()), notification.clone()));
    }
}

// ---- Sync ----

#[derive(Debug, Clone)]
pub struct SyncCall {
    pub exchange: String,
    pub since: DateTime<Utc>,
    pub symbols: Vec<String>,
}

/// Records calls; optionally parks each call until released
#[derive(Default)]
pub struct FakeSyncService {
    pub calls: Mutex<Vec<SyncCall>>,
    pub fail_exchange: Option<String>,
    pub delay: Option<Duration>,
    pub gated: bool,
    pub entered: Notify,
    pub release: Notify,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeSyncService {
    pub fn calls(&self) -> Vec<SyncCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SyncService for FakeSyncService {
    async fn sync_session_symbols(
        &self,
        exchange: &dyn Exchange,
        since: DateTime<Utc>,
        symbols: &[String],
    ) -> Result<(), SyncError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        self.calls.lock().push(SyncCall {
            exchange: exchange.name().to_string(),
            since,
            symbols: symbols.to_vec(),
        });

        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_exchange.as_deref() == Some(exchange.name()) {
            return Err(SyncError::Storage("disk full".to_string()));
        }
        Ok(())
    }
}

// ---- Fixtures ----

pub fn trade(exchange: &str, symbol: &str) -> Trade {
    Trade {
        id: 1,
        order_id: 10,
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        side: Side::Buy,
        price: dec!(100),
        quantity: dec!(2),
        fee: dec!(0.1),
        fee_currency: "USDT".to_string(),
        is_maker: true,
        time: Utc::now(),
    }
}

pub fn order(exchange: &str, symbol: &str) -> Order {
    Order {
        order_id: 10,
        client_order_id: "c-10".to_string(),
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        side: Side::Sell,
        order_type: OrderType::Limit,
        price: dec!(100),
        quantity: dec!(2),
        executed_quantity: dec!(1),
        status: OrderStatus::PartiallyFilled,
        update_time: Utc::now(),
    }
}

pub fn balance(currency: &str, available: Decimal) -> Balance {
    Balance::new(currency, available, Decimal::ZERO)
}
