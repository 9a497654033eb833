use athena_core::{Balance, Credentials, MarginMode, Market, StreamChannel, SubscribeOptions, Subscription};
use athena_ports::{Exchange, Stream};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::SessionError;

/// Quote currencies considered when discovering tradable symbols
pub const FIAT_CURRENCIES: &[&str] = &["USDT", "USDC", "BUSD", "USD", "TWD", "EUR", "GBP"];

/// Lifecycle of an exchange session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    /// Markets (and balances for private sessions) are loaded
    Initialized,
    /// Subscriptions flushed and stream connected
    Connected,
    Closed,
}

/// One named connection to an exchange
pub struct ExchangeSession {
    name: String,
    exchange_name: String,
    credentials: Option<Credentials>,
    env_var_prefix: Option<String>,
    public_only: bool,
    margin: MarginMode,
    exchange: Arc<dyn Exchange>,
    stream: Arc<dyn Stream>,
    subscriptions: RwLock<Vec<Subscription>>,
    state: RwLock<SessionState>,
    markets: RwLock<BTreeMap<String, Market>>,
    balances: RwLock<BTreeMap<String, Balance>>,
}

impl ExchangeSession {
    pub fn new(name: impl Into<String>, exchange: Arc<dyn Exchange>) -> Self {
        let stream = exchange.new_stream();
        ExchangeSession {
            name: name.into(),
            exchange_name: exchange.name().to_string(),
            credentials: None,
            env_var_prefix: None,
            public_only: false,
            margin: MarginMode::None,
            exchange,
            stream,
            subscriptions: RwLock::new(Vec::new()),
            state: RwLock::new(SessionState::Uninitialized),
            markets: RwLock::new(BTreeMap::new()),
            balances: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_env_var_prefix(mut self, prefix: Option<String>) -> Self {
        self.env_var_prefix = prefix;
        self
    }

    pub fn with_public_only(mut self, public_only: bool) -> Self {
        self.public_only = public_only;
        self
    }

    pub fn with_margin(mut self, margin: MarginMode) -> Self {
        self.margin = margin;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exchange_name(&self) -> &str {
        &self.exchange_name
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn env_var_prefix(&self) -> Option<&str> {
        self.env_var_prefix.as_deref()
    }

    pub fn is_public_only(&self) -> bool {
        self.public_only
    }

    pub fn margin(&self) -> &MarginMode {
        &self.margin
    }

    pub fn exchange(&self) -> &Arc<dyn Exchange> {
        &self.exchange
    }

    pub fn stream(&self) -> &Arc<dyn Stream> {
        &self.stream
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Queue a subscription; it is sent to the stream on connect
    pub fn subscribe(&self, channel: StreamChannel, symbol: &str, options: SubscribeOptions) -> &Self {
        self.subscriptions
            .write()
            .push(Subscription::new(channel, symbol).with_options(options));
        self
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.read().clone()
    }

    pub fn market(&self, symbol: &str) -> Option<Market> {
        self.markets.read().get(symbol).cloned()
    }

    pub fn markets(&self) -> Vec<Market> {
        self.markets.read().values().cloned().collect()
    }

    pub fn balance(&self, currency: &str) -> Option<Balance> {
        self.balances.read().get(currency).cloned()
    }

    /// Load markets, and balances unless the session is public-only
    pub async fn init(&self) -> Result<(), SessionError> {
        if self.state() != SessionState::Uninitialized {
            return Err(SessionError::AlreadyInitialized(self.name.clone()));
        }

        let markets = self
            .exchange
            .query_markets()
            .await
            .map_err(|source| self.exchange_error(source))?;
        tracing::info!(session = %self.name, count = markets.len(), "markets loaded");

        let balances = if self.public_only {
            Vec::new()
        } else {
            self.exchange
                .query_balances()
                .await
                .map_err(|source| self.exchange_error(source))?
        };

        *self.markets.write() = markets.into_iter().map(|m| (m.symbol.clone(), m)).collect();
        *self.balances.write() = balances
            .into_iter()
            .map(|b| (b.currency.clone(), b))
            .collect();
        *self.state.write() = SessionState::Initialized;
        Ok(())
    }

    /// Check that every symbol this session trades is listed on the exchange
    pub async fn init_symbols(&self) -> Result<(), SessionError> {
        if self.state() == SessionState::Uninitialized {
            return Err(SessionError::NotInitialized(self.name.clone()));
        }

        let markets = self.markets.read();
        let symbols = self
            .subscriptions
            .read()
            .iter()
            .map(|s| s.symbol.clone())
            .chain(self.margin.isolated_symbol().map(str::to_string))
            .collect::<BTreeSet<_>>();

        for symbol in symbols {
            if !markets.contains_key(&symbol) {
                return Err(SessionError::UnknownSymbol {
                    session: self.name.clone(),
                    symbol,
                });
            }
        }
        Ok(())
    }

    /// Flush queued subscriptions to the stream and connect it
    pub async fn connect(&self) -> Result<(), SessionError> {
        for subscription in self.subscriptions() {
            tracing::info!(
                session = %self.name,
                symbol = %subscription.symbol,
                channel = %subscription.channel,
                "subscribing"
            );
            self.stream.subscribe(
                subscription.channel,
                &subscription.symbol,
                subscription.options.clone(),
            );
        }

        tracing::info!(session = %self.name, "connecting session");
        self.stream
            .connect()
            .await
            .map_err(|source| SessionError::Stream {
                session: self.name.clone(),
                source,
            })?;
        *self.state.write() = SessionState::Connected;
        Ok(())
    }

    pub async fn close(&self) -> Result<(), SessionError> {
        let result = self.stream.close().await;
        *self.state.write() = SessionState::Closed;
        result.map_err(|source| SessionError::Stream {
            session: self.name.clone(),
            source,
        })
    }

    /// Symbols worth syncing: the isolated margin symbol, otherwise every
    /// fiat-quoted market where both quote and base assets have a balance
    pub fn find_possible_symbols(&self) -> Result<Vec<String>, SessionError> {
        if let Some(symbol) = self.margin.isolated_symbol() {
            return Ok(vec![symbol.to_string()]);
        }

        if self.state() == SessionState::Uninitialized {
            return Err(SessionError::NotInitialized(self.name.clone()));
        }

        let balances = self.balances.read();
        let has_balance = |currency: &str| {
            balances
                .get(currency)
                .is_some_and(|b| b.total() > Decimal::ZERO)
        };

        let symbols = self
            .markets
            .read()
            .values()
            .filter(|m| FIAT_CURRENCIES.contains(&m.quote_currency.as_str()))
            .filter(|m| has_balance(&m.quote_currency) && has_balance(&m.base_currency))
            .map(|m| m.symbol.clone())
            .collect();
        Ok(symbols)
    }

    fn exchange_error(&self, source: athena_ports::ExchangeError) -> SessionError {
        SessionError::Exchange {
            session: self.name.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for ExchangeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeSession")
            .field("name", &self.name)
            .field("exchange", &self.exchange_name)
            .field("public_only", &self.public_only)
            .field("margin", &self.margin)
            .field("state", &self.state())
            .finish()
    }
}
