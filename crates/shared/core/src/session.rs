use serde::{Deserialize, Serialize};
use std::fmt;

/// Margin configuration of an exchange session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MarginMode {
    /// Spot trading, no borrowing
    #[default]
    None,
    /// Cross margin - all positions share the same margin pool
    Cross,
    /// Isolated margin pinned to a single symbol
    Isolated { symbol: String },
}

impl MarginMode {
    pub fn is_margin(&self) -> bool {
        !matches!(self, MarginMode::None)
    }

    /// The symbol an isolated margin session is pinned to
    pub fn isolated_symbol(&self) -> Option<&str> {
        match self {
            MarginMode::Isolated { symbol } => Some(symbol),
            _ => None,
        }
    }
}

/// API credentials of a private session.
///
/// Key and secret always travel together; a public-only session carries no
/// `Credentials` at all.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
    #[serde(default)]
    pub sub_account: Option<String>,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials {
            key: key.into(),
            secret: secret.into(),
            sub_account: None,
        }
    }

    pub fn with_sub_account(mut self, sub_account: impl Into<String>) -> Self {
        self.sub_account = Some(sub_account.into());
        self
    }
}

// Keep secrets out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("sub_account", &self.sub_account)
            .finish()
    }
}

/// Market data channel of a stream subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamChannel {
    Book,
    #[serde(rename = "kline")]
    KLine,
    MarketTrade,
    BookTicker,
}

impl fmt::Display for StreamChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamChannel::Book => "book",
            StreamChannel::KLine => "kline",
            StreamChannel::MarketTrade => "market_trade",
            StreamChannel::BookTicker => "book_ticker",
        };
        f.write_str(name)
    }
}

/// Channel-specific subscription options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeOptions {
    /// KLine interval such as "1m" or "1h"
    #[serde(default)]
    pub interval: Option<String>,
    /// Order book depth
    #[serde(default)]
    pub depth: Option<u32>,
}

/// A pending stream subscription, flushed to the stream on connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub channel: StreamChannel,
    pub symbol: String,
    #[serde(default)]
    pub options: SubscribeOptions,
}

impl Subscription {
    pub fn new(channel: StreamChannel, symbol: impl Into<String>) -> Self {
        Subscription {
            channel,
            symbol: symbol.into().to_uppercase(),
            options: SubscribeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SubscribeOptions) -> Self {
        self.options = options;
        self
    }
}
