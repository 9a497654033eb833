use athena_core::{EventKind, MarginMode, Subscription};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Root configuration of an environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Sessions by name, in file order
    #[serde(default)]
    pub sessions: IndexMap<String, SessionConfig>,
    #[serde(default)]
    pub persistence: Option<PersistenceConfig>,
    #[serde(default)]
    pub notifications: Option<NotificationConfig>,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Configuration for a single exchange session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Exchange name (e.g., "binance")
    pub exchange: String,
    /// Prefix of the `<PREFIX>_API_KEY` / `<PREFIX>_API_SECRET` variables,
    /// defaults to the upper-cased exchange name
    #[serde(default)]
    pub env_var_prefix: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub sub_account: Option<String>,
    /// Market data only, no credentials required
    #[serde(default)]
    pub public_only: bool,
    #[serde(default)]
    pub margin: bool,
    #[serde(default)]
    pub isolated_margin: bool,
    #[serde(default)]
    pub isolated_margin_symbol: Option<String>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl SessionConfig {
    pub fn new(exchange: impl Into<String>) -> Self {
        SessionConfig {
            exchange: exchange.into(),
            env_var_prefix: None,
            key: None,
            secret: None,
            sub_account: None,
            public_only: false,
            margin: false,
            isolated_margin: false,
            isolated_margin_symbol: None,
            subscriptions: Vec::new(),
        }
    }

    /// Env var prefix used for credential lookup
    pub fn env_prefix(&self) -> String {
        self.env_var_prefix
            .clone()
            .unwrap_or_else(|| self.exchange.to_uppercase())
    }

    pub fn margin_mode(&self, session: &str) -> Result<MarginMode, ConfigError> {
        if !self.margin {
            return Ok(MarginMode::None);
        }
        if !self.isolated_margin {
            return Ok(MarginMode::Cross);
        }

        match self.isolated_margin_symbol.as_deref().map(str::trim) {
            Some(symbol) if !symbol.is_empty() => Ok(MarginMode::Isolated {
                symbol: symbol.to_uppercase(),
            }),
            _ => Err(ConfigError::MissingIsolatedSymbol(session.to_string())),
        }
    }
}

/// Persistence backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub json: Option<JsonPersistenceConfig>,
    /// Preferred over `json` when both are set
    #[serde(default)]
    pub redis: Option<RedisPersistenceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonPersistenceConfig {
    pub directory: PathBuf,
}

/// Redis server; `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB` and `REDIS_PASSWORD`
/// override these values when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedisPersistenceConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub db: Option<i64>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Notifier settings, channel routes and routing policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub slack: Option<SlackNotificationConfig>,
    #[serde(default)]
    pub telegram: Option<TelegramNotificationConfig>,
    /// Symbol pattern to channel, first match wins
    #[serde(default)]
    pub symbol_channels: IndexMap<String, String>,
    /// Session name pattern to channel, first match wins
    #[serde(default)]
    pub session_channels: IndexMap<String, String>,
    #[serde(default)]
    pub routing: Option<RoutingConfig>,
    /// Template overrides per event kind
    #[serde(default)]
    pub templates: IndexMap<EventKind, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackNotificationConfig {
    pub default_channel: String,
    /// ERROR log events are posted here when set
    #[serde(default)]
    pub error_channel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramNotificationConfig {
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// Where the OTP QR code image is written
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
}

impl Default for TelegramNotificationConfig {
    fn default() -> Self {
        TelegramNotificationConfig {
            poll_timeout_secs: default_poll_timeout_secs(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

/// Dispatch mode of one event kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingMode {
    /// No notification
    #[default]
    #[serde(rename = "$silent")]
    Silent,
    /// Channel picked by the session name
    #[serde(rename = "$session")]
    Session,
    /// Channel picked by the event symbol
    #[serde(rename = "$symbol")]
    Symbol,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub trade: RoutingMode,
    #[serde(default)]
    pub order: RoutingMode,
    #[serde(default)]
    pub submit_order: RoutingMode,
    #[serde(default)]
    pub pnl: RoutingMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Checkpoint override, defaults to one year before start
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

fn default_poll_timeout_secs() -> u64 {
    10
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from(".")
}
