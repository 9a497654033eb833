//! Error types for the environment crate

use athena_notify::{RenderError, RouteError};
use athena_pairing::PairingError;
use athena_ports::{ChatError, ExchangeError, StoreError, StreamError, SyncError};
use thiserror::Error;

/// Errors raised by a single exchange session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session {0} is already initialized")]
    AlreadyInitialized(String),

    #[error("Session {0} is not initialized")]
    NotInitialized(String),

    #[error("Session {session}: unknown symbol {symbol}")]
    UnknownSymbol { session: String, symbol: String },

    #[error("Session {session}: {source}")]
    Exchange {
        session: String,
        #[source]
        source: ExchangeError,
    },

    #[error("Session {session}: {source}")]
    Stream {
        session: String,
        #[source]
        source: StreamError,
    },
}

/// Setup-time configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("Can not create exchange {exchange}: {source}")]
    Exchange {
        exchange: String,
        #[source]
        source: ExchangeError,
    },

    #[error("Exchange {0} does not support margin")]
    MarginNotSupported(String),

    #[error("Session {0}: isolated margin requires a symbol")]
    MissingIsolatedSymbol(String),

    #[error("Session {0}: key and secret must be set together")]
    IncompleteCredentials(String),

    #[error("Session {session}: no credentials, set {prefix}_API_KEY and {prefix}_API_SECRET")]
    MissingCredentials { session: String, prefix: String },

    #[error("Invalid value {value:?} in {name}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Invalid channel route: {0}")]
    Route(#[from] RouteError),

    #[error("Invalid notification template: {0}")]
    Template(#[from] RenderError),

    #[error("Notification routing is already configured")]
    RoutingAlreadyConfigured,

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Chat bot error: {0}")]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}

/// Strategy registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Strategy key must not be empty")]
    EmptyKey,

    #[error("Strategy {0} declares no capability")]
    NoCapability(String),

    #[error("Strategy {0} is already registered")]
    Duplicate(String),
}

/// Errors of environment-wide operations
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to sync session {session}: {source}")]
    Sync {
        session: String,
        #[source]
        source: SyncError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
