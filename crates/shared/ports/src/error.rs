use thiserror::Error;

/// Errors reported by an exchange REST client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Operation not supported by {exchange}: {operation}")]
    Unsupported { exchange: String, operation: String },
}

/// Errors reported by an exchange stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Stream closed")]
    Closed,
}

/// Persistence store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No value persisted under {0}")]
    NotFound(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Errors raised by the history sync capability
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Failed to sync {symbol}: {reason}")]
    Symbol { symbol: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Chat bot transport errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {code} - {description}")]
    Api { code: i64, description: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One-time password errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Image encoding failed: {0}")]
    Image(String),
}
