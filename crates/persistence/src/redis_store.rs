use athena_ports::{Persistence, Store, StoreError};
use redis::{Client, Commands, Connection};
use serde_json::Value;
use std::time::Duration;

use crate::namespace_key;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis server address and credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

impl RedisConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        RedisConfig {
            host: host.into(),
            port,
            db: 0,
            password: None,
        }
    }

    /// `redis://[:password@]host:port/db`
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(password),
                self.host,
                self.port,
                self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 6379)
    }
}

/// Persistence storing one JSON string per namespace on a Redis server.
///
/// The client only parses the address; each store operation opens its own
/// connection, so an unreachable server surfaces as a backend error on use.
#[derive(Debug, Clone)]
pub struct RedisPersistence {
    client: Client,
    config: RedisConfig,
}

impl RedisPersistence {
    pub fn open(config: RedisConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.url()).map_err(backend_error)?;
        Ok(RedisPersistence { client, config })
    }

    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

impl Persistence for RedisPersistence {
    fn new_store(&self, namespace: &[&str]) -> Box<dyn Store> {
        Box::new(RedisStore {
            key: namespace_key(namespace),
            client: self.client.clone(),
        })
    }
}

/// A namespaced key of [`RedisPersistence`]
pub struct RedisStore {
    key: String,
    client: Client,
}

impl RedisStore {
    pub fn key(&self) -> &str {
        &self.key
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        self.client
            .get_connection_with_timeout(CONNECT_TIMEOUT)
            .map_err(|e| {
                tracing::error!(key = %self.key, "redis connection failed: {}", e);
                backend_error(e)
            })
    }
}

impl Store for RedisStore {
    fn load_value(&self) -> Result<Value, StoreError> {
        let content: Option<String> = self.connection()?.get(&self.key).map_err(backend_error)?;
        match content {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Err(StoreError::NotFound(self.key.clone())),
        }
    }

    fn save_value(&self, value: &Value) -> Result<(), StoreError> {
        let content = serde_json::to_string(value)?;
        self.connection()?
            .set::<_, _, ()>(&self.key, content)
            .map_err(backend_error)
    }

    fn reset(&self) -> Result<(), StoreError> {
        self.connection()?
            .del::<_, ()>(&self.key)
            .map_err(backend_error)
    }
}

fn backend_error(e: redis::RedisError) -> StoreError {
    StoreError::Backend(e.to_string())
}
