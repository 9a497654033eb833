use athena_ports::{Persistence, StoreError};
use std::path::PathBuf;

use crate::json::JsonPersistence;
use crate::memory::MemoryPersistence;
use crate::redis_store::{RedisConfig, RedisPersistence};

/// Holds every configured backend and hands out the preferred one
#[derive(Clone, Default)]
pub struct PersistenceFacade {
    memory: MemoryPersistence,
    json: Option<JsonPersistence>,
    redis: Option<RedisPersistence>,
}

impl PersistenceFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the JSON directory backend
    pub fn configure_json(&mut self, directory: impl Into<PathBuf>) -> Result<(), StoreError> {
        let json = JsonPersistence::open(directory)?;
        tracing::info!(directory = %json.directory().display(), "json persistence enabled");
        self.json = Some(json);
        Ok(())
    }

    /// Enable the Redis backend
    pub fn configure_redis(&mut self, config: RedisConfig) -> Result<(), StoreError> {
        let redis = RedisPersistence::open(config)?;
        tracing::info!(host = %redis.config().host, port = redis.config().port, db = redis.config().db, "redis persistence enabled");
        self.redis = Some(redis);
        Ok(())
    }

    /// The most durable configured backend: Redis, then JSON, then memory
    pub fn get(&self) -> &dyn Persistence {
        if let Some(redis) = &self.redis {
            return redis;
        }
        match &self.json {
            Some(json) => json,
            None => &self.memory,
        }
    }

    pub fn memory(&self) -> &MemoryPersistence {
        &self.memory
    }

    pub fn json(&self) -> Option<&JsonPersistence> {
        self.json.as_ref()
    }

    pub fn redis(&self) -> Option<&RedisPersistence> {
        self.redis.as_ref()
    }
}
