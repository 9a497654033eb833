use athena_ports::{Persistence, Store, StoreError};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::namespace_key;

/// In-memory persistence
///
/// Thread-safe storage using DashMap. Values live as long as the process.
#[derive(Clone, Default)]
pub struct MemoryPersistence {
    slots: Arc<DashMap<String, Value>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of namespaces holding a value
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Persistence for MemoryPersistence {
    fn new_store(&self, namespace: &[&str]) -> Box<dyn Store> {
        Box::new(MemoryStore {
            key: namespace_key(namespace),
            slots: Arc::clone(&self.slots),
        })
    }
}

/// A namespaced slot of [`MemoryPersistence`]
pub struct MemoryStore {
    key: String,
    slots: Arc<DashMap<String, Value>>,
}

impl Store for MemoryStore {
    fn load_value(&self) -> Result<Value, StoreError> {
        self.slots
            .get(&self.key)
            .map(|v| v.value().clone())
            .ok_or_else(|| StoreError::NotFound(self.key.clone()))
    }

    fn save_value(&self, value: &Value) -> Result<(), StoreError> {
        self.slots.insert(self.key.clone(), value.clone());
        Ok(())
    }

    fn reset(&self) -> Result<(), StoreError> {
        self.slots.remove(&self.key);
        Ok(())
    }
}
