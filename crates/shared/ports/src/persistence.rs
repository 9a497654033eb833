use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::StoreError;

/// A single namespaced slot in a persistence backend
pub trait Store: Send + Sync {
    /// Load the persisted value, `StoreError::NotFound` when nothing was saved
    fn load_value(&self) -> Result<Value, StoreError>;

    fn save_value(&self, value: &Value) -> Result<(), StoreError>;

    fn reset(&self) -> Result<(), StoreError>;
}

/// Typed access on top of [`Store`]
pub trait StoreExt: Store {
    fn load<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let value = self.load_value()?;
        Ok(serde_json::from_value(value)?)
    }

    fn save<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        self.save_value(&value)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

/// Persistence backend handing out namespaced stores
pub trait Persistence: Send + Sync {
    /// Create a store for the given namespace, e.g. `["athena", "telegram", "12345"]`
    fn new_store(&self, namespace: &[&str]) -> Box<dyn Store>;
}
