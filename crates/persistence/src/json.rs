use athena_ports::{Persistence, Store, StoreError};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

use crate::namespace_key;

/// Persistence writing one JSON file per namespace into a directory
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    directory: PathBuf,
}

impl JsonPersistence {
    /// Use `directory`, creating it when it does not exist yet
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let directory = directory.into();
        if !directory.exists() {
            std::fs::create_dir_all(&directory).map_err(|e| {
                tracing::error!(directory = %directory.display(), "can not create directory: {}", e);
                e
            })?;
        }
        Ok(JsonPersistence { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Persistence for JsonPersistence {
    fn new_store(&self, namespace: &[&str]) -> Box<dyn Store> {
        let key = namespace_key(namespace);
        Box::new(JsonStore {
            path: self.directory.join(format!("{}.json", key)),
            key,
        })
    }
}

/// A namespaced JSON file of [`JsonPersistence`]
pub struct JsonStore {
    key: String,
    path: PathBuf,
}

impl JsonStore {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonStore {
    fn load_value(&self) -> Result<Value, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.key.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn save_value(&self, value: &Value) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn reset(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
