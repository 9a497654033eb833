use athena_core::Credentials;
use athena_ports::{Exchange, ExchangeError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

type Builder =
    dyn Fn(Option<&Credentials>) -> Result<Arc<dyn Exchange>, ExchangeError> + Send + Sync;

/// Constructors for the exchanges this process supports, keyed by
/// lower-case exchange name
#[derive(Default)]
pub struct ExchangeFactory {
    builders: BTreeMap<String, Box<Builder>>,
}

impl ExchangeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, builder: F) -> &mut Self
    where
        F: Fn(Option<&Credentials>) -> Result<Arc<dyn Exchange>, ExchangeError>
            + Send
            + Sync
            + 'static,
    {
        self.builders.insert(name.to_lowercase(), Box::new(builder));
        self
    }

    pub fn supports(&self, name: &str) -> bool {
        self.builders.contains_key(&name.to_lowercase())
    }

    /// Supported exchange names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.builders.keys().cloned().collect()
    }

    pub fn build(
        &self,
        name: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Arc<dyn Exchange>, ConfigError> {
        let builder = self
            .builders
            .get(&name.to_lowercase())
            .ok_or_else(|| ConfigError::UnknownExchange(name.to_string()))?;

        builder(credentials).map_err(|source| ConfigError::Exchange {
            exchange: name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for ExchangeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeFactory")
            .field("exchanges", &self.names())
            .finish()
    }
}
