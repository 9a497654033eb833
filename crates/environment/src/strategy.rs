use std::collections::BTreeMap;

use crate::error::StrategyError;

/// What a strategy can be run as, declared at registration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Runs against one exchange session
    pub single_exchange: bool,
    /// Runs across several sessions at once
    pub cross_exchange: bool,
}

impl Capabilities {
    pub const SINGLE_EXCHANGE: Capabilities = Capabilities {
        single_exchange: true,
        cross_exchange: false,
    };

    pub const CROSS_EXCHANGE: Capabilities = Capabilities {
        single_exchange: false,
        cross_exchange: true,
    };

    pub const BOTH: Capabilities = Capabilities {
        single_exchange: true,
        cross_exchange: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.single_exchange && !self.cross_exchange
    }
}

/// Registered strategy kinds, owned by the environment
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Capabilities>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, capabilities: Capabilities) -> Result<(), StrategyError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(StrategyError::EmptyKey);
        }
        if capabilities.is_empty() {
            return Err(StrategyError::NoCapability(key.to_string()));
        }
        if self.strategies.contains_key(key) {
            return Err(StrategyError::Duplicate(key.to_string()));
        }

        tracing::debug!(strategy = key, ?capabilities, "strategy registered");
        self.strategies.insert(key.to_string(), capabilities);
        Ok(())
    }

    pub fn capabilities(&self, key: &str) -> Option<Capabilities> {
        self.strategies.get(key).copied()
    }

    pub fn single_exchange(&self) -> Vec<&str> {
        self.keys_where(|c| c.single_exchange)
    }

    pub fn cross_exchange(&self) -> Vec<&str> {
        self.keys_where(|c| c.cross_exchange)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    fn keys_where(&self, f: impl Fn(&Capabilities) -> bool) -> Vec<&str> {
        self.strategies
            .iter()
            .filter(|(_, c)| f(c))
            .map(|(key, _)| key.as_str())
            .collect()
    }
}
