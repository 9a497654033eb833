use std::collections::BTreeMap;
use std::sync::Arc;

use crate::session::ExchangeSession;

/// Named exchange sessions, iterated in name order.
///
/// Mutated during setup only; afterwards sessions are shared as `Arc`s.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<String, Arc<ExchangeSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the session stored under `name`
    pub fn add(&mut self, name: impl Into<String>, session: ExchangeSession) -> Arc<ExchangeSession> {
        let name = name.into();
        let session = Arc::new(session);
        if self.sessions.insert(name.clone(), Arc::clone(&session)).is_some() {
            tracing::warn!(session = %name, "replacing existing exchange session");
        }
        session
    }

    pub fn get(&self, name: &str) -> Option<Arc<ExchangeSession>> {
        self.sessions.get(name).cloned()
    }

    /// Every session when `names` is empty, otherwise the named ones that exist
    pub fn select(&self, names: &[&str]) -> BTreeMap<String, Arc<ExchangeSession>> {
        if names.is_empty() {
            return self.sessions.clone();
        }

        names
            .iter()
            .filter_map(|name| {
                self.sessions
                    .get(*name)
                    .map(|s| (name.to_string(), Arc::clone(s)))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<ExchangeSession>)> {
        self.sessions.iter().map(|(name, s)| (name.as_str(), s))
    }

    pub fn names(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubExchange;

    fn session(name: &str) -> ExchangeSession {
        ExchangeSession::new(name, Arc::new(StubExchange::new("binance")))
    }

    #[test]
    fn test_distinct_names_never_alias() {
        let mut registry = SessionRegistry::new();
        registry.add("binance", session("binance"));
        registry.add("ftx", session("ftx"));

        let a = registry.get("binance").unwrap();
        let b = registry.get("ftx").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "binance");
        assert_eq!(b.name(), "ftx");
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = SessionRegistry::new();
        let first = registry.add("main", session("first"));
        let second = registry.add("main", session("second"));

        assert_eq!(registry.len(), 1);
        let stored = registry.get("main").unwrap();
        assert!(Arc::ptr_eq(&stored, &second));
        assert!(!Arc::ptr_eq(&stored, &first));
    }

    #[test]
    fn test_select() {
        let mut registry = SessionRegistry::new();
        registry.add("binance", session("binance"));
        registry.add("ftx", session("ftx"));
        registry.add("max", session("max"));

        assert_eq!(registry.select(&[]).len(), 3);

        let selected = registry.select(&["ftx", "missing"]);
        assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["ftx"]);

        assert!(registry.select(&["missing"]).is_empty());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let mut registry = SessionRegistry::new();
        registry.add("okex", session("okex"));
        registry.add("binance", session("binance"));

        let names: Vec<_> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["binance", "okex"]);
        assert_eq!(registry.names(), vec!["binance", "okex"]);
    }
}
