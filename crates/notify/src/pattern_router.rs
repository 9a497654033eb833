use glob::Pattern;
use parking_lot::RwLock;

use crate::error::RouteError;

struct Route {
    pattern: Pattern,
    channel: String,
}

/// Maps a string key (symbol or session name) to a channel.
///
/// Rules are evaluated in insertion order and the first glob pattern that
/// matches the key wins. Matching is case-sensitive.
#[derive(Default)]
pub struct PatternChannelRouter {
    routes: RwLock<Vec<Route>>,
}

impl PatternChannelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router from `(pattern, channel)` rules
    pub fn with_routes<I, K, V>(rules: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let router = Self::new();
        router.add_route(rules)?;
        Ok(router)
    }

    /// Append rules in the iteration order of `rules`.
    ///
    /// Either every rule is added or, when one pattern is invalid, none is.
    pub fn add_route<I, K, V>(&self, rules: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let compiled = rules
            .into_iter()
            .map(|(pattern, channel)| {
                let pattern = pattern.as_ref();
                Pattern::new(pattern)
                    .map(|pattern| Route {
                        pattern,
                        channel: channel.into(),
                    })
                    .map_err(|e| RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.msg.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.routes.write().extend(compiled);
        Ok(())
    }

    /// Channel of the first rule matching `key`
    pub fn route(&self, key: &str) -> Option<String> {
        self.routes
            .read()
            .iter()
            .find(|r| r.pattern.matches(key))
            .map(|r| r.channel.clone())
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }
}
