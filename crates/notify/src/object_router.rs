use parking_lot::RwLock;
use std::any::Any;

type Matcher = Box<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>;

/// Maps an arbitrary typed event to a channel.
///
/// Matchers are tried in registration order; the first one returning a
/// channel wins.
#[derive(Default)]
pub struct ObjectChannelRouter {
    matchers: RwLock<Vec<Matcher>>,
}

impl ObjectChannelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, matcher: F)
    where
        F: Fn(&dyn Any) -> Option<String> + Send + Sync + 'static,
    {
        self.matchers.write().push(Box::new(matcher));
    }

    /// Register a matcher that only sees events of the exact type `T`
    pub fn register_typed<T, F>(&self, matcher: F)
    where
        T: Any,
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.register(move |obj| obj.downcast_ref::<T>().and_then(&matcher));
    }

    pub fn route(&self, obj: &dyn Any) -> Option<String> {
        self.matchers.read().iter().find_map(|matcher| matcher(obj))
    }

    pub fn len(&self) -> usize {
        self.matchers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fill {
        symbol: String,
    }

    struct Cancel {
        symbol: String,
    }

    #[test]
    fn test_type_discrimination_is_exact() {
        let router = ObjectChannelRouter::new();
        let fill_calls = Arc::new(AtomicUsize::new(0));
        let cancel_calls = Arc::new(AtomicUsize::new(0));

        let calls = Arc::clone(&fill_calls);
        router.register_typed(move |fill: &Fill| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(format!("fills-{}", fill.symbol))
        });
        let calls = Arc::clone(&cancel_calls);
        router.register_typed(move |cancel: &Cancel| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(format!("cancels-{}", cancel.symbol))
        });

        let cancel = Cancel {
            symbol: "BTCUSDT".to_string(),
        };
        assert_eq!(router.route(&cancel), Some("cancels-BTCUSDT".to_string()));
        assert_eq!(fill_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let router = ObjectChannelRouter::new();
        router.register_typed(|_: &Fill| Some("first".to_string()));
        router.register_typed(|_: &Fill| Some("second".to_string()));

        let fill = Fill {
            symbol: "ETHUSDT".to_string(),
        };
        assert_eq!(router.route(&fill), Some("first".to_string()));
    }

    #[test]
    fn test_unmatched_falls_through_to_next_matcher() {
        let router = ObjectChannelRouter::new();
        router.register_typed(|fill: &Fill| {
            (fill.symbol == "BTCUSDT").then(|| "btc".to_string())
        });
        router.register(|_| Some("anything".to_string()));

        let fill = Fill {
            symbol: "ETHUSDT".to_string(),
        };
        assert_eq!(router.route(&fill), Some("anything".to_string()));
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_no_matchers() {
        let router = ObjectChannelRouter::new();
        assert!(router.is_empty());
        assert_eq!(router.route(&42u32), None);
    }
}
