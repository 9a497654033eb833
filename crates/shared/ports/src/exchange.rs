use std::sync::Arc;

use async_trait::async_trait;
use athena_core::{Balance, Market};

use crate::error::ExchangeError;
use crate::stream::Stream;

/// An authenticated (or public) exchange API client owned by a session
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Exchange name such as "binance"
    fn name(&self) -> &str;

    /// Create the stream this exchange pushes market and user data through
    fn new_stream(&self) -> Arc<dyn Stream>;

    async fn query_markets(&self) -> Result<Vec<Market>, ExchangeError>;

    async fn query_balances(&self) -> Result<Vec<Balance>, ExchangeError>;

    /// Margin capability, `None` for spot-only exchanges
    fn as_margin(&self) -> Option<&dyn MarginExchange> {
        None
    }
}

/// Exchanges that can switch their account into margin mode
pub trait MarginExchange: Send + Sync {
    fn use_margin(&self);

    fn use_isolated_margin(&self, symbol: &str);
}
