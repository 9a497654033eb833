use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SyncError;
use crate::exchange::Exchange;

/// Backfills trades, orders and other account history into local storage
#[async_trait]
pub trait SyncService: Send + Sync {
    /// Sync every record for `symbols` on `exchange` from `since` forward
    async fn sync_session_symbols(
        &self,
        exchange: &dyn Exchange,
        since: DateTime<Utc>,
        symbols: &[String],
    ) -> Result<(), SyncError>;
}
