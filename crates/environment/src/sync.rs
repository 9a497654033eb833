//! Single-flight history sync
//!
//! ```text
//!   sync_all / sync_session
//!          │
//!          ▼
//!   ┌──────────────┐  held across awaits, callers queue here
//!   │  sync lock   │
//!   └──────┬───────┘
//!          ▼
//!   status = Syncing ──► SyncService::sync_session_symbols ──► status = Done
//!                          (per session, fail-fast)             (every exit path)
//! ```

use athena_core::SyncStatus;
use athena_ports::SyncService;
use chrono::{DateTime, Months, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::error::EnvironmentError;
use crate::registry::SessionRegistry;
use crate::session::ExchangeSession;

/// Serializes backfill passes across the whole environment
pub struct SyncCoordinator {
    service: Option<Arc<dyn SyncService>>,
    since: RwLock<DateTime<Utc>>,
    lock: tokio::sync::Mutex<()>,
    status: Mutex<SyncStatus>,
}

/// Marks the pass done when dropped, before the sync lock is released
struct DoneOnDrop<'a>(&'a Mutex<SyncStatus>);

impl Drop for DoneOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.lock() = SyncStatus::Done;
    }
}

impl SyncCoordinator {
    /// Coordinator with the default checkpoint of one year ago
    pub fn new() -> Self {
        let now = Utc::now();
        SyncCoordinator {
            service: None,
            since: RwLock::new(now.checked_sub_months(Months::new(12)).unwrap_or(now)),
            lock: tokio::sync::Mutex::new(()),
            status: Mutex::new(SyncStatus::NotStarted),
        }
    }

    pub fn set_service(&mut self, service: Arc<dyn SyncService>) {
        self.service = Some(service);
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    pub fn set_since(&self, since: DateTime<Utc>) {
        *self.since.write() = since;
    }

    pub fn since(&self) -> DateTime<Utc> {
        *self.since.read()
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.lock()
    }

    /// Sync every session in registry order, stopping at the first error
    pub async fn sync_all(&self, sessions: &SessionRegistry) -> Result<(), EnvironmentError> {
        let Some(service) = &self.service else {
            return Ok(());
        };

        let _lock = self.lock.lock().await;
        *self.status.lock() = SyncStatus::Syncing;
        let _done = DoneOnDrop(&self.status);

        for (_, session) in sessions.iter() {
            self.sync_one(service.as_ref(), session, &[]).await?;
        }
        Ok(())
    }

    /// Sync one session; `symbols` is used unless the session is pinned
    /// to an isolated margin symbol
    pub async fn sync_session(
        &self,
        session: &ExchangeSession,
        symbols: &[String],
    ) -> Result<(), EnvironmentError> {
        let Some(service) = &self.service else {
            return Ok(());
        };

        let _lock = self.lock.lock().await;
        *self.status.lock() = SyncStatus::Syncing;
        let _done = DoneOnDrop(&self.status);

        self.sync_one(service.as_ref(), session, symbols).await
    }

    async fn sync_one(
        &self,
        service: &dyn SyncService,
        session: &ExchangeSession,
        symbols: &[String],
    ) -> Result<(), EnvironmentError> {
        let symbols = session_symbols(session, symbols)?;
        let since = self.since();

        tracing::info!(session = session.name(), ?symbols, %since, "syncing session symbols");

        service
            .sync_session_symbols(session.exchange().as_ref(), since, &symbols)
            .await
            .map_err(|source| EnvironmentError::Sync {
                session: session.name().to_string(),
                source,
            })
    }
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Isolated symbol, else the caller's symbols, else discovered symbols
pub fn session_symbols(
    session: &ExchangeSession,
    symbols: &[String],
) -> Result<Vec<String>, EnvironmentError> {
    if let Some(symbol) = session.margin().isolated_symbol() {
        return Ok(vec![symbol.to_string()]);
    }
    if !symbols.is_empty() {
        return Ok(symbols.to_vec());
    }
    Ok(session.find_possible_symbols()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::stub_exchange;
    use athena_core::MarginMode;
    use chrono::Duration;

    #[test]
    fn test_default_checkpoint_is_a_year_back() {
        let coordinator = SyncCoordinator::new();
        let age = Utc::now() - coordinator.since();
        assert!(age > Duration::days(364) && age < Duration::days(367));
        assert_eq!(coordinator.status(), SyncStatus::NotStarted);
    }

    #[test]
    fn test_isolated_symbol_overrides_caller_symbols() {
        let session = ExchangeSession::new("b", stub_exchange("binance")).with_margin(
            MarginMode::Isolated {
                symbol: "ETHUSDT".to_string(),
            },
        );
        let symbols = session_symbols(&session, &["BTCUSDT".to_string()]).unwrap();
        assert_eq!(symbols, vec!["ETHUSDT"]);
    }

    #[test]
    fn test_caller_symbols_used_when_not_isolated() {
        let session = ExchangeSession::new("b", stub_exchange("binance"));
        let symbols = session_symbols(&session, &["BTCUSDT".to_string()]).unwrap();
        assert_eq!(symbols, vec!["BTCUSDT"]);
    }

    #[tokio::test]
    async fn test_without_service_is_a_no_op() {
        let coordinator = SyncCoordinator::new();
        let sessions = SessionRegistry::new();
        coordinator.sync_all(&sessions).await.unwrap();
        assert_eq!(coordinator.status(), SyncStatus::NotStarted);
    }
}
