/// Status of the environment-wide history sync
/// Domain concept representing the backfill state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// No sync pass has run yet
    #[default]
    NotStarted,
    /// A sync pass holds the sync lock
    Syncing,
    /// The last sync pass finished, successfully or not
    Done,
}

impl SyncStatus {
    /// Check if a sync pass is currently running
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncStatus::Syncing)
    }
}
