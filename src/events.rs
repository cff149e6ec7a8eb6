/// Callback surface for the UI collaborator.
///
/// The core never renders anything; it reports through this trait and the
/// collaborator decides what to show. Implementations must be cheap and
/// non-blocking, as callbacks fire from the polling loops.
use crate::error::WalletError;
use crate::snapshot::WalletSnapshot;

/// Synchronization progress, emitted while the daemon catches up with the
/// network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncProgress {
    /// Whole percent synchronized, rounded down.
    pub percent: u64,
    pub block_count: u64,
    pub known_block_count: u64,
    /// Rough wall-clock lag, assuming one block every 30 seconds.
    pub days_behind: u64,
}

pub trait WalletEvents: Send + Sync + 'static {
    /// Human-readable progress message for a status line.
    fn on_status_update(&self, _message: &str) {}

    /// Numeric synchronization progress, for a progress bar.
    fn on_sync_progress(&self, _progress: SyncProgress) {}

    /// The wallet is synchronized and the refresh loop is about to start.
    fn on_ready(&self) {}

    /// The daemon could not be recovered; the background loops have stopped.
    fn on_fatal(&self, _cause: &WalletError) {}

    /// A fresh snapshot was published.
    fn on_snapshot_updated(&self, _snapshot: &WalletSnapshot) {}
}

/// Event sink that ignores everything. Useful for tests and headless use.
pub struct NullEvents;

impl WalletEvents for NullEvents {}
