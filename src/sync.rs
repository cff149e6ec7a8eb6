/// Startup synchronization poller.
///
/// Blocks its caller until the freshly launched daemon is confirmed
/// synchronized with the network, walking through distinct phases because
/// each needs a different cadence and failure tolerance:
///
/// 1. waiting for the RPC server to start answering (1 s probes; the daemon
///    may be busy importing its block database),
/// 2. waiting for chain metadata (the RPC server can be up before the
///    daemon has learned the network height),
/// 3. synchronizing until the local height catches up with the network.
///
/// The daemon exiting in any phase ends the poll; so does a run of 15
/// consecutive connection failures once the RPC server was expected up.
use std::sync::{Arc, Mutex};

use tokio::time::sleep;

use crate::config::PollIntervals;
use crate::daemon::DaemonSession;
use crate::error::WalletError;
use crate::events::{SyncProgress, WalletEvents};
use crate::rpc::{RpcClient, Status};

/// Consecutive connection failures tolerated before giving up.
const MAX_TRANSPORT_FAILURES: u32 = 15;

/// Assumed seconds per block when estimating how far behind the wallet is.
const BLOCK_TIME_SECS: u64 = 30;

/// Outcome of feeding one status sample to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncObservation {
    /// The daemon has not learned the network height yet.
    AwaitingBlockCount,
    /// The reported network height dropped below an earlier report; the
    /// sample is discarded and nothing changes.
    Stale { reported: u64, retained: u64 },
    /// The sample was accepted and the wallet is still behind.
    Progress(SyncProgress),
    /// The sample was accepted and the wallet has caught up.
    Synced(SyncProgress),
}

/// Pure per-sample synchronization state. Kept separate from the polling
/// loop so the acceptance rules are testable without a daemon.
#[derive(Debug, Default)]
pub struct SyncTracker {
    block_count: u64,
    known_block_count: u64,
}

impl SyncTracker {
    pub fn observe(&mut self, status: &Status) -> SyncObservation {
        // The network height occasionally dips for a poll or two; trusting
        // the dip would reopen the wallet as "synchronized" prematurely.
        if status.known_block_count < self.known_block_count {
            return SyncObservation::Stale {
                reported: status.known_block_count,
                retained: self.known_block_count,
            };
        }

        self.block_count = status.block_count;
        self.known_block_count = status.known_block_count;

        if self.known_block_count == 0 {
            return SyncObservation::AwaitingBlockCount;
        }

        let progress = self.progress();
        if self.is_synced() {
            SyncObservation::Synced(progress)
        } else {
            SyncObservation::Progress(progress)
        }
    }

    /// Synchronized once we are within one block of the network height; a
    /// remote node is almost always one block ahead.
    pub fn is_synced(&self) -> bool {
        self.known_block_count > 0 && self.block_count + 1 >= self.known_block_count
    }

    fn progress(&self) -> SyncProgress {
        let behind = self.known_block_count.saturating_sub(self.block_count);
        SyncProgress {
            percent: self.block_count * 100 / self.known_block_count,
            block_count: self.block_count,
            known_block_count: self.known_block_count,
            days_behind: behind * BLOCK_TIME_SECS / 86_400,
        }
    }
}

/// Drives the startup poll against a live session.
pub struct SyncPoller {
    client: RpcClient,
    session: Arc<Mutex<DaemonSession>>,
    events: Arc<dyn WalletEvents>,
    intervals: PollIntervals,
}

impl SyncPoller {
    pub fn new(
        client: RpcClient,
        session: Arc<Mutex<DaemonSession>>,
        events: Arc<dyn WalletEvents>,
    ) -> Self {
        Self::new_with_intervals(client, session, events, PollIntervals::default())
    }

    /// Create a poller with custom cadences (for testing).
    pub fn new_with_intervals(
        client: RpcClient,
        session: Arc<Mutex<DaemonSession>>,
        events: Arc<dyn WalletEvents>,
        intervals: PollIntervals,
    ) -> Self {
        Self {
            client,
            session,
            events,
            intervals,
        }
    }

    /// Poll until the wallet is synchronized. On success the session is
    /// ready for the refresh loop; on failure no usable session exists.
    pub async fn run(&self) -> Result<(), WalletError> {
        self.events.on_status_update("Connecting to the wallet daemon...");
        log::info!("Connecting to the wallet daemon");

        self.wait_for_rpc().await?;
        self.wait_for_sync().await?;

        self.events
            .on_status_update("Wallet is synchronized, opening...");
        log::info!("Wallet successfully synchronized");
        Ok(())
    }

    fn session_running(&self) -> bool {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        session.is_running()
    }

    async fn wait_for_rpc(&self) -> Result<(), WalletError> {
        self.events.on_status_update("Waiting for RPC server...");
        log::info!("Waiting for RPC server...");

        loop {
            if !self.session_running() {
                log::error!("Wallet daemon exited before its RPC server came up");
                return Err(WalletError::ProcessExited);
            }
            match self.client.get_status().await {
                Ok(_) => return Ok(()),
                Err(e) if e.is_transport() => sleep(self.intervals.rpc_wait).await,
                Err(e) => return Err(e),
            }
        }
    }

    async fn wait_for_sync(&self) -> Result<(), WalletError> {
        let mut tracker = SyncTracker::default();
        let mut failures = 0u32;

        loop {
            sleep(self.intervals.status_poll).await;

            // The daemon starting but then stopping is usually an invalid
            // password.
            if !self.session_running() {
                log::error!("Wallet daemon exited during synchronization");
                return Err(WalletError::ProcessExited);
            }

            let status = match self.client.get_status().await {
                Ok(status) => status,
                Err(e) if e.is_transport() => {
                    failures += 1;
                    log::warn!(
                        "Error communicating with the wallet daemon ({}/{}): {}",
                        failures,
                        MAX_TRANSPORT_FAILURES,
                        e
                    );
                    if failures >= MAX_TRANSPORT_FAILURES {
                        log::error!("Could not communicate with the wallet daemon");
                        return Err(WalletError::SyncFailed(
                            "could not reach the wallet daemon".to_string(),
                        ));
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };

            match tracker.observe(&status) {
                SyncObservation::AwaitingBlockCount => {
                    self.events.on_status_update("Waiting on known block count...");
                }
                SyncObservation::Stale { reported, retained } => {
                    log::warn!(
                        "Known block count {} has dropped from its previous value {}",
                        reported,
                        retained
                    );
                }
                SyncObservation::Progress(progress) => {
                    self.events.on_sync_progress(progress);
                    self.events.on_status_update(&format!(
                        "Synchronizing... {}% [{} / {}] ({} days behind)",
                        progress.percent,
                        progress.block_count,
                        progress.known_block_count,
                        progress.days_behind
                    ));
                    log::debug!(
                        "Synchronizing... {}% [{} / {}] ({} days behind)",
                        progress.percent,
                        progress.block_count,
                        progress.known_block_count,
                        progress.days_behind
                    );
                }
                SyncObservation::Synced(progress) => {
                    self.events.on_sync_progress(progress);
                    return Ok(());
                }
            }
        }
    }
}
