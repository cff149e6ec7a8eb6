/// Background wallet data refresh loop.
///
/// Once the startup sync completes, this loop owns all polling: every cycle
/// it fetches balances, addresses, status and transactions, and publishes
/// them as one new snapshot. Connection failures feed a watchdog that
/// escalates from waiting, to restarting the daemon, to declaring the
/// session unrecoverable.
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::time::sleep;

use crate::config::PollIntervals;
use crate::daemon::{DaemonSession, DaemonSupervisor};
use crate::error::WalletError;
use crate::events::WalletEvents;
use crate::rpc::RpcClient;
use crate::snapshot::{SharedSnapshot, WalletSnapshot};

/// Consecutive connection failures before the daemon is restarted.
const FAILURE_THRESHOLD: u32 = 3;

/// Daemon restarts attempted before giving up for good.
const MAX_RESTARTS: u32 = 3;

/// What the refresh loop should do about a connection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogVerdict {
    /// Not enough failures yet; try again next cycle.
    Retry,
    /// The daemon looks dead or hung; restart it.
    Restart,
    /// Restarts are exhausted; the session cannot be recovered.
    Fatal,
}

/// Escalation policy for repeated connection failures. Pure state so the
/// thresholds are testable in isolation.
#[derive(Debug, Default)]
pub struct Watchdog {
    consecutive_failures: u32,
    restart_attempts: u32,
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any successful refresh clears the slate entirely.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.restart_attempts = 0;
    }

    pub fn record_failure(&mut self) -> WatchdogVerdict {
        self.consecutive_failures += 1;
        if self.consecutive_failures < FAILURE_THRESHOLD {
            return WatchdogVerdict::Retry;
        }
        if self.restart_attempts < MAX_RESTARTS {
            self.restart_attempts += 1;
            self.consecutive_failures = 0;
            WatchdogVerdict::Restart
        } else {
            WatchdogVerdict::Fatal
        }
    }

    pub fn restart_attempts(&self) -> u32 {
        self.restart_attempts
    }
}

/// The refresh loop proper. Consumes itself on `run`; dropping the matching
/// stop sender also ends the loop within one cycle.
pub struct RefreshLoop {
    client: RpcClient,
    supervisor: Arc<DaemonSupervisor>,
    session: Arc<Mutex<DaemonSession>>,
    snapshot: SharedSnapshot,
    events: Arc<dyn WalletEvents>,
    intervals: PollIntervals,
    stop: watch::Receiver<bool>,
}

impl RefreshLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: RpcClient,
        supervisor: Arc<DaemonSupervisor>,
        session: Arc<Mutex<DaemonSession>>,
        snapshot: SharedSnapshot,
        events: Arc<dyn WalletEvents>,
        intervals: PollIntervals,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            supervisor,
            session,
            snapshot,
            events,
            intervals,
            stop,
        }
    }

    pub async fn run(mut self) {
        let mut watchdog = Watchdog::new();

        loop {
            match self.refresh_once().await {
                Ok(()) => watchdog.record_success(),
                Err(e) if e.is_transport() => {
                    log::error!("Failed to communicate with the wallet daemon: {}", e);
                    self.events
                        .on_status_update("Failed to communicate with the wallet daemon");
                    match watchdog.record_failure() {
                        WatchdogVerdict::Retry => {}
                        WatchdogVerdict::Restart => self.restart_daemon(&watchdog),
                        WatchdogVerdict::Fatal => {
                            log::error!("Wallet daemon could not be recovered, giving up");
                            self.events.on_fatal(&e);
                            break;
                        }
                    }
                }
                // The daemon answered, so the connection is healthy; a
                // rejected call must not count towards restarting it.
                Err(e) => log::error!("Wallet refresh failed: {}", e),
            }

            tokio::select! {
                _ = sleep(self.intervals.refresh) => {}
                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Wallet refresh loop stopped");
    }

    async fn refresh_once(&self) -> Result<(), WalletError> {
        let balance = self.client.get_balance().await?;
        let addresses = self.client.get_addresses().await?;
        let status = self.client.get_status().await?;
        let blocks = self
            .client
            .get_transactions(status.block_count, 1, &addresses)
            .await?;

        let snapshot = WalletSnapshot {
            balance,
            addresses,
            status,
            blocks,
        };
        self.snapshot.store(snapshot.clone());
        self.events.on_snapshot_updated(&snapshot);
        Ok(())
    }

    fn restart_daemon(&self, watchdog: &Watchdog) {
        log::warn!(
            "Wallet daemon unresponsive, restarting (attempt {}/{})",
            watchdog.restart_attempts(),
            MAX_RESTARTS
        );
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = self.supervisor.restart(&mut session) {
            // Leave it to the next cycles to escalate further.
            log::error!("Failed to restart the wallet daemon: {}", e);
        }
    }
}
