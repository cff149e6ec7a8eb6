/// Wallet manager - orchestration layer.
///
/// The single entry point for the UI collaborator: opens a wallet (launch
/// daemon, wait for sync, start the refresh loop), exposes the latest
/// snapshot and the reconciled transaction set, and carries the per-action
/// operations (send, save, reset, key export).
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::{DaemonConfig, PollIntervals, WalletConfig};
use crate::daemon::{DaemonSession, DaemonSupervisor};
use crate::error::WalletError;
use crate::events::WalletEvents;
use crate::reconcile::{reconcile, TransactionRecord};
use crate::refresh::RefreshLoop;
use crate::rpc::{RpcClient, SendTransactionRequest, SpendKeys, Transfer};
use crate::snapshot::{SharedSnapshot, WalletSnapshot};
use crate::sync::SyncPoller;

/// Default network fee, in atomic units.
pub const DEFAULT_FEE: u64 = 10;

/// Default mixin (anonymity level) for outgoing transactions.
pub const DEFAULT_ANONYMITY: u64 = 3;

/// Secret keys backing the wallet's primary address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKeys {
    pub view_secret_key: String,
    pub spend_secret_key: String,
}

pub struct WalletManager {
    wallet_config: WalletConfig,
    config_path: PathBuf,
    client: RpcClient,
    supervisor: Arc<DaemonSupervisor>,
    events: Arc<dyn WalletEvents>,
    snapshot: SharedSnapshot,
    records: Mutex<Vec<TransactionRecord>>,
    intervals: PollIntervals,
    session: Option<Arc<Mutex<DaemonSession>>>,
    stop_tx: Option<watch::Sender<bool>>,
    refresh_task: Option<JoinHandle<()>>,
}

impl WalletManager {
    pub fn new(
        daemon_config: DaemonConfig,
        wallet_config: WalletConfig,
        config_path: PathBuf,
        events: Arc<dyn WalletEvents>,
    ) -> Self {
        let client = RpcClient::new(daemon_config.rpc_url());
        let supervisor =
            DaemonSupervisor::new(daemon_config).with_remote_node(wallet_config.remote_node());
        Self {
            wallet_config,
            config_path,
            client,
            supervisor: Arc::new(supervisor),
            events,
            snapshot: SharedSnapshot::new(),
            records: Mutex::new(Vec::new()),
            intervals: PollIntervals::default(),
            session: None,
            stop_tx: None,
            refresh_task: None,
        }
    }

    /// Override the polling cadences (for testing).
    pub fn with_intervals(mut self, intervals: PollIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// Launch the daemon for `wallet_file`, wait until it is synchronized,
    /// then start the background refresh loop.
    ///
    /// Blocks until the wallet is usable or the startup failed; a failure is
    /// also reported once through `WalletEvents::on_fatal` and leaves no
    /// running session behind.
    pub async fn open_wallet(
        &mut self,
        wallet_file: &Path,
        password: &str,
    ) -> Result<(), WalletError> {
        let session = match self.supervisor.start(wallet_file, password) {
            Ok(session) => Arc::new(Mutex::new(session)),
            Err(e) => {
                self.events.on_fatal(&e);
                return Err(e);
            }
        };

        let poller = SyncPoller::new_with_intervals(
            self.client.clone(),
            Arc::clone(&session),
            Arc::clone(&self.events),
            self.intervals.clone(),
        );
        if let Err(e) = poller.run().await {
            self.events.on_fatal(&e);
            let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
            session.shutdown();
            return Err(e);
        }

        self.remember_wallet(wallet_file);
        self.events.on_ready();

        let (stop_tx, stop_rx) = watch::channel(false);
        let refresh = RefreshLoop::new(
            self.client.clone(),
            Arc::clone(&self.supervisor),
            Arc::clone(&session),
            self.snapshot.clone(),
            Arc::clone(&self.events),
            self.intervals.clone(),
            stop_rx,
        );
        self.session = Some(session);
        self.stop_tx = Some(stop_tx);
        self.refresh_task = Some(tokio::spawn(refresh.run()));
        Ok(())
    }

    /// Persist the opened wallet as the default for the next start.
    fn remember_wallet(&mut self, wallet_file: &Path) {
        let path = wallet_file.display().to_string();
        if self.wallet_config.wallet_path != path {
            if !self.wallet_config.wallet_path.is_empty() {
                self.wallet_config.cached_wallet_path =
                    Some(self.wallet_config.wallet_path.clone());
            }
            self.wallet_config.wallet_path = path;
        }
        self.wallet_config.has_wallet = true;
        if let Err(e) = self.wallet_config.save(&self.config_path) {
            log::warn!("Could not save config file: {}", e);
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<WalletSnapshot> {
        self.snapshot.load()
    }

    /// The reconciled transaction set for the latest snapshot,
    /// most-recent-first.
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        let snapshot = self.snapshot.load();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        reconcile(&mut records, &snapshot.blocks, snapshot.status.block_count);
        records.clone()
    }

    /// Validate and send a transaction; returns its hash. Validation
    /// failures are local and leave the background loops untouched.
    pub async fn send_transaction(
        &self,
        recipient: &str,
        amount: u64,
        fee: Option<u64>,
        anonymity: u64,
        payment_id: Option<String>,
    ) -> Result<String, WalletError> {
        if recipient.is_empty() {
            return Err(WalletError::InvalidInput(
                "recipient address is empty".to_string(),
            ));
        }
        if amount == 0 {
            return Err(WalletError::InvalidInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        if self.snapshot.load().primary_address() == Some(recipient) {
            return Err(WalletError::InvalidInput(
                "recipient is this wallet's own address".to_string(),
            ));
        }

        let request = SendTransactionRequest {
            anonymity,
            fee: fee.unwrap_or(DEFAULT_FEE),
            transfers: vec![Transfer {
                address: recipient.to_string(),
                amount: amount as i64,
            }],
            payment_id,
        };
        let hash = self.client.send_transaction(&request).await?;
        log::info!(
            "Sent transaction {} - amount: {}, mixin: {}, to: {}",
            hash,
            amount,
            anonymity,
            recipient
        );
        Ok(hash)
    }

    /// Flush the wallet container to disk.
    pub async fn save(&self) -> Result<(), WalletError> {
        self.client.save().await
    }

    /// Reset the wallet and re-synchronize from scratch. Clears the local
    /// snapshot and record set so stale data is never re-rendered.
    pub async fn reset(&self) -> Result<(), WalletError> {
        self.client.reset().await?;
        self.snapshot.clear();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.clear();
        Ok(())
    }

    /// Export the secret keys for the wallet's primary address.
    pub async fn export_keys(&self) -> Result<SecretKeys, WalletError> {
        let addresses = self.client.get_addresses().await?;
        let primary = addresses
            .first()
            .ok_or_else(|| WalletError::InvalidInput("wallet has no addresses".to_string()))?;

        let view_secret_key = self.client.get_view_key().await?;
        let SpendKeys {
            spend_secret_key, ..
        } = self.client.get_spend_keys(primary).await?;
        Ok(SecretKeys {
            view_secret_key,
            spend_secret_key,
        })
    }

    /// True while a session is open and the refresh loop has not halted.
    pub fn is_open(&self) -> bool {
        self.refresh_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Signal the refresh loop to stop, wait for it to wind down, and shut
    /// the daemon down.
    pub async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if let Some(task) = self.refresh_task.take() {
            // The loop observes the signal within one refresh interval.
            let grace = self.intervals.refresh * 2;
            if timeout(grace, task).await.is_err() {
                log::warn!("Refresh loop did not stop in time, abandoning it");
            }
        }
        if let Some(session) = self.session.take() {
            let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
            session.shutdown();
        }
    }
}
