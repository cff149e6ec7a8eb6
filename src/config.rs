/// Wallet configuration
///
/// Two layers: the persisted JSON document remembering which wallet the user
/// last opened and how the daemon reaches the network, and the non-persisted
/// launch settings (daemon executable, RPC bind address) taken from the
/// environment.
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Persisted wallet configuration, stored as a JSON document.
///
/// Field names follow the on-disk document, which predates this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
    pub wallet_path: String,
    pub has_wallet: bool,
    pub remote_daemon: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_daemon_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_daemon_port: Option<u16>,
    /// Previous wallet path, kept when the user switches wallets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_wallet_path: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wallet_path: String::new(),
            has_wallet: false,
            remote_daemon: false,
            remote_daemon_address: None,
            remote_daemon_port: None,
            cached_wallet_path: None,
        }
    }
}

impl WalletConfig {
    /// Load the config document, creating it with defaults when missing.
    ///
    /// A document that fails to parse is replaced by defaults rather than
    /// aborting startup; the user only loses their remembered wallet path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let defaults = Self::default();
            defaults.save(path)?;
            return Ok(defaults);
        }
        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::error!("Failed to decode the config file, using defaults: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Rewrite the config document.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// The remote node the daemon should proxy through, when one is selected.
    pub fn remote_node(&self) -> Option<RemoteNode> {
        if !self.remote_daemon {
            return None;
        }
        match (&self.remote_daemon_address, self.remote_daemon_port) {
            (Some(address), Some(port)) => Some(RemoteNode {
                address: address.clone(),
                port,
            }),
            _ => None,
        }
    }
}

/// A remote node the local daemon connects to instead of running its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNode {
    pub address: String,
    pub port: u16,
}

/// Daemon launch settings. Not persisted; read from the environment with
/// defaults matching a stock local daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Path to the wallet daemon executable.
    pub executable: PathBuf,
    /// Address the daemon binds its RPC server to.
    pub rpc_host: String,
    /// Port the daemon binds its RPC server to.
    pub rpc_port: u16,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("walletd"),
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 8070,
        }
    }
}

impl DaemonConfig {
    /// Load launch settings from environment variables.
    ///
    /// - `WALLETD_PATH`: daemon executable (default `walletd` on PATH)
    /// - `WALLETD_RPC_PORT`: RPC port (default 8070)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = env::var("WALLETD_PATH") {
            config.executable = PathBuf::from(path);
        }
        if let Ok(port) = env::var("WALLETD_RPC_PORT") {
            match port.parse() {
                Ok(port) => config.rpc_port = port,
                Err(_) => log::warn!("Ignoring invalid WALLETD_RPC_PORT value '{}'", port),
            }
        }
        config
    }

    /// URL of the daemon's JSON-RPC endpoint.
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}/json_rpc", self.rpc_host, self.rpc_port)
    }
}

/// Cadences for the polling loops. Defaults are the production values;
/// tests shrink them to keep runs fast.
#[derive(Debug, Clone)]
pub struct PollIntervals {
    /// Spacing between probes while waiting for the RPC server to come up.
    pub rpc_wait: Duration,
    /// Spacing between status polls during synchronization.
    pub status_poll: Duration,
    /// Spacing between wallet data refresh cycles.
    pub refresh: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            rpc_wait: Duration::from_secs(1),
            status_poll: Duration::from_millis(1500),
            refresh: Duration::from_secs(5),
        }
    }
}
