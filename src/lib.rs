//! Daemon supervision and RPC client core for a cryptocurrency wallet
//! front-end.
//!
//! The GUI layer is a separate collaborator; this crate owns everything
//! between it and the wallet daemon:
//!
//! - **Daemon supervision**: launching the wallet daemon with a wallet file
//!   and password, detecting unexpected exits, bounded restarts
//! - **RPC transport**: the JSON-RPC-over-HTTP session with the daemon
//! - **Startup synchronization**: polling until the wallet has caught up
//!   with the network, with stale-sample and latency corrections
//! - **Background refresh**: a steady-state loop publishing atomic wallet
//!   snapshots, with a watchdog escalating from retry to restart to a
//!   fatal report
//! - **Transaction reconciliation**: folding snapshots into a stable,
//!   deduplicated transaction set that survives chain reorganizations
//!
//! The collaborator drives the core through [`manager::WalletManager`] and
//! observes it through [`events::WalletEvents`].

// Public modules
pub mod config;
pub mod daemon;
pub mod error;
pub mod events;
pub mod manager;
pub mod reconcile;
pub mod refresh;
pub mod rpc;
pub mod snapshot;
pub mod sync;

// Re-exports for convenience
pub use config::{DaemonConfig, PollIntervals, RemoteNode, WalletConfig};
pub use daemon::{DaemonSession, DaemonSupervisor};
pub use error::{ConfigError, WalletError};
pub use events::{NullEvents, SyncProgress, WalletEvents};
pub use manager::{SecretKeys, WalletManager, DEFAULT_ANONYMITY, DEFAULT_FEE};
pub use reconcile::{reconcile, Direction, TransactionRecord};
pub use refresh::{RefreshLoop, Watchdog, WatchdogVerdict};
pub use rpc::RpcClient;
pub use snapshot::{SharedSnapshot, WalletSnapshot};
pub use sync::{SyncObservation, SyncPoller, SyncTracker};

// Common result type
pub type Result<T> = std::result::Result<T, WalletError>;
