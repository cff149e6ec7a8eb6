use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use wallet_core::config::{DaemonConfig, WalletConfig};
use wallet_core::events::{SyncProgress, WalletEvents};
use wallet_core::manager::WalletManager;
use wallet_core::snapshot::WalletSnapshot;
use wallet_core::WalletError;

/// Headless event sink: everything the UI would render goes to the log.
struct LogEvents;

impl WalletEvents for LogEvents {
    fn on_status_update(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_sync_progress(&self, progress: SyncProgress) {
        log::info!(
            "Synchronizing... {}% [{} / {}]",
            progress.percent,
            progress.block_count,
            progress.known_block_count
        );
    }

    fn on_ready(&self) {
        log::info!("Wallet is ready");
    }

    fn on_fatal(&self, cause: &WalletError) {
        log::error!("Wallet daemon could not be recovered: {}", cause);
    }

    fn on_snapshot_updated(&self, snapshot: &WalletSnapshot) {
        log::info!(
            "Balance: {} available, {} locked | height {} | peers {}",
            snapshot.balance.available_balance,
            snapshot.balance.locked_amount,
            snapshot.status.block_count,
            snapshot.status.peer_count
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path =
        PathBuf::from(env::var("WALLET_CONFIG").unwrap_or_else(|_| "wallet-config.json".into()));
    let wallet_config = WalletConfig::load(&config_path)?;
    let daemon_config = DaemonConfig::from_env();

    let wallet_file = match env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None if !wallet_config.wallet_path.is_empty() => {
            PathBuf::from(&wallet_config.wallet_path)
        }
        None => anyhow::bail!("usage: wallet-core <wallet-file> (or set walletPath in the config)"),
    };
    let password = env::var("WALLET_PASSWORD")
        .map_err(|_| anyhow::anyhow!("WALLET_PASSWORD must be set"))?;

    let mut manager = WalletManager::new(
        daemon_config,
        wallet_config,
        config_path,
        Arc::new(LogEvents),
    );
    manager.open_wallet(&wallet_file, &password).await?;

    log::info!("Wallet open; press ctrl-c to exit");
    tokio::signal::ctrl_c().await?;

    manager.stop().await;
    Ok(())
}
