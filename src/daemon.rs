/// Wallet daemon process supervision.
///
/// The supervisor owns launch policy (executable, flags, remote node); a
/// `DaemonSession` owns one running child process plus the credentials
/// needed to relaunch it. Liveness is checked without blocking, so a daemon
/// that died on startup (wrong password is the usual cause) is detectable
/// from the polling loops.
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::config::{DaemonConfig, RemoteNode};
use crate::error::WalletError;

/// A running wallet daemon and the arguments it was launched with.
pub struct DaemonSession {
    child: Child,
    wallet_file: PathBuf,
    password: String,
}

impl std::fmt::Debug for DaemonSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonSession")
            .field("child_id", &self.child.id())
            .field("wallet_file", &self.wallet_file)
            .finish()
    }
}

impl DaemonSession {
    /// True while the daemon process has not exited. Non-blocking.
    pub fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) => false,
            Err(e) => {
                log::warn!("Failed to poll wallet daemon status: {}", e);
                false
            }
        }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn wallet_file(&self) -> &Path {
        &self.wallet_file
    }

    /// Kill the daemon if it is still alive and reap it.
    pub fn shutdown(&mut self) {
        if self.is_running() {
            log::info!("Stopping wallet daemon (pid {})", self.child.id());
            if let Err(e) = self.child.kill() {
                log::warn!("Failed to kill wallet daemon: {}", e);
            }
        }
        let _ = self.child.wait();
    }
}

impl Drop for DaemonSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Launches and relaunches the wallet daemon.
pub struct DaemonSupervisor {
    config: DaemonConfig,
    remote_node: Option<RemoteNode>,
}

impl DaemonSupervisor {
    pub fn new(config: DaemonConfig) -> Self {
        Self {
            config,
            remote_node: None,
        }
    }

    /// Route the daemon through a remote node instead of a local one.
    pub fn with_remote_node(mut self, remote_node: Option<RemoteNode>) -> Self {
        self.remote_node = remote_node;
        self
    }

    fn base_command(&self, wallet_file: &Path, password: &str) -> Command {
        let mut command = Command::new(&self.config.executable);
        command
            .arg("-w")
            .arg(wallet_file)
            .arg("-p")
            .arg(password)
            .arg("--bind-address")
            .arg(&self.config.rpc_host)
            .arg("--bind-port")
            .arg(self.config.rpc_port.to_string());
        if let Some(remote) = &self.remote_node {
            command
                .arg("--daemon-address")
                .arg(&remote.address)
                .arg("--daemon-port")
                .arg(remote.port.to_string());
        }
        command
    }

    /// Spawn the daemon for an existing wallet container. Returns as soon as
    /// the process is started; the RPC server may take a while to come up,
    /// and the spawn succeeding says nothing about the password being right.
    pub fn start(&self, wallet_file: &Path, password: &str) -> Result<DaemonSession, WalletError> {
        let child = self
            .base_command(wallet_file, password)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        log::info!(
            "Started wallet daemon (pid {}) for {}",
            child.id(),
            wallet_file.display()
        );
        Ok(DaemonSession {
            child,
            wallet_file: wallet_file.to_path_buf(),
            password: password.to_string(),
        })
    }

    /// Relaunch the daemon with the session's wallet file and password,
    /// replacing the process handle in place. The caller must still confirm
    /// liveness afterwards; a relaunch that dies immediately looks exactly
    /// like the original failure.
    pub fn restart(&self, session: &mut DaemonSession) -> Result<(), WalletError> {
        log::warn!(
            "Restarting wallet daemon for {}",
            session.wallet_file.display()
        );
        session.shutdown();
        let wallet_file = session.wallet_file.clone();
        let password = session.password.clone();
        *session = self.start(&wallet_file, &password)?;
        Ok(())
    }

    /// Create a new wallet container (`-g`) and wait for the daemon to exit.
    pub fn generate_wallet(
        &self,
        wallet_file: &Path,
        password: &str,
    ) -> Result<ExitStatus, WalletError> {
        log::info!("Generating wallet container {}", wallet_file.display());
        let status = self
            .base_command(wallet_file, password)
            .arg("-g")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status)
    }

    /// Create a wallet container from existing secret keys and wait for the
    /// daemon to exit.
    pub fn import_wallet(
        &self,
        wallet_file: &Path,
        password: &str,
        view_key: &str,
        spend_key: &str,
    ) -> Result<ExitStatus, WalletError> {
        log::info!("Importing wallet container {}", wallet_file.display());
        let status = self
            .base_command(wallet_file, password)
            .arg("-g")
            .arg("--view-key")
            .arg(view_key)
            .arg("--spend-key")
            .arg(spend_key)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status)
    }
}
