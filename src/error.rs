use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Daemon connection error: {0}")]
    Transport(String),

    #[error("Daemon rejected the request ({code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Wallet daemon process has exited")]
    ProcessExited,

    #[error("Failed to launch wallet daemon: {0}")]
    Launch(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Synchronization failed: {0}")]
    SyncFailed(String),
}

impl WalletError {
    /// Connection-level failures are worth retrying; everything else needs
    /// the caller (or the user) to change something first.
    pub fn is_transport(&self) -> bool {
        matches!(self, WalletError::Transport(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
