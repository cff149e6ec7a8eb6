/// Shared wallet state snapshot.
///
/// The refresh loop is the single writer; the UI collaborator reads on its
/// own schedule. Writers build a complete snapshot and swap it in one move,
/// so readers either see the previous snapshot or the new one, never a mix.
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::rpc::{Balance, Block, Status};

/// Point-in-time copy of everything the wallet knows, replaced wholesale on
/// each successful refresh cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub balance: Balance,
    pub addresses: Vec<String>,
    pub status: Status,
    pub blocks: Vec<Block>,
}

impl WalletSnapshot {
    /// First address in the wallet; the one funds are received on.
    pub fn primary_address(&self) -> Option<&str> {
        self.addresses.first().map(String::as_str)
    }
}

/// Handle to the latest snapshot. Cheap to clone and share across tasks.
#[derive(Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Arc<WalletSnapshot>>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published snapshot.
    pub fn load(&self) -> Arc<WalletSnapshot> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Publish a new snapshot, replacing the previous one.
    pub fn store(&self, snapshot: WalletSnapshot) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(snapshot);
    }

    /// Drop back to an empty snapshot, e.g. after a wallet reset.
    pub fn clear(&self) {
        self.store(WalletSnapshot::default());
    }
}
