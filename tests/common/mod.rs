#![allow(dead_code)]

/// Shared test infrastructure: an in-process mock wallet daemon speaking
/// the JSON-RPC wire protocol, a stand-in daemon process for liveness
/// checks, and an event sink that records every callback.
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use wallet_core::error::WalletError;
use wallet_core::events::{SyncProgress, WalletEvents};
use wallet_core::snapshot::WalletSnapshot;

/// Mutable behavior of the mock daemon, adjusted by tests mid-run.
pub struct MockState {
    /// Scripted `getStatus` results, consumed front to back; once drained
    /// the last one keeps repeating.
    pub statuses: VecDeque<Value>,
    pub current_status: Value,
    pub balance: Value,
    pub addresses: Vec<String>,
    /// `getTransactions` items.
    pub blocks: Value,
    /// Fail every request at the HTTP level (connection-class failure).
    pub offline: bool,
    /// Go offline after this many requests have been served.
    pub fail_after_calls: Option<usize>,
    /// Reject this method with a JSON-RPC error response.
    pub error_method: Option<String>,
    /// Every request received, as (method, params).
    pub calls: Vec<(String, Value)>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            statuses: VecDeque::new(),
            current_status: json!({"blockCount": 100, "knownBlockCount": 100, "peerCount": 8}),
            balance: json!({"availableBalance": 12345, "lockedAmount": 67}),
            addresses: vec!["addr-primary".to_string(), "addr-second".to_string()],
            blocks: json!([{
                "blockHash": "bh-1",
                "transactions": [{
                    "transactionHash": "A",
                    "amount": 500,
                    "fee": 10,
                    "timestamp": 1_500_000_000u64,
                    "unlockTime": 0,
                    "transfers": [{"amount": 500, "address": "X"}],
                }],
            }]),
            offline: false,
            fail_after_calls: None,
            error_method: None,
            calls: Vec::new(),
        }
    }
}

pub struct MockWalletd {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<MockState>>,
}

impl MockWalletd {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .route("/json_rpc", post(handle_rpc))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/json_rpc", self.addr)
    }

    pub fn script_statuses(&self, statuses: &[(u64, u64)]) {
        let mut state = self.state.lock().unwrap();
        state.statuses = statuses
            .iter()
            .map(|&(block_count, known_block_count)| {
                json!({
                    "blockCount": block_count,
                    "knownBlockCount": known_block_count,
                    "peerCount": 8,
                })
            })
            .collect();
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn calls_for(&self, method: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

async fn handle_rpc(
    State(state): State<Arc<Mutex<MockState>>>,
    Json(request): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    state.calls.push((method.clone(), request["params"].clone()));

    let served = state.calls.len();
    let gone_dark = state
        .fail_after_calls
        .map(|limit| served > limit)
        .unwrap_or(false);
    if state.offline || gone_dark {
        return (StatusCode::INTERNAL_SERVER_ERROR, "mock daemon offline").into_response();
    }

    if state.error_method.as_deref() == Some(method.as_str()) {
        return Json(json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"code": -32000, "message": format!("{} rejected by mock", method)},
        }))
        .into_response();
    }

    let result = match method.as_str() {
        "getStatus" => {
            if let Some(next) = state.statuses.pop_front() {
                state.current_status = next;
            }
            state.current_status.clone()
        }
        "getBalance" => state.balance.clone(),
        "getAddresses" => json!({"addresses": state.addresses}),
        "getTransactions" => json!({"items": state.blocks}),
        "sendTransaction" => json!({"transactionHash": "txhash-sent"}),
        "sendFusionTransaction" => json!({"transactionHash": "txhash-fusion"}),
        "estimateFusion" => json!({"totalOutputCount": 40, "fusionReadyCount": 12}),
        "reset" | "save" => json!({}),
        "getViewKey" => json!({"viewSecretKey": "view-secret"}),
        "getSpendKeys" => json!({"spendSecretKey": "spend-secret", "spendPublicKey": "spend-public"}),
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": {"code": -32601, "message": "Method not found"},
            }))
            .into_response()
        }
    };

    Json(json!({"jsonrpc": "2.0", "id": request["id"], "result": result})).into_response()
}

/// Write an executable shell script standing in for the wallet daemon.
/// `body` decides its behavior, e.g. `"exec sleep 300"` for a healthy
/// long-running daemon or `"exit 1"` for one that dies on startup.
pub fn fake_daemon_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-walletd");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Event sink recording everything for later assertions.
#[derive(Default)]
pub struct TestEvents {
    pub statuses: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<SyncProgress>>,
    pub ready_count: Mutex<u32>,
    pub fatal: Mutex<Vec<String>>,
    pub snapshot_count: Mutex<u32>,
}

impl TestEvents {
    pub fn fatal_count(&self) -> usize {
        self.fatal.lock().unwrap().len()
    }

    pub fn snapshots_seen(&self) -> u32 {
        *self.snapshot_count.lock().unwrap()
    }
}

impl WalletEvents for TestEvents {
    fn on_status_update(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }

    fn on_sync_progress(&self, progress: SyncProgress) {
        self.progress.lock().unwrap().push(progress);
    }

    fn on_ready(&self) {
        *self.ready_count.lock().unwrap() += 1;
    }

    fn on_fatal(&self, cause: &WalletError) {
        self.fatal.lock().unwrap().push(cause.to_string());
    }

    fn on_snapshot_updated(&self, _snapshot: &WalletSnapshot) {
        *self.snapshot_count.lock().unwrap() += 1;
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_for(timeout: std::time::Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    condition()
}
