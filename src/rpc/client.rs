/// JSON-RPC client for the wallet daemon.
///
/// The transport is deliberately policy-free: a request either succeeds,
/// fails at the connection level (`WalletError::Transport`, retryable), or
/// is rejected by the daemon (`WalletError::Rpc`). Retry decisions belong
/// to the callers.
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::WalletError;
use crate::rpc::types::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Issue a raw JSON-RPC request and return the decoded `result` member.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        if let Some(error) = body.get("error") {
            return Err(WalletError::Rpc {
                code: error["code"].as_i64().unwrap_or(0),
                message: error["message"].as_str().unwrap_or("unknown error").to_string(),
            });
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, WalletError> {
        let result = self.request(method, params).await?;
        // A response we cannot decode is as unusable as one we never got.
        serde_json::from_value(result).map_err(|e| WalletError::Transport(e.to_string()))
    }

    pub async fn get_status(&self) -> Result<Status, WalletError> {
        self.call("getStatus", json!({})).await
    }

    pub async fn get_balance(&self) -> Result<Balance, WalletError> {
        self.call("getBalance", json!({})).await
    }

    pub async fn get_addresses(&self) -> Result<Vec<String>, WalletError> {
        let list: AddressList = self.call("getAddresses", json!({})).await?;
        Ok(list.addresses)
    }

    /// Fetch the blocks holding our transactions, starting at
    /// `first_block_index` and spanning `block_count` blocks.
    pub async fn get_transactions(
        &self,
        block_count: u64,
        first_block_index: u64,
        addresses: &[String],
    ) -> Result<Vec<Block>, WalletError> {
        let items: TransactionItems = self
            .call(
                "getTransactions",
                json!({
                    "blockCount": block_count,
                    "firstBlockIndex": first_block_index,
                    "addresses": addresses,
                }),
            )
            .await?;
        Ok(items.items)
    }

    /// Create and broadcast a transaction; returns its hash.
    pub async fn send_transaction(
        &self,
        request: &SendTransactionRequest,
    ) -> Result<String, WalletError> {
        let params =
            serde_json::to_value(request).map_err(|e| WalletError::InvalidInput(e.to_string()))?;
        let sent: SentTransaction = self.call("sendTransaction", params).await?;
        Ok(sent.transaction_hash)
    }

    /// Discard the wallet's local chain state and re-synchronize.
    pub async fn reset(&self) -> Result<(), WalletError> {
        self.request("reset", json!({})).await?;
        Ok(())
    }

    /// Flush the wallet container to disk.
    pub async fn save(&self) -> Result<(), WalletError> {
        self.request("save", json!({})).await?;
        Ok(())
    }

    pub async fn get_view_key(&self) -> Result<String, WalletError> {
        let key: ViewKey = self.call("getViewKey", json!({})).await?;
        Ok(key.view_secret_key)
    }

    pub async fn get_spend_keys(&self, address: &str) -> Result<SpendKeys, WalletError> {
        self.call("getSpendKeys", json!({ "address": address })).await
    }

    /// Consolidate small outputs from `addresses` into `destination_address`;
    /// returns the fusion transaction hash.
    pub async fn send_fusion_transaction(
        &self,
        threshold: u64,
        anonymity: u64,
        addresses: &[String],
        destination_address: &str,
    ) -> Result<String, WalletError> {
        let sent: SentTransaction = self
            .call(
                "sendFusionTransaction",
                json!({
                    "threshold": threshold,
                    "anonymity": anonymity,
                    "addresses": addresses,
                    "destinationAddress": destination_address,
                }),
            )
            .await?;
        Ok(sent.transaction_hash)
    }

    pub async fn estimate_fusion(
        &self,
        threshold: u64,
        addresses: &[String],
    ) -> Result<FusionEstimate, WalletError> {
        self.call(
            "estimateFusion",
            json!({ "threshold": threshold, "addresses": addresses }),
        )
        .await
    }
}
