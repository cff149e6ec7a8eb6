/// Wire types for the wallet daemon's JSON-RPC interface.
///
/// The daemon speaks camelCase; every type renames accordingly. Amounts are
/// atomic units; transaction amounts are signed (negative for outgoing).
use serde::{Deserialize, Serialize};

/// Snapshot of the daemon's view of the chain, from `getStatus`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub block_count: u64,
    pub known_block_count: u64,
    #[serde(default)]
    pub peer_count: u64,
}

/// Wallet balance, from `getBalance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub available_balance: u64,
    pub locked_amount: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct AddressList {
    pub addresses: Vec<String>,
}

/// One movement of funds within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub address: String,
    pub amount: i64,
}

/// A wallet-relevant transaction as reported by `getTransactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_hash: String,
    pub amount: i64,
    pub fee: i64,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub unlock_time: u64,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// One block's worth of wallet transactions. Blocks with no transactions of
/// ours still appear in the daemon's response, with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub block_hash: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TransactionItems {
    pub items: Vec<Block>,
}

/// Parameters for `sendTransaction`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionRequest {
    pub anonymity: u64,
    pub fee: u64,
    pub transfers: Vec<Transfer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SentTransaction {
    pub transaction_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ViewKey {
    pub view_secret_key: String,
}

/// Spend key pair for one address, from `getSpendKeys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendKeys {
    pub spend_secret_key: String,
    #[serde(default)]
    pub spend_public_key: String,
}

/// Estimate of how many outputs a fusion transaction could consolidate,
/// from `estimateFusion`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionEstimate {
    pub total_output_count: u64,
    pub fusion_ready_count: u64,
}
