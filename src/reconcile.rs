/// Transaction reconciliation.
///
/// Folds the blocks of the latest snapshot into a stable, deduplicated
/// record set ordered most-recent-first. Records are identified by hash
/// alone and never edited in place; a record whose hash vanishes from the
/// snapshot (the daemon walked back a fork) is dropped.
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rpc::{Block, Transaction};

/// Blocks a locked output needs on top of its unlock height before it is
/// considered spendable; transfers between wallets unlock immediately.
pub const CONFIRMATION_WINDOW: u64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// One transaction as presented to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub direction: Direction,
    pub confirmed: bool,
    /// Signed atomic units; negative for outgoing transactions.
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    /// The other side of the transaction, when it can be identified among
    /// the transfers.
    pub counterparty: Option<String>,
}

/// Merge the latest snapshot's blocks into `records`.
///
/// New transactions are inserted at the front; existing ones are left
/// untouched; ones no longer present in any block are pruned. Applying the
/// same snapshot twice is a no-op the second time.
pub fn reconcile(records: &mut Vec<TransactionRecord>, blocks: &[Block], block_count: u64) {
    let mut known: HashSet<String> = records.iter().map(|r| r.hash.clone()).collect();

    for block in blocks {
        for transaction in &block.transactions {
            if known.contains(&transaction.transaction_hash) {
                continue;
            }
            known.insert(transaction.transaction_hash.clone());
            records.insert(0, record_from(transaction, block_count));
        }
    }

    let valid: HashSet<&str> = blocks
        .iter()
        .flat_map(|block| &block.transactions)
        .map(|transaction| transaction.transaction_hash.as_str())
        .collect();
    records.retain(|record| valid.contains(record.hash.as_str()));
}

fn record_from(transaction: &Transaction, block_count: u64) -> TransactionRecord {
    // A transaction carries a transfer per output, including our own change.
    // The counterparty is the transfer matching the transacted amount: the
    // full amount when receiving, the amount net of the fee (and sign) when
    // sending.
    let desired_transfer_amount = if transaction.amount < 0 {
        -(transaction.amount + transaction.fee)
    } else {
        transaction.amount
    };
    let counterparty = transaction
        .transfers
        .iter()
        .find(|transfer| transfer.amount == desired_transfer_amount)
        .map(|transfer| transfer.address.clone());

    let confirmed = transaction.unlock_time == 0
        || transaction.unlock_time <= block_count.saturating_sub(CONFIRMATION_WINDOW);

    TransactionRecord {
        hash: transaction.transaction_hash.clone(),
        direction: if transaction.amount > 0 {
            Direction::In
        } else {
            Direction::Out
        },
        confirmed,
        amount: transaction.amount,
        timestamp: DateTime::from_timestamp(transaction.timestamp as i64, 0)
            .unwrap_or(DateTime::UNIX_EPOCH),
        counterparty,
    }
}
