pub mod client;
pub mod types;

pub use client::RpcClient;
pub use types::{
    Balance, Block, FusionEstimate, SendTransactionRequest, SpendKeys, Status, Transaction,
    Transfer,
};
