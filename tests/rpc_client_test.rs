mod common;

use serde_json::json;

use common::MockWalletd;
use wallet_core::error::WalletError;
use wallet_core::rpc::{RpcClient, SendTransactionRequest, Transfer};

#[tokio::test]
async fn request_returns_decoded_result() {
    let mock = MockWalletd::start().await;
    let client = RpcClient::new(mock.url());

    let result = client.request("getBalance", json!({})).await.unwrap();
    assert_eq!(result["availableBalance"], 12345);
    assert_eq!(result["lockedAmount"], 67);
}

#[tokio::test]
async fn typed_getters_decode_wire_shapes() {
    let mock = MockWalletd::start().await;
    let client = RpcClient::new(mock.url());

    let status = client.get_status().await.unwrap();
    assert_eq!(status.block_count, 100);
    assert_eq!(status.known_block_count, 100);
    assert_eq!(status.peer_count, 8);

    let balance = client.get_balance().await.unwrap();
    assert_eq!(balance.available_balance, 12345);

    let addresses = client.get_addresses().await.unwrap();
    assert_eq!(addresses, vec!["addr-primary", "addr-second"]);

    let blocks = client.get_transactions(100, 1, &addresses).await.unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].transactions[0].transaction_hash, "A");
    assert_eq!(blocks[0].transactions[0].transfers[0].address, "X");
}

#[tokio::test]
async fn get_transactions_sends_range_parameters() {
    let mock = MockWalletd::start().await;
    let client = RpcClient::new(mock.url());

    let addresses = vec!["addr-primary".to_string()];
    client.get_transactions(250, 1, &addresses).await.unwrap();

    let calls = mock.calls_for("getTransactions");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["blockCount"], 250);
    assert_eq!(calls[0]["firstBlockIndex"], 1);
    assert_eq!(calls[0]["addresses"], json!(["addr-primary"]));
}

#[tokio::test]
async fn send_transaction_serializes_the_documented_shape() {
    let mock = MockWalletd::start().await;
    let client = RpcClient::new(mock.url());

    let request = SendTransactionRequest {
        anonymity: 3,
        fee: 10,
        transfers: vec![Transfer {
            address: "addr-recipient".to_string(),
            amount: 1000,
        }],
        payment_id: None,
    };
    let hash = client.send_transaction(&request).await.unwrap();
    assert_eq!(hash, "txhash-sent");

    let calls = mock.calls_for("sendTransaction");
    assert_eq!(calls[0]["anonymity"], 3);
    assert_eq!(calls[0]["fee"], 10);
    assert_eq!(calls[0]["transfers"][0]["address"], "addr-recipient");
    assert_eq!(calls[0]["transfers"][0]["amount"], 1000);
    // An absent payment id must be omitted, not serialized as null.
    assert!(calls[0].get("paymentId").is_none());

    let request = SendTransactionRequest {
        payment_id: Some("pid-1".to_string()),
        ..request
    };
    client.send_transaction(&request).await.unwrap();
    let calls = mock.calls_for("sendTransaction");
    assert_eq!(calls[1]["paymentId"], "pid-1");
}

#[tokio::test]
async fn daemon_error_response_maps_to_rpc_error() {
    let mock = MockWalletd::start().await;
    mock.state.lock().unwrap().error_method = Some("sendTransaction".to_string());
    let client = RpcClient::new(mock.url());

    let request = SendTransactionRequest {
        anonymity: 3,
        fee: 10,
        transfers: vec![Transfer {
            address: "addr-recipient".to_string(),
            amount: 1000,
        }],
        payment_id: None,
    };
    let err = client.send_transaction(&request).await.unwrap_err();
    match &err {
        WalletError::Rpc { code, message } => {
            assert_eq!(*code, -32000);
            assert!(message.contains("sendTransaction"));
        }
        other => panic!("expected Rpc error, got {:?}", other),
    }
    assert!(!err.is_transport());
}

#[tokio::test]
async fn unreachable_daemon_maps_to_transport_error() {
    let client = RpcClient::new("http://127.0.0.1:1/json_rpc");

    let err = client.get_status().await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got {:?}", err);
}

#[tokio::test]
async fn garbage_response_maps_to_transport_error() {
    let mock = MockWalletd::start().await;
    mock.set_offline(true);
    let client = RpcClient::new(mock.url());

    let err = client.get_status().await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got {:?}", err);
}

#[tokio::test]
async fn key_and_fusion_methods_round_trip() {
    let mock = MockWalletd::start().await;
    let client = RpcClient::new(mock.url());

    assert_eq!(client.get_view_key().await.unwrap(), "view-secret");
    let keys = client.get_spend_keys("addr-primary").await.unwrap();
    assert_eq!(keys.spend_secret_key, "spend-secret");

    let addresses = vec!["addr-primary".to_string()];
    let estimate = client.estimate_fusion(1000, &addresses).await.unwrap();
    assert_eq!(estimate.total_output_count, 40);
    assert_eq!(estimate.fusion_ready_count, 12);

    let hash = client
        .send_fusion_transaction(1000, 3, &addresses, "addr-primary")
        .await
        .unwrap();
    assert_eq!(hash, "txhash-fusion");
}
