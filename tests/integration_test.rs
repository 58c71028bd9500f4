//! Integration Tests - End-to-end SDK Component Testing
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! A simulated extension answers requests on the in-process channel;
//! the explorer and, where needed, the channel itself are mockall mocks.

use std::sync::Arc;
use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256, hex};
use mockall::mock;
use mockall::predicate::*;
use serde_json::{Value, json};
use tokio::sync::broadcast;

use qtum_wallet_bridge::adapters::channel::LocalChannel;
use qtum_wallet_bridge::config::SdkConfig;
use qtum_wallet_bridge::domain::{AbiType, CorrelationId, Envelope, TransactionStatus};
use qtum_wallet_bridge::ports::channel::MessageChannel;
use qtum_wallet_bridge::usecases::{Bridge, CallOutput, QtumWallet, SendOptions};
use qtum_wallet_bridge::SdkError;

// ---- Mock Definitions ----

mock! {
    pub Explorer {}

    #[async_trait::async_trait]
    impl qtum_wallet_bridge::ports::explorer::TransactionLookup for Explorer {
        async fn transaction(&self, hash: &str) -> anyhow::Result<TransactionStatus>;
    }

    #[async_trait::async_trait]
    impl qtum_wallet_bridge::ports::explorer::AccountLookup for Explorer {
        async fn account(&self, address: &str) -> anyhow::Result<Value>;
        async fn contract_info(&self, address: &str) -> anyhow::Result<Value>;
    }
}

mock! {
    pub Channel {}

    impl MessageChannel for Channel {
        fn post(&self, message: Value) -> anyhow::Result<()>;
        fn subscribe(&self) -> broadcast::Receiver<Value>;
    }
}

// ---- Helpers ----

const CONTRACT: &str = "a27225bcb75142b8f90dcf3365055899b7c091fd";

/// Spawn a simulated extension answering every request via `reply`.
fn spawn_extension<F>(channel: &LocalChannel, reply: F)
where
    F: Fn(&str, &Value) -> Value + Send + 'static,
{
    let extension = channel.clone();
    let mut rx = channel.subscribe();
    tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if msg["route"]["target"] != "contentscript" {
                continue;
            }
            let id = CorrelationId::from(msg["data"]["serialNumber"].as_str().unwrap_or_default());
            let method = msg["data"]["method"].as_str().unwrap_or_default().to_string();
            let result = reply(&method, &msg["data"]["data"]);
            let _ = extension.post(Envelope::response(id, &method, result).to_value());
        }
    });
}

fn explorer_tx(value: Value) -> TransactionStatus {
    serde_json::from_value(value).unwrap()
}

fn fast_config() -> SdkConfig {
    let mut config = SdkConfig::default();
    config.poller.interval_ms = 1000;
    config
}

// ---- Integration Tests ----

#[tokio::test(start_paused = true)]
async fn test_send_and_confirm_lifecycle() {
    let channel = LocalChannel::default();
    spawn_extension(&channel, |method, data| {
        assert_eq!(method, "sendToContract");
        assert_eq!(data["address"], CONTRACT);
        json!({ "tx": { "txid": "9f1c" } })
    });

    let mut explorer = MockExplorer::new();
    let mut lookups = 0;
    explorer
        .expect_transaction()
        .with(eq("9f1c"))
        .times(2)
        .returning(move |hash| {
            lookups += 1;
            Ok(if lookups < 2 {
                explorer_tx(json!({ "txid": hash }))
            } else {
                explorer_tx(json!({
                    "txid": hash,
                    "blockhash": "00ab",
                    "confirmations": 1,
                    "receipt": [{ "excepted": "None", "gasUsed": 21000 }],
                    "fees": 0.1,
                }))
            })
        });

    let wallet = QtumWallet::with_explorer(fast_config(), Arc::new(channel.clone()), Arc::new(explorer));
    let contract = wallet.contract(CONTRACT).unwrap();

    let confirmation = contract
        .send_and_confirm(
            "setValue",
            &[DynSolValue::Uint(U256::from(42u64), 256)],
            &[AbiType::Uint(256)],
            SendOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(confirmation.tx, "9f1c");
    assert_eq!(confirmation.status, "Confirmed");
    assert_eq!(confirmation.confirmations, 1);
    assert_eq!(wallet.bridge().pending_count(), 0);
    assert_eq!(wallet.poller().active_watches(), 0);
}

#[tokio::test]
async fn test_wallet_error_skips_polling() {
    let channel = LocalChannel::default();
    spawn_extension(&channel, |_, _| json!({ "error": "User rejected" }));

    let mut explorer = MockExplorer::new();
    explorer.expect_transaction().never();

    let wallet = QtumWallet::with_explorer(fast_config(), Arc::new(channel.clone()), Arc::new(explorer));
    let err = wallet
        .contract(CONTRACT)
        .unwrap()
        .send_and_confirm("setValue", &[], &[], SendOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::Wallet("User rejected".to_string()));
}

#[tokio::test]
async fn test_call_decodes_multiple_outputs() {
    let owner = Address::repeat_byte(0x11);
    let output = hex::encode(
        DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(7u64), 256),
            DynSolValue::Address(owner),
            DynSolValue::Bool(true),
        ])
        .abi_encode_params(),
    );

    let channel = LocalChannel::default();
    spawn_extension(&channel, move |method, _| {
        assert_eq!(method, "callContract");
        json!({ "executionResult": { "output": output, "excepted": "None" } })
    });

    let wallet = QtumWallet::with_explorer(
        SdkConfig::default(),
        Arc::new(channel.clone()),
        Arc::new(MockExplorer::new()),
    );
    let result = wallet
        .contract(CONTRACT)
        .unwrap()
        .call_literals("info", &[] as &[&str], &[] as &[&str], &["uint256", "address", "bool"])
        .await
        .unwrap();

    assert_eq!(
        result,
        CallOutput::Multiple(vec![
            DynSolValue::Uint(U256::from(7u64), 256),
            DynSolValue::Address(owner),
            DynSolValue::Bool(true),
        ])
    );
    assert!(wallet.bridge().bindings().is_empty());
}

#[tokio::test]
async fn test_misrouted_response_is_ignored() {
    let channel = LocalChannel::default();
    let wallet = QtumWallet::with_explorer(
        SdkConfig::default(),
        Arc::new(channel.clone()),
        Arc::new(MockExplorer::new()),
    );

    let mut rx = channel.subscribe();
    let injector = channel.clone();
    tokio::spawn(async move {
        let request = rx.recv().await.unwrap();
        let id = request["data"]["serialNumber"].clone();

        // Same id, but not from the content script.
        let _ = injector.post(json!({
            "route": { "wallet": "qtum", "source": "page", "target": "SDK" },
            "data": { "serialNumber": id, "method": "getCurrentAddress", "data": "qForged" },
        }));
        let _ = injector.post(json!({
            "route": { "wallet": "qtum", "source": "contentscript", "target": "SDK" },
            "data": { "serialNumber": id, "method": "getCurrentAddress", "data": "qGenuine" },
        }));
    });

    let address = wallet.get_current_address().await.unwrap();
    assert_eq!(address.as_deref(), Some("qGenuine"));
}

#[tokio::test(start_paused = true)]
async fn test_explorer_failure_stops_confirmation() {
    let mut explorer = MockExplorer::new();
    explorer
        .expect_transaction()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("HTTP 502")));

    let wallet = QtumWallet::with_explorer(
        fast_config(),
        Arc::new(LocalChannel::default()),
        Arc::new(explorer),
    );

    let err = wallet.query_confirmation("dead", None).await.unwrap_err();
    assert_eq!(err, SdkError::Transport("HTTP 502".to_string()));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(wallet.poller().active_watches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_withdraws_entry() {
    let mut config = SdkConfig::default();
    config.bridge.request_timeout_ms = Some(100);

    let wallet = QtumWallet::with_explorer(config, Arc::new(LocalChannel::default()), Arc::new(MockExplorer::new()));

    let err = wallet.base58_to_hex("qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW").await.unwrap_err();
    assert_eq!(err, SdkError::Timeout(100));
    assert_eq!(wallet.bridge().pending_count(), 0);
}

#[tokio::test]
async fn test_post_failure_reports_channel_error() {
    let mut channel = MockChannel::new();
    channel
        .expect_post()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("extension disconnected")));
    channel.expect_subscribe().returning(|| broadcast::channel(1).1);

    let bridge = Bridge::new(Arc::new(channel), &SdkConfig::default().bridge);
    let err = bridge.request("getCurrentAddress", Value::Null).await.unwrap_err();

    assert_eq!(err, SdkError::Channel("extension disconnected".to_string()));
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn test_explorer_account_queries() {
    let mut explorer = MockExplorer::new();
    explorer
        .expect_account()
        .with(eq("qAddr"))
        .returning(|a| Ok(json!({ "addrStr": a, "balance": 12.5 })));
    explorer
        .expect_contract_info()
        .with(eq(CONTRACT))
        .returning(|_| Ok(json!({ "contractAddress": CONTRACT })));

    let wallet = QtumWallet::with_explorer(
        SdkConfig::default(),
        Arc::new(LocalChannel::default()),
        Arc::new(explorer),
    );

    let account = wallet.query_account("qAddr").await.unwrap();
    assert_eq!(account["balance"], 12.5);

    let info = wallet.query_contract_info(CONTRACT).await.unwrap();
    assert_eq!(info["contractAddress"], CONTRACT);
}
