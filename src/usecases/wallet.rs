//! Wallet Use Case - SDK Entry Point
//!
//! `QtumWallet` wires the pieces together:
//! - a [`Bridge`] over the page message channel, with its listener task
//! - a [`ConfirmationPoller`] over the explorer
//! - contract handles sharing both
//!
//! Wallet queries (current address, base58 conversion) go through the
//! bridge; account and contract info come straight from the explorer.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::adapters::explorer::{ExplorerClient, ExplorerClientConfig};
use crate::config::SdkConfig;
use crate::domain::{Confirmation, TransactionStatus};
use crate::error::{Result, SdkError};
use crate::ports::channel::MessageChannel;
use crate::ports::explorer::{AccountLookup, TransactionLookup};

use super::bridge::{Bridge, methods};
use super::contract::{Contract, check_wallet_error};
use super::poller::ConfirmationPoller;

/// Handle to the browser wallet and the ledger explorer.
///
/// Dropping the wallet stops its listener; requests still in flight
/// then never resolve unless a request timeout is configured.
pub struct QtumWallet<L: TransactionLookup + AccountLookup> {
  config: SdkConfig,
  bridge: Arc<Bridge>,
  explorer: Arc<L>,
  poller: Arc<ConfirmationPoller<L>>,
  listener: JoinHandle<()>,
}

impl QtumWallet<ExplorerClient> {
  /// Connect using the HTTP explorer from `config`.
  ///
  /// Must be called inside a Tokio runtime.
  ///
  /// # Errors
  /// Returns error if the HTTP client cannot be built.
  pub fn connect(config: SdkConfig, channel: Arc<dyn MessageChannel>) -> anyhow::Result<Self> {
    let explorer = ExplorerClient::new(ExplorerClientConfig::from(&config.explorer))?;
    Ok(Self::with_explorer(config, channel, Arc::new(explorer)))
  }
}

impl<L: TransactionLookup + AccountLookup> QtumWallet<L> {
  /// Connect using any explorer implementation.
  ///
  /// Must be called inside a Tokio runtime.
  pub fn with_explorer(config: SdkConfig, channel: Arc<dyn MessageChannel>, explorer: Arc<L>) -> Self {
    let bridge = Arc::new(Bridge::new(channel, &config.bridge));
    let listener = bridge.listen();
    let poller = Arc::new(ConfirmationPoller::new(Arc::clone(&explorer)));

    info!(
      request_timeout_ms = ?config.bridge.request_timeout_ms,
      poll_interval_ms = config.poller.interval_ms,
      "Wallet connected"
    );

    Self {
      config,
      bridge,
      explorer,
      poller,
      listener,
    }
  }

  /// Address currently selected in the wallet, `None` when the wallet
  /// has no account selected.
  #[instrument(skip(self))]
  pub async fn get_current_address(&self) -> Result<Option<String>> {
    let response = self
      .bridge
      .request(methods::GET_CURRENT_ADDRESS, json!({}))
      .await?;

    match response {
      Value::Null => Ok(None),
      Value::String(address) if address.is_empty() => Ok(None),
      Value::String(address) => Ok(Some(address)),
      other => {
        check_wallet_error(&other)?;
        Err(SdkError::MalformedResponse(format!("unexpected address: {other}")))
      }
    }
  }

  /// Convert a base58 address to its hex form via the wallet.
  #[instrument(skip(self))]
  pub async fn base58_to_hex(&self, address: &str) -> Result<String> {
    let response = self
      .bridge
      .request(methods::BASE58_TO_HEX, json!({ "address": address }))
      .await?;

    match response {
      Value::String(hex) => Ok(hex),
      other => {
        check_wallet_error(&other)?;
        Err(SdkError::MalformedResponse(format!("unexpected hex address: {other}")))
      }
    }
  }

  /// Account summary from the explorer.
  pub async fn query_account(&self, address: &str) -> Result<Value> {
    self.explorer
      .account(address)
      .await
      .map_err(|e| SdkError::Transport(format!("{e:#}")))
  }

  /// Contract information from the explorer.
  pub async fn query_contract_info(&self, address: &str) -> Result<Value> {
    self.explorer
      .contract_info(address)
      .await
      .map_err(|e| SdkError::Transport(format!("{e:#}")))
  }

  /// Handle for the contract at `address`; `None` for an empty address.
  pub fn contract(&self, address: &str) -> Option<Contract<L>> {
    let address = address.trim();
    if address.is_empty() {
      return None;
    }
    Some(Contract::new(
      address,
      Arc::clone(&self.bridge),
      Arc::clone(&self.poller),
      self.config.contract.clone(),
      self.config.poller.interval(),
    ))
  }

  /// Look up a transaction once.
  pub async fn query_transaction(&self, hash: &str) -> Result<TransactionStatus> {
    self.poller.query_once(hash).await
  }

  /// Poll a transaction until final, every `interval` (configured
  /// default when `None`).
  pub async fn query_confirmation(&self, hash: &str, interval: Option<Duration>) -> Result<Confirmation> {
    let interval = interval.unwrap_or_else(|| self.config.poller.interval());
    self.poller.await_confirmation(hash, interval).await
  }

  pub fn bridge(&self) -> &Arc<Bridge> {
    &self.bridge
  }

  pub fn poller(&self) -> &Arc<ConfirmationPoller<L>> {
    &self.poller
  }

  pub const fn config(&self) -> &SdkConfig {
    &self.config
  }
}

impl<L: TransactionLookup + AccountLookup> Drop for QtumWallet<L> {
  fn drop(&mut self) {
    self.listener.abort();
  }
}
