//! Insight Explorer Client - REST Lookups Against the Ledger Indexer
//!
//! Wraps reqwest with a timeout and uniform status handling for the
//! three Insight API endpoints the SDK uses:
//! - `GET <base>/tx/<hash>`
//! - `GET <base>/addr/<address>/?noTxList=1`
//! - `GET <base>/contracts/<address>/info`
//!
//! Lookups are never retried here: the confirmation poller treats a
//! failed lookup as terminal for its session.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ExplorerConfig;
use crate::domain::TransactionStatus;
use crate::ports::explorer::{AccountLookup, TransactionLookup};

/// Qtum testnet Insight API.
pub const TESTNET_BASE_URL: &str = "https://testnet.qtum.org/insight-api";

/// Configuration for the explorer HTTP client.
#[derive(Debug, Clone)]
pub struct ExplorerClientConfig {
  /// Base URL of the Insight API, without trailing slash.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
}

impl Default for ExplorerClientConfig {
  fn default() -> Self {
    Self {
      base_url: TESTNET_BASE_URL.to_string(),
      timeout: Duration::from_secs(30),
    }
  }
}

impl From<&ExplorerConfig> for ExplorerClientConfig {
  fn from(config: &ExplorerConfig) -> Self {
    Self {
      base_url: config.base_url.trim_end_matches('/').to_string(),
      timeout: Duration::from_secs(config.timeout_seconds),
    }
  }
}

/// HTTP client for the Insight explorer.
pub struct ExplorerClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: ExplorerClientConfig,
}

impl ExplorerClient {
  /// Create a new explorer client.
  pub fn new(config: ExplorerClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http, config })
  }

  pub fn tx_url(&self, hash: &str) -> String {
    format!("{}/tx/{hash}", self.config.base_url)
  }

  pub fn account_url(&self, address: &str) -> String {
    format!("{}/addr/{address}/?noTxList=1", self.config.base_url)
  }

  pub fn contract_info_url(&self, address: &str) -> String {
    format!("{}/contracts/{address}/info", self.config.base_url)
  }

  /// Execute a GET and parse the JSON body.
  async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
    debug!(url, "Explorer GET");

    let response = self
      .http
      .get(url)
      .send()
      .await
      .with_context(|| format!("Request to {url} failed"))?;

    let status = response.status();
    if status.is_success() {
      response
        .json::<T>()
        .await
        .with_context(|| format!("Malformed response body from {url}"))
    } else {
      let body = response.text().await.unwrap_or_default();
      warn!(status = %status, url, "Explorer returned error status");
      Err(anyhow::anyhow!("Explorer error {status}: {body}"))
    }
  }
}

#[async_trait]
impl TransactionLookup for ExplorerClient {
  #[instrument(skip(self))]
  async fn transaction(&self, hash: &str) -> Result<TransactionStatus> {
    self.get_json(&self.tx_url(hash)).await
  }
}

#[async_trait]
impl AccountLookup for ExplorerClient {
  #[instrument(skip(self))]
  async fn account(&self, address: &str) -> Result<Value> {
    self.get_json(&self.account_url(address)).await
  }

  #[instrument(skip(self))]
  async fn contract_info(&self, address: &str) -> Result<Value> {
    self.get_json(&self.contract_info_url(address)).await
  }
}
