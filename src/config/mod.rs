//! Configuration Module - TOML-based SDK Configuration
//!
//! Loads and validates configuration from a TOML file. Every section
//! and field has a default, so `SdkConfig::default()` is a working
//! testnet configuration and a config file only needs the overrides.
//! Explorer endpoints and gas defaults live here - nothing is
//! hardcoded in the usecases layer.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

/// Top-level SDK configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
  /// Log level and output format.
  pub logging: LoggingConfig,
  /// Ledger explorer endpoint.
  pub explorer: ExplorerConfig,
  /// Wallet bridge behaviour.
  pub bridge: BridgeConfig,
  /// Confirmation polling cadence.
  pub poller: PollerConfig,
  /// Contract send defaults.
  pub contract: ContractConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level (trace, debug, info, warn, error).
  pub level: String,
  /// Emit JSON lines instead of human-readable output.
  pub json: bool,
}

/// Insight explorer configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
  /// Base URL, e.g. `https://testnet.qtum.org/insight-api`.
  pub base_url: String,
  /// Request timeout in seconds.
  pub timeout_seconds: u64,
}

/// Wallet bridge configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
  /// Per-request timeout in milliseconds. `None` waits forever,
  /// matching the extension protocol's own lack of expiry.
  pub request_timeout_ms: Option<u64>,
  /// Buffer size of the in-process message channel.
  pub channel_capacity: usize,
}

/// Confirmation poller configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
  /// Interval between transaction lookups in milliseconds.
  pub interval_ms: u64,
}

/// Defaults applied to `sendToContract` requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
  /// Gas price in QTUM.
  pub gas_price: f64,
  /// Gas limit.
  pub gas_limit: u64,
}

impl BridgeConfig {
  pub fn request_timeout(&self) -> Option<Duration> {
    self.request_timeout_ms.map(Duration::from_millis)
  }
}

impl PollerConfig {
  pub const fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      json: false,
    }
  }
}

impl Default for ExplorerConfig {
  fn default() -> Self {
    Self {
      base_url: default_explorer_url(),
      timeout_seconds: default_timeout(),
    }
  }
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      request_timeout_ms: None,
      channel_capacity: default_channel_capacity(),
    }
  }
}

impl Default for PollerConfig {
  fn default() -> Self {
    Self {
      interval_ms: default_poll_interval(),
    }
  }
}

impl Default for ContractConfig {
  fn default() -> Self {
    Self {
      gas_price: default_gas_price(),
      gas_limit: default_gas_limit(),
    }
  }
}

// Default value functions

fn default_log_level() -> String {
  "info".to_string()
}

fn default_explorer_url() -> String {
  crate::adapters::explorer::client::TESTNET_BASE_URL.to_string()
}

const fn default_timeout() -> u64 {
  30
}

const fn default_channel_capacity() -> usize {
  1024
}

const fn default_poll_interval() -> u64 {
  5000
}

const fn default_gas_price() -> f64 {
  0.000_000_4
}

const fn default_gas_limit() -> u64 {
  250_000
}
