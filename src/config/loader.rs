//! Configuration Loader - File Loading and Validation
//!
//! Handles loading the SDK TOML file, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::SdkConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<SdkConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    explorer = %config.explorer.base_url,
    poll_interval_ms = config.poller.interval_ms,
    request_timeout_ms = ?config.bridge.request_timeout_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<SdkConfig> {
  let config: SdkConfig = toml::from_str(content)
    .with_context(|| "Failed to parse SDK config")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &SdkConfig) -> Result<()> {
  // Explorer validation
  anyhow::ensure!(
    config.explorer.base_url.starts_with("http://")
      || config.explorer.base_url.starts_with("https://"),
    "explorer.base_url must be an http(s) URL, got {:?}",
    config.explorer.base_url
  );
  anyhow::ensure!(
    config.explorer.timeout_seconds > 0,
    "explorer.timeout_seconds must be positive"
  );

  // Bridge validation
  anyhow::ensure!(
    config.bridge.request_timeout_ms != Some(0),
    "bridge.request_timeout_ms must be positive when set"
  );
  anyhow::ensure!(
    config.bridge.channel_capacity > 0,
    "bridge.channel_capacity must be positive"
  );

  // Poller validation
  anyhow::ensure!(
    config.poller.interval_ms > 0,
    "poller.interval_ms must be positive"
  );

  // Contract defaults
  anyhow::ensure!(
    config.contract.gas_price > 0.0,
    "contract.gas_price must be positive, got {}",
    config.contract.gas_price
  );
  anyhow::ensure!(
    config.contract.gas_limit > 0,
    "contract.gas_limit must be positive"
  );

  Ok(())
}
