//! Explorer Ports - Ledger Indexing Service Interface
//!
//! Defines the lookups the SDK performs against the remote ledger
//! explorer (Insight API). Only HTTP GET semantics are assumed.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::TransactionStatus;

/// Fetch a transaction's indexing status by hash.
///
/// This is the only capability the confirmation poller needs.
#[async_trait]
pub trait TransactionLookup: Send + Sync + 'static {
  /// Look up one transaction.
  ///
  /// # Errors
  /// Returns error on network failure, non-2xx status or a body
  /// that is not a transaction document.
  async fn transaction(&self, hash: &str) -> anyhow::Result<TransactionStatus>;
}

/// Account and contract lookups, returned as raw explorer JSON.
#[async_trait]
pub trait AccountLookup: Send + Sync + 'static {
  /// Account summary (balance, tx counts) without the tx list.
  async fn account(&self, address: &str) -> anyhow::Result<Value>;

  /// Contract account information.
  async fn contract_info(&self, address: &str) -> anyhow::Result<Value>;
}
