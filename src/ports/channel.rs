//! Message Channel Port - Broadcast Medium Shared With the Wallet
//!
//! Models the page-global message bus the wallet's content script
//! listens on. The medium is untyped, unauthenticated and broadcast:
//! every subscriber sees every message, including the ones it posted
//! itself.

use serde_json::Value;
use tokio::sync::broadcast;

/// Trait for fire-and-forget broadcast channels.
///
/// Implementors deliver each posted message to every live subscriber.
/// There is no addressing and no delivery guarantee; correlation is
/// layered on top by the bridge.
pub trait MessageChannel: Send + Sync + 'static {
  /// Post a message to all subscribers.
  ///
  /// # Errors
  /// Returns error if the medium is closed.
  fn post(&self, message: Value) -> anyhow::Result<()>;

  /// Subscribe to all traffic posted after this call.
  fn subscribe(&self) -> broadcast::Receiver<Value>;
}
