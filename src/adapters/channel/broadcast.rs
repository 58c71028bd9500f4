//! Local Broadcast Channel - In-process Message Bus
//!
//! Implements the `MessageChannel` port on a `tokio::sync::broadcast`
//! channel. Behaves like a page-global `postMessage` bus: every
//! subscriber, including the poster, receives every message, and
//! nothing authenticates who posted what.

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use crate::config::BridgeConfig;
use crate::ports::channel::MessageChannel;

/// Default buffer per subscriber before slow receivers lag.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process broadcast medium.
///
/// Cheap to clone; clones share the same underlying bus, so a bridge
/// and a simulated wallet can each hold one.
#[derive(Debug, Clone)]
pub struct LocalChannel {
    tx: broadcast::Sender<Value>,
}

impl LocalChannel {
    /// Create a bus with the given per-subscriber buffer.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl From<&BridgeConfig> for LocalChannel {
    fn from(config: &BridgeConfig) -> Self {
        Self::new(config.channel_capacity)
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MessageChannel for LocalChannel {
    fn post(&self, message: Value) -> anyhow::Result<()> {
        // With no subscribers the message is simply lost, as on a real bus.
        let delivered = self.tx.send(message).unwrap_or(0);
        trace!(delivered, "Message posted");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_poster_sees_own_messages() {
        let channel = LocalChannel::default();
        let mut rx = channel.subscribe();

        channel.post(json!({"hello": 1})).unwrap();
        assert_eq!(rx.recv().await.unwrap(), json!({"hello": 1}));
    }

    #[tokio::test]
    async fn test_clones_share_the_bus() {
        let a = LocalChannel::new(8);
        let b = a.clone();
        let mut rx_a = a.subscribe();
        let mut rx_b = b.subscribe();
        assert_eq!(a.subscriber_count(), 2);

        b.post(json!("ping")).unwrap();
        assert_eq!(rx_a.recv().await.unwrap(), json!("ping"));
        assert_eq!(rx_b.recv().await.unwrap(), json!("ping"));
    }

    #[tokio::test]
    async fn test_capacity_from_config_bounds_backlog() {
        let config = BridgeConfig {
            channel_capacity: 2,
            ..Default::default()
        };
        let channel = LocalChannel::from(&config);
        let mut rx = channel.subscribe();

        for i in 0..3 {
            channel.post(json!(i)).unwrap();
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap(), json!(1));
    }

    #[test]
    fn test_post_without_subscribers_is_ok() {
        assert!(LocalChannel::default().post(json!(null)).is_ok());
    }
}
