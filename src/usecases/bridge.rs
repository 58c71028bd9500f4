//! Wallet Bridge - Request/Response Correlation Over a Broadcast Channel
//!
//! Turns the fire-and-forget, untyped message channel shared with the
//! wallet extension into a request/response abstraction:
//!
//! 1. Each outgoing request gets a fresh 32-char correlation id.
//! 2. The id → result handler pair is registered, then the envelope is
//!    posted with `route = qtum / SDK → contentscript`.
//! 3. The listener accepts only `qtum / contentscript → SDK` messages,
//!    looks up `data.serialNumber`, removes the entry and hands
//!    `data.data` to its handler. Unknown ids are dropped silently.
//!
//! The route filter is the only access control on the channel. Any
//! script on the page can forge a response for an id it has observed;
//! that is the extension protocol's trust boundary and is kept as is.
//!
//! Unlike the extension protocol itself, async requests here can be
//! bounded by a timeout and are withdrawn when the caller drops them,
//! so unanswered requests do not pile up in the pending map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::BridgeConfig;
use crate::domain::{AbiType, CorrelationId, Envelope};
use crate::error::{Result, SdkError};
use crate::ports::channel::MessageChannel;

/// Wallet method names understood by the extension.
pub mod methods {
  pub const SEND_TO_CONTRACT: &str = "sendToContract";
  pub const CALL_CONTRACT: &str = "callContract";
  pub const GET_CURRENT_ADDRESS: &str = "getCurrentAddress";
  pub const BASE58_TO_HEX: &str = "base58ToHex";
}

/// Callback invoked once with the response payload.
pub type ResultHandler = Box<dyn FnOnce(Value) + Send + 'static>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Expected return types of in-flight contract reads, keyed by the
/// read request's correlation id. Each binding is consumed once.
#[derive(Debug, Default)]
pub struct OutputBindings {
  inner: Mutex<HashMap<CorrelationId, Vec<AbiType>>>,
}

impl OutputBindings {
  /// Record the expected output types for a request.
  pub fn bind(&self, id: &CorrelationId, types: Vec<AbiType>) {
    lock(&self.inner).insert(id.clone(), types);
  }

  /// Consume the binding for a request.
  pub fn take(&self, id: &CorrelationId) -> Option<Vec<AbiType>> {
    lock(&self.inner).remove(id)
  }

  pub fn len(&self) -> usize {
    lock(&self.inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Correlation layer between SDK callers and the wallet extension.
///
/// Owns its pending-request and output-binding maps, so independent
/// bridges (e.g. under test) never observe each other's state.
pub struct Bridge {
  /// Shared broadcast medium.
  channel: Arc<dyn MessageChannel>,
  /// Live requests awaiting a response.
  pending: Mutex<HashMap<CorrelationId, ResultHandler>>,
  /// Output types of in-flight contract reads.
  bindings: OutputBindings,
  /// Upper bound on how long `request` waits.
  request_timeout: Option<Duration>,
}

impl Bridge {
  /// Create a bridge over `channel`.
  ///
  /// The bridge does not listen until [`Bridge::listen`] is called.
  pub fn new(channel: Arc<dyn MessageChannel>, config: &BridgeConfig) -> Self {
    Self {
      channel,
      pending: Mutex::new(HashMap::new()),
      bindings: OutputBindings::default(),
      request_timeout: config.request_timeout(),
    }
  }

  /// Subscribe to the channel and spawn the listener task.
  ///
  /// The subscription is taken before returning, so responses to
  /// requests sent afterwards are never missed. Call once per bridge:
  /// a second listener would see every response twice (the second
  /// delivery finds no pending entry and is dropped).
  pub fn listen(self: &Arc<Self>) -> JoinHandle<()> {
    let rx = self.channel.subscribe();
    let bridge = Arc::clone(self);
    tokio::spawn(async move { bridge.run(rx).await })
  }

  /// Listener loop. Runs until the channel closes.
  #[instrument(skip_all)]
  pub async fn run(&self, mut rx: broadcast::Receiver<Value>) {
    info!("Wallet bridge listening");

    loop {
      match rx.recv().await {
        Ok(message) => {
          self.handle_message(&message);
        }
        Err(broadcast::error::RecvError::Lagged(n)) => {
          warn!(dropped = n, "Bridge listener lagged, messages lost");
        }
        Err(broadcast::error::RecvError::Closed) => {
          info!("Message channel closed, bridge listener stopping");
          return;
        }
      }
    }
  }

  /// Filter one inbound message and resolve its pending request.
  ///
  /// Returns `true` if a handler was invoked. Messages with a missing
  /// or mismatching route never touch the pending map.
  pub fn handle_message(&self, message: &Value) -> bool {
    let Some(envelope) = Envelope::parse_inbound(message) else {
      trace!("Ignoring non-wallet message");
      return false;
    };

    let id = envelope.data.serial_number;
    let handler = lock(&self.pending).remove(&id);

    match handler {
      Some(handler) => {
        debug!(id = %id, "Wallet response matched");
        handler(envelope.data.data);
        true
      }
      None => {
        debug!(id = %id, "Dropping response with no pending request");
        false
      }
    }
  }

  /// Send a request and deliver the response to `handler`.
  ///
  /// Returns the generated correlation id. The handler runs on the
  /// listener task at most once.
  pub fn send_request<F>(&self, method: &str, payload: Value, handler: F) -> Result<CorrelationId>
  where
    F: FnOnce(Value) + Send + 'static,
  {
    self.send_request_as(CorrelationId::random(), method, payload, handler)
  }

  /// Like [`Bridge::send_request`] with a caller-chosen id.
  ///
  /// # Errors
  /// `Channel` if `id` is already pending or the channel refuses the
  /// message; in the latter case the registration is rolled back.
  pub fn send_request_as<F>(
    &self,
    id: CorrelationId,
    method: &str,
    payload: Value,
    handler: F,
  ) -> Result<CorrelationId>
  where
    F: FnOnce(Value) + Send + 'static,
  {
    {
      let mut pending = lock(&self.pending);
      if pending.contains_key(&id) {
        return Err(SdkError::Channel(format!("correlation id {id} already pending")));
      }
      pending.insert(id.clone(), Box::new(handler));
    }

    let envelope = Envelope::request(id.clone(), method, payload);
    if let Err(e) = self.channel.post(envelope.to_value()) {
      lock(&self.pending).remove(&id);
      warn!(id = %id, method, error = %e, "Failed to post wallet request");
      return Err(SdkError::Channel(e.to_string()));
    }

    debug!(id = %id, method, "Wallet request sent");
    Ok(id)
  }

  /// Send a request and await its response.
  pub async fn request(&self, method: &str, payload: Value) -> Result<Value> {
    self.request_as(CorrelationId::random(), method, payload).await
  }

  /// Send a request under `id` and await its response.
  ///
  /// Dropping the returned future withdraws the pending entry.
  ///
  /// # Errors
  /// - `Timeout` when the configured request timeout elapses
  /// - `Cancelled` when the entry is withdrawn via [`Bridge::cancel`]
  pub async fn request_as(&self, id: CorrelationId, method: &str, payload: Value) -> Result<Value> {
    let (tx, rx) = oneshot::channel();
    let id = self.send_request_as(id, method, payload, move |value| {
      let _ = tx.send(value);
    })?;
    let _guard = PendingGuard { bridge: self, id: id.clone() };

    let received = match self.request_timeout {
      Some(limit) => match tokio::time::timeout(limit, rx).await {
        Ok(received) => received,
        Err(_) => {
          let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
          warn!(id = %id, method, timeout_ms = ms, "Wallet request timed out");
          return Err(SdkError::Timeout(ms));
        }
      },
      None => rx.await,
    };

    received.map_err(|_| SdkError::Cancelled)
  }

  /// Withdraw a pending request and its output binding.
  ///
  /// Returns `true` if a request was pending under `id`.
  pub fn cancel(&self, id: &CorrelationId) -> bool {
    self.bindings.take(id);
    let removed = lock(&self.pending).remove(id).is_some();
    if removed {
      debug!(id = %id, "Wallet request withdrawn");
    }
    removed
  }

  pub fn is_pending(&self, id: &CorrelationId) -> bool {
    lock(&self.pending).contains_key(id)
  }

  /// Number of requests awaiting a response.
  pub fn pending_count(&self) -> usize {
    lock(&self.pending).len()
  }

  /// Output type bindings of in-flight contract reads.
  pub const fn bindings(&self) -> &OutputBindings {
    &self.bindings
  }
}

/// Removes the pending entry if the awaiting future goes away first.
struct PendingGuard<'a> {
  bridge: &'a Bridge,
  id: CorrelationId,
}

impl Drop for PendingGuard<'_> {
  fn drop(&mut self) {
    lock(&self.bridge.pending).remove(&self.id);
  }
}
