//! Confirmation Poller Use Case - Transaction Finality Tracking
//!
//! Re-queries the ledger explorer for a transaction on a fixed cadence
//! until the transaction is mined, then resolves it as confirmed or
//! failed from its execution receipts.
//!
//! Polling flow:
//! 1. Wait one interval, then look the transaction up
//! 2. Unmined → wait for the next tick
//! 3. Mined → evaluate receipts, stop, resolve
//! 4. Lookup error → stop immediately (no retry), resolve as transport error
//!
//! Watches are keyed by transaction hash: starting a second watch for a
//! hash replaces the first, while different hashes are tracked
//! concurrently from the same poller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, instrument, warn};

use crate::domain::{Confirmation, ConfirmationState, FailureReason, TransactionStatus};
use crate::error::{Result, SdkError};
use crate::ports::explorer::TransactionLookup;

/// An active watch. Dropping the sender stops the watching task.
struct Watch {
  token: u64,
  _cancel: oneshot::Sender<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Polls transaction status until a terminal confirmation state.
pub struct ConfirmationPoller<L: TransactionLookup> {
  lookup: Arc<L>,
  /// Active watches by transaction hash.
  watches: Mutex<HashMap<String, Watch>>,
  next_token: AtomicU64,
}

impl<L: TransactionLookup> ConfirmationPoller<L> {
  /// Create a new poller over a transaction lookup.
  pub fn new(lookup: Arc<L>) -> Self {
    Self {
      lookup,
      watches: Mutex::new(HashMap::new()),
      next_token: AtomicU64::new(0),
    }
  }

  /// Issue one lookup.
  ///
  /// # Errors
  /// `Transport` if the lookup itself fails.
  #[instrument(skip(self))]
  pub async fn query_once(&self, hash: &str) -> Result<TransactionStatus> {
    self.lookup
      .transaction(hash)
      .await
      .map_err(|e| SdkError::Transport(format!("{e:#}")))
  }

  /// Poll `hash` every `interval` until it is confirmed or failed.
  ///
  /// # Errors
  /// - `ExecutionFailure(reason)` if a receipt reports an exception
  /// - `UnknownConfirmation` if mined with an unreadable receipt
  /// - `Transport` if a lookup fails (polling stops, no retry)
  /// - `Cancelled` if the watch is replaced or cancelled, including
  ///   while a lookup is in flight
  /// - `InvalidInterval` if `interval` is zero
  #[instrument(skip(self))]
  pub async fn await_confirmation(&self, hash: &str, interval: Duration) -> Result<Confirmation> {
    if interval.is_zero() {
      return Err(SdkError::InvalidInterval);
    }

    let (cancel_tx, mut cancel_rx) = oneshot::channel();
    let token = self.next_token.fetch_add(1, Ordering::Relaxed);

    let replaced = lock(&self.watches).insert(
      hash.to_string(),
      Watch {
        token,
        _cancel: cancel_tx,
      },
    );
    if replaced.is_some() {
      info!(hash, "Replacing existing confirmation watch");
    }
    drop(replaced);

    let _guard = WatchGuard {
      watches: &self.watches,
      hash,
      token,
    };

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls: u32 = 0;

    loop {
      tokio::select! {
        biased;
        _ = &mut cancel_rx => {
          info!(hash, polls, "Confirmation watch cancelled");
          return Err(SdkError::Cancelled);
        }
        _ = ticker.tick() => {}
      }

      polls += 1;
      let lookup = tokio::select! {
        biased;
        _ = &mut cancel_rx => {
          info!(hash, polls, "Confirmation watch cancelled during lookup");
          return Err(SdkError::Cancelled);
        }
        lookup = self.query_once(hash) => lookup,
      };
      let status = match lookup {
        Ok(status) => status,
        Err(e) => {
          warn!(hash, polls, error = %e, "Transaction lookup failed, stopping watch");
          return Err(e);
        }
      };

      match ConfirmationState::evaluate(&status) {
        ConfirmationState::Pending => {
          debug!(hash, polls, "Transaction not yet mined");
        }
        ConfirmationState::Confirmed(confirmation) => {
          info!(
            hash,
            polls,
            confirmations = confirmation.confirmations,
            "Transaction confirmed"
          );
          return Ok(confirmation);
        }
        ConfirmationState::Failed(FailureReason::Execution(reason)) => {
          warn!(hash, polls, reason = %reason, "Transaction execution failed");
          return Err(SdkError::ExecutionFailure(reason));
        }
        ConfirmationState::Failed(FailureReason::Unknown) => {
          warn!(hash, polls, "Transaction mined with unreadable receipt");
          return Err(SdkError::UnknownConfirmation);
        }
      }
    }
  }

  /// Stop watching `hash`. Returns `true` if a watch was active.
  pub fn cancel(&self, hash: &str) -> bool {
    lock(&self.watches).remove(hash).is_some()
  }

  pub fn is_watching(&self, hash: &str) -> bool {
    lock(&self.watches).contains_key(hash)
  }

  /// Number of active watches.
  pub fn active_watches(&self) -> usize {
    lock(&self.watches).len()
  }
}

/// Clears the watch entry when its task ends, unless it was replaced.
struct WatchGuard<'a> {
  watches: &'a Mutex<HashMap<String, Watch>>,
  hash: &'a str,
  token: u64,
}

impl Drop for WatchGuard<'_> {
  fn drop(&mut self) {
    let mut watches = lock(self.watches);
    if watches.get(self.hash).is_some_and(|w| w.token == self.token) {
      watches.remove(self.hash);
    }
  }
}
