//! Transaction confirmation state machine.
//!
//! Translates a single ledger-indexer lookup result into the next
//! confirmation state. `Pending` is the only non-terminal state; the
//! first lookup that reports block inclusion always yields a terminal
//! state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Exception marker the indexer reports for a successful execution.
pub const NO_EXCEPTION: &str = "None";

/// Reason reported when a mined transaction carries a receipt but no
/// usable exception marker.
pub const UNKNOWN_ERROR: &str = "Unknown error!";

/// Transaction as reported by the Insight explorer `/tx/<hash>` endpoint.
///
/// Only the fields the confirmation logic needs are typed; everything
/// else the explorer returns is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatus {
    /// Transaction id.
    #[serde(default)]
    pub txid: String,
    /// Hash of the containing block; absent or empty while unmined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<String>,
    /// Number of confirmations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    /// Contract execution receipts (contract transactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Vec<ReceiptEntry>>,
    /// Remaining explorer fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One contract execution receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEntry {
    /// `"None"` on success, otherwise the exception reason (e.g. `"Revert"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excepted: Option<String>,
}

impl TransactionStatus {
    /// Whether the indexer reports the transaction inside a block.
    pub fn is_mined(&self) -> bool {
        self.blockhash.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// Successful terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Transaction id.
    pub tx: String,
    /// Always `"Confirmed"`; kept for the JSON shape callers expect.
    pub status: &'static str,
    /// Confirmations at the moment of observation.
    pub confirmations: u64,
}

/// Why a mined transaction is considered failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Execution reverted / raised; carries the exception reason.
    Execution(String),
    /// Receipt present but without a readable exception marker.
    Unknown,
}

/// Confirmation state of one tracked transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationState {
    Pending,
    Confirmed(Confirmation),
    Failed(FailureReason),
}

impl ConfirmationState {
    /// Evaluate one lookup result.
    ///
    /// - unmined → `Pending`
    /// - mined, no receipt list → `Confirmed`
    /// - mined, any entry with an exception other than `"None"` → `Failed(Execution)`
    /// - mined, every entry `"None"` → `Confirmed`
    /// - mined, empty receipt list or an entry without a marker → `Failed(Unknown)`
    pub fn evaluate(status: &TransactionStatus) -> Self {
        if !status.is_mined() {
            return Self::Pending;
        }

        let Some(receipts) = status.receipt.as_deref() else {
            return Self::confirmed(status);
        };

        let exception = receipts.iter().find_map(|r| {
            r.excepted
                .as_deref()
                .filter(|e| !e.is_empty() && *e != NO_EXCEPTION)
        });
        if let Some(reason) = exception {
            return Self::Failed(FailureReason::Execution(reason.to_string()));
        }

        let all_clean = !receipts.is_empty()
            && receipts
                .iter()
                .all(|r| r.excepted.as_deref() == Some(NO_EXCEPTION));
        if all_clean {
            Self::confirmed(status)
        } else {
            Self::Failed(FailureReason::Unknown)
        }
    }

    fn confirmed(status: &TransactionStatus) -> Self {
        Self::Confirmed(Confirmation {
            tx: status.txid.clone(),
            status: "Confirmed",
            confirmations: status.confirmations.unwrap_or(0),
        })
    }

    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
