//! SDK error type.
//!
//! Every failure is local to one request or one polling session and is
//! returned to the caller; nothing here is fatal to the process.

use thiserror::Error;

use crate::domain::confirmation::UNKNOWN_ERROR;
use crate::domain::{DecodeError, EncodeError};

/// Errors surfaced by bridge requests, contract calls and polling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// Unsupported type tag, arity mismatch or bad argument value.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Return payload could not be decoded for the declared types.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Explorer lookup failed (network, non-2xx, malformed body).
    #[error("transport error: {0}")]
    Transport(String),
    /// The wallet answered with an explicit error field.
    #[error("wallet error: {0}")]
    Wallet(String),
    /// Transaction mined but reverted; carries the exception reason.
    #[error("execution failed: {0}")]
    ExecutionFailure(String),
    /// Mined with a receipt, but no readable exception or confirmation.
    #[error("{}", UNKNOWN_ERROR)]
    UnknownConfirmation,
    /// No response arrived within the configured request timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    /// Request or confirmation watch was cancelled or replaced.
    #[error("cancelled")]
    Cancelled,
    /// The message channel refused the envelope.
    #[error("channel error: {0}")]
    Channel(String),
    /// A confirmation watch was started with a zero poll interval.
    #[error("poll interval must be non-zero")]
    InvalidInterval,
    /// The wallet response lacked an expected field.
    #[error("malformed wallet response: {0}")]
    MalformedResponse(String),
}

pub type Result<T, E = SdkError> = std::result::Result<T, E>;
