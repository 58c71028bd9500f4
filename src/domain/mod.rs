//! Domain layer - Pure wallet-protocol logic.
//!
//! ABI type tags and codec, the messaging envelope, and the
//! confirmation state machine. No I/O happens here (hexagonal
//! architecture inner ring); everything is testable in isolation.

pub mod abi_type;
pub mod codec;
pub mod confirmation;
pub mod envelope;

// Re-export core types for convenience
pub use abi_type::{AbiType, DataType};
pub use codec::{DecodeError, EncodeError, EncodedCall};
pub use confirmation::{Confirmation, ConfirmationState, FailureReason, TransactionStatus};
pub use envelope::{CorrelationId, Envelope, Route};
