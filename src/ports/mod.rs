//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MessageChannel`: the untrusted page-global broadcast medium
//!   shared with the wallet extension
//! - `TransactionLookup` / `AccountLookup`: the ledger explorer

pub mod channel;
pub mod explorer;
