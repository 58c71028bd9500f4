//! Explorer Adapters - Insight API Access
//!
//! Provides the transaction, account and contract lookups used by the
//! confirmation poller and the wallet facade.

pub mod client;

pub use client::{ExplorerClient, ExplorerClientConfig};
