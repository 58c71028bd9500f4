//! Qtum Wallet Bridge — Library Root
//!
//! Talks to the Qtum browser wallet over a page message channel and to
//! the Insight explorer over HTTP. Re-exports all modules for
//! integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod telemetry;
pub mod usecases;

pub use error::{Result, SdkError};
pub use usecases::{CallOutput, Contract, QtumWallet, SendOptions};
