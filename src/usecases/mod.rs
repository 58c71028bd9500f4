//! Use Cases Layer - Application Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! SDK's workflows. Each use case owns its state; nothing is global.
//!
//! Use cases:
//! - `Bridge`: Request/response correlation over the page channel
//! - `ConfirmationPoller`: Transaction finality polling
//! - `Contract`: Encoded `send` / `call` through the wallet
//! - `QtumWallet`: Entry point wiring the above together

pub mod bridge;
pub mod contract;
pub mod poller;
pub mod wallet;

pub use bridge::Bridge;
pub use contract::{CallOutput, Contract, SendOptions};
pub use poller::ConfirmationPoller;
pub use wallet::QtumWallet;
