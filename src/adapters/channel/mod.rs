//! Channel Adapters - Message Media Shared With the Wallet

pub mod broadcast;

pub use broadcast::LocalChannel;
