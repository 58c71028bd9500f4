//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure.
//!
//! Adapter categories:
//! - `channel`: in-process broadcast medium on `tokio::sync::broadcast`
//! - `explorer`: Insight explorer REST client via reqwest

pub mod channel;
pub mod explorer;
