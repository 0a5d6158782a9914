//! QuorumLog - Replicated Append-Only Message Log
//!
//! A small distributed log with a single primary and a configurable number
//! of secondaries. Clients append messages to the primary with a tunable
//! write concern; the primary assigns sequence ids under a single mutex,
//! then fans the message out to secondaries, waiting for enough remote
//! acknowledgements to satisfy the request before returning.
//!
//! # Architecture
//!
//! The primary is the only node accepting writes. It tracks each
//! secondary's health via periodic heartbeats and refuses writes when the
//! cluster no longer has a strict quorum. Secondaries apply replicated
//! appends idempotently and always acknowledge, so the primary's indefinite
//! per-host retries are safe.
//!
//! # Features
//!
//! - Tunable write concern with quorum gating
//! - Asynchronous fan-out replication with per-host retry and backoff
//! - Three-state health tracking (Healthy / Suspected / Unhealthy)
//! - Idempotent, order-preserving secondary storage
//! - HTTP API for both roles

pub mod api;
pub mod config;
pub mod error;
pub mod primary;
pub mod rpc;
pub mod secondary;

pub use config::QuorumLogConfig;
pub use error::{Error, Result};

/// Re-export of commonly used types.
pub mod prelude {
    pub use crate::config::QuorumLogConfig;
    pub use crate::error::{Error, Result};
    pub use crate::primary::{Coordinator, HealthTable, NodeStatus, Replicator};
    pub use crate::rpc::Message;
    pub use crate::secondary::{OrderedStorage, SecondaryHandler};
}
