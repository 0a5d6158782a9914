//! Primary role: local log, per-secondary health, replication, and the
//! coordinator tying them together.

pub mod coordinator;
pub mod health;
pub mod log;
pub mod replicator;

pub use coordinator::Coordinator;
pub use health::{HealthTable, NodeStatus};
pub use log::LocalLog;
pub use replicator::Replicator;
