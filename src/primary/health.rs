//! Per-secondary health tracking.
//!
//! Each secondary moves through a three-state machine driven by heartbeat
//! outcomes: a single failed heartbeat degrades it one step
//! (Healthy -> Suspected -> Unhealthy), while a single successful heartbeat
//! recovers it immediately to Healthy, regardless of how degraded it was.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeStatus {
    Healthy,
    Suspected,
    Unhealthy,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeStatus::Healthy => "Healthy",
            NodeStatus::Suspected => "Suspected",
            NodeStatus::Unhealthy => "Unhealthy",
        };
        write!(f, "{s}")
    }
}

impl NodeStatus {
    fn degrade(self) -> Self {
        match self {
            NodeStatus::Healthy => NodeStatus::Suspected,
            NodeStatus::Suspected => NodeStatus::Unhealthy,
            NodeStatus::Unhealthy => NodeStatus::Unhealthy,
        }
    }
}

/// Tracks the current [`NodeStatus`] of every secondary host.
pub struct HealthTable {
    hosts: RwLock<HashMap<String, NodeStatus>>,
}

impl HealthTable {
    pub fn new(secondary_hosts: &[String]) -> Self {
        let hosts = secondary_hosts
            .iter()
            .map(|host| (host.clone(), NodeStatus::Healthy))
            .collect();
        Self {
            hosts: RwLock::new(hosts),
        }
    }

    pub fn status(&self, host: &str) -> Option<NodeStatus> {
        self.hosts.read().unwrap().get(host).copied()
    }

    /// Degrades `host` one step. A no-op if `host` is unknown.
    pub fn record_failure(&self, host: &str) {
        if let Some(status) = self.hosts.write().unwrap().get_mut(host) {
            *status = status.degrade();
        }
    }

    /// Recovers `host` to Healthy in a single step. A no-op if `host` is unknown.
    pub fn record_success(&self, host: &str) {
        if let Some(status) = self.hosts.write().unwrap().get_mut(host) {
            *status = NodeStatus::Healthy;
        }
    }

    /// The number of secondaries currently Healthy.
    pub fn healthy_count(&self) -> usize {
        self.hosts
            .read()
            .unwrap()
            .values()
            .filter(|s| **s == NodeStatus::Healthy)
            .count()
    }

    /// A snapshot of every tracked host's status, for reporting over the health API.
    pub fn snapshot(&self) -> HashMap<String, NodeStatus> {
        self.hosts.read().unwrap().clone()
    }

    pub fn total(&self) -> usize {
        self.hosts.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_failure_degrades_one_step() {
        let table = HealthTable::new(&["a".to_string()]);
        assert_eq!(table.status("a"), Some(NodeStatus::Healthy));
        table.record_failure("a");
        assert_eq!(table.status("a"), Some(NodeStatus::Suspected));
        table.record_failure("a");
        assert_eq!(table.status("a"), Some(NodeStatus::Unhealthy));
        table.record_failure("a");
        assert_eq!(table.status("a"), Some(NodeStatus::Unhealthy));
    }

    #[test]
    fn single_success_recovers_fully() {
        let table = HealthTable::new(&["a".to_string()]);
        table.record_failure("a");
        table.record_failure("a");
        assert_eq!(table.status("a"), Some(NodeStatus::Unhealthy));
        table.record_success("a");
        assert_eq!(table.status("a"), Some(NodeStatus::Healthy));
    }

    #[test]
    fn healthy_count_reflects_current_states() {
        let table = HealthTable::new(&["a".to_string(), "b".to_string()]);
        assert_eq!(table.healthy_count(), 2);
        table.record_failure("a");
        assert_eq!(table.healthy_count(), 1);
    }
}
