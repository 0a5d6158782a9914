//! Write coordinator: the primary's single entry point for appends, reads,
//! and health reporting.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};

use super::health::NodeStatus;
use super::log::LocalLog;
use super::replicator::Replicator;

pub struct Coordinator {
    log: LocalLog,
    replicator: Arc<Replicator>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub primary: &'static str,
    pub secondaries: HashMap<String, NodeStatus>,
    pub quorum: bool,
}

impl Coordinator {
    pub fn new(replicator: Arc<Replicator>) -> Self {
        Self {
            log: LocalLog::new(),
            replicator,
        }
    }

    /// Assigns a sequence id, stores `content` locally, then replicates to
    /// enough secondaries to satisfy `write_concern`. Local append always
    /// happens — only the replication wait can fail the request.
    pub async fn append(&self, content: String, write_concern: u32) -> Result<u64> {
        if !self.replicator.has_quorum() {
            return Err(Error::QuorumLost);
        }

        let id = self.log.allocate_and_append(content.clone());
        self.replicator.replicate(id, content, write_concern).await?;
        Ok(id)
    }

    pub fn list(&self) -> Vec<String> {
        self.log.snapshot()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            primary: "Healthy",
            secondaries: self.replicator.health().snapshot(),
            quorum: self.replicator.has_quorum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn coordinator(hosts: Vec<String>) -> (Coordinator, Arc<Replicator>) {
        let replicator = Arc::new(Replicator::new(
            hosts,
            Duration::from_millis(200),
            Duration::from_millis(200),
            Duration::from_secs(5),
        ));
        (Coordinator::new(Arc::clone(&replicator)), replicator)
    }

    #[tokio::test]
    async fn append_with_write_concern_one_never_waits_but_still_replicates() {
        let (coordinator, replicator) = coordinator(vec!["127.0.0.1:1".to_string()]);
        let id = coordinator.append("hello".to_string(), 1).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(coordinator.list(), vec!["hello".to_string()]);
        // write_concern=1 needs no remote ACK to return, but the secondary
        // must still have a retry task running in the background so it
        // eventually receives the message.
        assert_eq!(replicator.background_task_count().await, 1);
    }

    #[tokio::test]
    async fn append_rejected_when_quorum_lost() {
        let (coordinator, replicator) = coordinator(vec!["a".to_string(), "b".to_string()]);
        replicator.health().record_failure("a");
        replicator.health().record_failure("a");
        replicator.health().record_failure("b");
        replicator.health().record_failure("b");

        let result = coordinator.append("hello".to_string(), 1).await;
        assert!(matches!(result, Err(Error::QuorumLost)));
        // Rejected writes must not consume a sequence id.
        assert!(coordinator.list().is_empty());
    }
}
