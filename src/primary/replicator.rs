//! Replication to secondaries: quorum gating, write-concern fan-out, and the
//! background heartbeat monitor.
//!
//! Each append spawns one retry task per secondary, unconditionally — even
//! when the requested write concern needs no remote ACK at all, eventual
//! consistency still depends on those tasks running. Those tasks retry
//! indefinitely with exponential backoff and are not joined by the caller —
//! `replicate` returns as soon as the requested number of acks has arrived,
//! leaving the remaining tasks to keep trying in the background so a slow
//! or recovering secondary still eventually catches up. Every spawned task,
//! along with the heartbeat loop, is tracked so `stop()` can cancel them on
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::rpc::{Message, RpcClient};

use super::health::{HealthTable, NodeStatus};

const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(1);
const RETRY_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const RETRY_MAX_BACKOFF: Duration = Duration::from_secs(30);
const UNHEALTHY_RECHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Coordinates replication of the primary's log to its secondaries.
pub struct Replicator {
    secondary_hosts: Vec<String>,
    health: Arc<HealthTable>,
    client: RpcClient,
    heartbeat_client: RpcClient,
    heartbeat_interval: Duration,
    background_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Replicator {
    pub fn new(
        secondary_hosts: Vec<String>,
        rpc_timeout: Duration,
        heartbeat_timeout: Duration,
        heartbeat_interval: Duration,
    ) -> Self {
        let health = Arc::new(HealthTable::new(&secondary_hosts));
        Self {
            secondary_hosts,
            health,
            client: RpcClient::new(rpc_timeout),
            heartbeat_client: RpcClient::new(heartbeat_timeout),
            heartbeat_interval,
            background_tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn health(&self) -> Arc<HealthTable> {
        Arc::clone(&self.health)
    }

    /// Launches the heartbeat loop as a tracked background task.
    pub async fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_heartbeat_monitor().await });
        self.background_tasks.lock().await.push(handle);
    }

    /// Aborts the heartbeat loop and every still-running per-host retry task.
    pub async fn stop(&self) {
        let mut tasks = self.background_tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    /// Number of tracked background tasks (heartbeat loop + in-flight retry
    /// tasks) not yet aborted or finished. Exposed for tests.
    #[cfg(test)]
    pub async fn background_task_count(&self) -> usize {
        self.background_tasks.lock().await.len()
    }

    /// True when (healthy secondaries + the primary itself) reaches a strict
    /// majority of the full cluster.
    pub fn has_quorum(&self) -> bool {
        let total_nodes = self.secondary_hosts.len() + 1;
        let quorum_needed = total_nodes / 2 + 1;
        let healthy_count = 1 + self.health.healthy_count();
        healthy_count >= quorum_needed
    }

    fn calculate_target_acks(write_concern: u32, total_secondaries: usize) -> usize {
        if write_concern == 0 {
            return 0;
        }
        let target = (write_concern - 1) as usize;
        if target == 0 {
            return 0;
        }
        if target > total_secondaries {
            tracing::warn!(
                "write concern {} cannot be satisfied (only {} secondaries); capping",
                write_concern,
                total_secondaries
            );
            return total_secondaries;
        }
        target
    }

    /// Replicates `content` (already assigned `id`) to enough secondaries to
    /// satisfy `write_concern`. A retry task is spawned for every secondary
    /// regardless of `write_concern` — eventual consistency depends on them
    /// running even when no remote ACK is required for this call to return.
    /// Returns `Err(Error::QuorumLost)` if the cluster lacks quorum, or
    /// `Err(Error::WriteConcernUnmet)` if quorum holds but not enough
    /// secondaries ack before every spawned task has either succeeded or is
    /// still retrying indefinitely in the background.
    pub async fn replicate(self: &Arc<Self>, id: u64, content: String, write_concern: u32) -> Result<()> {
        if !self.has_quorum() {
            tracing::error!("quorum lost, refusing write");
            return Err(Error::QuorumLost);
        }

        let target = Self::calculate_target_acks(write_concern, self.secondary_hosts.len());

        let (tx, mut rx) = mpsc::channel::<()>(self.secondary_hosts.len().max(1));
        let mut handles = Vec::with_capacity(self.secondary_hosts.len());
        for host in &self.secondary_hosts {
            let this = Arc::clone(self);
            let host = host.clone();
            let content = content.clone();
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                this.replicate_to_host_with_retry(host, id, content, tx).await;
            }));
        }
        drop(tx);
        self.background_tasks.lock().await.extend(handles);

        if target == 0 {
            return Ok(());
        }

        let mut acked = 0usize;
        while acked < target {
            match rx.recv().await {
                Some(()) => acked += 1,
                None => break,
            }
        }

        if acked >= target {
            Ok(())
        } else {
            Err(Error::WriteConcernUnmet)
        }
    }

    async fn replicate_to_host_with_retry(
        self: Arc<Self>,
        host: String,
        id: u64,
        content: String,
        acked: mpsc::Sender<()>,
    ) {
        let mut backoff = RETRY_INITIAL_BACKOFF;
        loop {
            if self.health.status(&host) == Some(NodeStatus::Unhealthy) {
                tracing::info!("node {} is unhealthy, waiting before retry", host);
                tokio::time::sleep(UNHEALTHY_RECHECK_INTERVAL).await;
                continue;
            }

            let message = Message::AppendMessage {
                id,
                content: content.clone(),
            };
            match self.client.call(&host, message).await {
                Ok(Message::Ack { success: true }) => {
                    tracing::info!("replicated id={} to {}", id, host);
                    self.health.record_success(&host);
                    let _ = acked.send(()).await;
                    return;
                }
                Ok(_) => {
                    tracing::warn!("unexpected response replicating id={} to {}", id, host);
                    self.health.record_failure(&host);
                }
                Err(e) => {
                    tracing::warn!(
                        "failed to replicate id={} to {}: {}. retrying in {:?}",
                        id,
                        host,
                        e,
                        backoff
                    );
                    self.health.record_failure(&host);
                }
            }

            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(RETRY_MAX_BACKOFF);
        }
    }

    /// Runs forever, probing every secondary once per heartbeat interval.
    async fn run_heartbeat_monitor(self: Arc<Self>) {
        loop {
            let checks = self
                .secondary_hosts
                .iter()
                .map(|host| self.check_single_node(host.clone()));
            futures::future::join_all(checks).await;
            tokio::time::sleep(self.heartbeat_interval).await;
        }
    }

    async fn check_single_node(&self, host: String) {
        match tokio::time::timeout(HEARTBEAT_TIMEOUT, self.heartbeat_client.call(&host, Message::Heartbeat))
            .await
        {
            Ok(Ok(Message::HeartbeatAck)) => {
                if self.health.status(&host) != Some(NodeStatus::Healthy) {
                    tracing::info!("node {} recovered -> Healthy", host);
                }
                self.health.record_success(&host);
            }
            _ => {
                let before = self.health.status(&host);
                self.health.record_failure(&host);
                match before {
                    Some(NodeStatus::Healthy) => {
                        tracing::warn!("node {} is Suspected", host);
                    }
                    Some(NodeStatus::Suspected) => {
                        tracing::error!("node {} marked Unhealthy", host);
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replicator(hosts: Vec<String>) -> Arc<Replicator> {
        Arc::new(Replicator::new(
            hosts,
            Duration::from_millis(200),
            Duration::from_millis(200),
            Duration::from_secs(5),
        ))
    }

    #[test]
    fn target_acks_clamped_to_cluster_size() {
        assert_eq!(Replicator::calculate_target_acks(1, 3), 0);
        assert_eq!(Replicator::calculate_target_acks(2, 3), 1);
        assert_eq!(Replicator::calculate_target_acks(10, 3), 3);
        assert_eq!(Replicator::calculate_target_acks(0, 3), 0);
    }

    #[test]
    fn quorum_requires_strict_majority_including_primary() {
        let r = replicator(vec!["a".into(), "b".into()]);
        // 3-node cluster: primary + 2 secondaries, quorum_needed = 2.
        assert!(r.has_quorum());
        r.health.record_failure("a");
        r.health.record_failure("a");
        // 1 (primary) + 1 (b healthy) = 2 >= 2: still quorate.
        assert!(r.has_quorum());
        r.health.record_failure("b");
        r.health.record_failure("b");
        // 1 (primary) + 0 = 1 < 2: quorum lost.
        assert!(!r.has_quorum());
    }

    #[tokio::test]
    async fn zero_target_acks_still_spawns_replication() {
        let r = replicator(vec!["127.0.0.1:1".into()]);
        let result = r.replicate(1, "hello".to_string(), 1).await;
        assert!(result.is_ok());
        // The call returned without waiting, but a retry task for the lone
        // secondary must still be running in the background.
        assert_eq!(r.background_task_count().await, 1);
    }

    #[tokio::test]
    async fn quorum_lost_rejects_before_spawning_replication() {
        let r = replicator(vec!["a".into(), "b".into()]);
        r.health.record_failure("a");
        r.health.record_failure("a");
        r.health.record_failure("b");
        r.health.record_failure("b");
        let result = r.replicate(1, "hello".to_string(), 2).await;
        assert!(matches!(result, Err(Error::QuorumLost)));
        assert_eq!(r.background_task_count().await, 0);
    }

    #[tokio::test]
    async fn stop_aborts_background_tasks() {
        let r = replicator(vec!["127.0.0.1:1".into()]);
        r.replicate(1, "hello".to_string(), 1).await.unwrap();
        assert_eq!(r.background_task_count().await, 1);
        r.stop().await;
        assert_eq!(r.background_task_count().await, 0);
    }
}
