//! Secondary-side RPC handler: receives replicated appends and heartbeats.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::rpc::RpcHandler;

use super::storage::OrderedStorage;

/// Answers the primary's `AppendMessage`/`Heartbeat` RPCs on behalf of a
/// secondary node.
pub struct SecondaryHandler {
    storage: Arc<OrderedStorage>,
    delay: Duration,
}

impl SecondaryHandler {
    pub fn new(storage: Arc<OrderedStorage>, delay_seconds: u64) -> Self {
        Self {
            storage,
            delay: Duration::from_secs(delay_seconds),
        }
    }
}

#[async_trait]
impl RpcHandler for SecondaryHandler {
    /// Stores the message, always reporting success regardless of whether
    /// it was new or a duplicate. The primary retries an append until it
    /// sees success, so reporting failure on a duplicate would make an
    /// already-durable write retry forever.
    async fn handle_append(&self, id: u64, content: String) -> bool {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.storage.add(id, content);
        true
    }

    async fn handle_heartbeat(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_always_reports_success() {
        let storage = Arc::new(OrderedStorage::new());
        let handler = SecondaryHandler::new(Arc::clone(&storage), 0);

        assert!(handler.handle_append(1, "a".to_string()).await);
        assert!(handler.handle_append(1, "a-duplicate".to_string()).await);
        assert_eq!(storage.get_all(), vec!["a".to_string()]);
    }
}
