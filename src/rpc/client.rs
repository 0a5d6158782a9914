//! RPC Client
//!
//! Connects to a secondary's RPC listener, sends one framed request, and
//! reads back one framed response. Every call is wrapped in the configured
//! timeout so a hung peer can never block a retry task forever.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use super::protocol::{read_message, write_message, Message};
use crate::error::{Error, Result};

/// Thin RPC client. Opens a fresh connection per call: at the scale this
/// protocol runs at (one call per retry attempt, one heartbeat per interval)
/// a pooled/persistent connection buys nothing but complexity.
pub struct RpcClient {
    call_timeout: Duration,
}

impl RpcClient {
    pub fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    /// Send `message` to `address` and wait for the response, bounded by the
    /// configured call timeout.
    pub async fn call(&self, address: &str, message: Message) -> Result<Message> {
        match timeout(self.call_timeout, self.call_inner(address, message)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(address.to_string())),
        }
    }

    async fn call_inner(&self, address: &str, message: Message) -> Result<Message> {
        let mut stream = TcpStream::connect(address)
            .await
            .map_err(|e| Error::TransportFailure {
                host: address.to_string(),
                reason: e.to_string(),
            })?;
        stream.set_nodelay(true).ok();

        write_message(&mut stream, &message).await?;
        read_message(&mut stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connection_refused_is_transport_failure() {
        let client = RpcClient::new(Duration::from_millis(200));
        let result = client.call("127.0.0.1:1", Message::Heartbeat).await;
        assert!(matches!(
            result,
            Err(Error::TransportFailure { .. }) | Err(Error::Timeout(_))
        ));
    }
}
