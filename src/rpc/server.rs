//! RPC Server
//!
//! A plain TCP listener that accepts one framed request per connection,
//! dispatches it to an `RpcHandler`, writes back one framed response, and
//! closes. This is the secondary's inbound surface for `AppendMessage` and
//! `Heartbeat`; the primary has no inbound RPC handlers of its own.

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use super::protocol::{read_message, write_message, Message};
use crate::error::Result;

/// Implemented by whichever component answers RPCs — the secondary's append
/// handler, in this design.
#[async_trait::async_trait]
pub trait RpcHandler: Send + Sync {
    async fn handle_append(&self, id: u64, content: String) -> bool;
    async fn handle_heartbeat(&self) {}
}

/// A bound RPC listener, ready to serve. Binding is separated from serving
/// so callers (and tests) can observe the resolved local address — important
/// when `bind_address` uses the ":0" ephemeral-port convention.
pub struct RpcServer<H: RpcHandler + 'static> {
    listener: TcpListener,
    handler: Arc<H>,
}

impl<H: RpcHandler + 'static> RpcServer<H> {
    /// Bind `bind_address` and return a server ready to `serve()`.
    pub async fn bind(bind_address: &str, handler: Arc<H>) -> Result<Self> {
        let listener = TcpListener::bind(bind_address).await?;
        tracing::info!("RPC listener bound to {}", listener.local_addr()?);
        Ok(Self { listener, handler })
    }

    /// The resolved local address this server is listening on.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs forever, spawning one task per accepted connection.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let handler = Arc::clone(&self.handler);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, handler).await {
                    tracing::debug!("RPC connection from {} ended: {}", peer, e);
                }
            });
        }
    }
}

async fn handle_connection<H: RpcHandler + 'static>(
    mut stream: TcpStream,
    handler: Arc<H>,
) -> Result<()> {
    let request = read_message(&mut stream).await?;

    let response = match request {
        Message::AppendMessage { id, content } => {
            let success = handler.handle_append(id, content).await;
            Message::Ack { success }
        }
        Message::Heartbeat => {
            handler.handle_heartbeat().await;
            Message::HeartbeatAck
        }
        other => {
            tracing::warn!("RPC server received unexpected message: {:?}", other);
            Message::Ack { success: false }
        }
    };

    write_message(&mut stream, &response).await
}
