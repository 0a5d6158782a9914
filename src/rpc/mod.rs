//! Primary/secondary replication RPC: wire protocol, client, and server.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::RpcClient;
pub use protocol::Message;
pub use server::{RpcHandler, RpcServer};
