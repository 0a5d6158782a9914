//! Replication RPC Protocol
//!
//! Defines the wire protocol used between the primary and its secondaries:
//! a length-prefixed, checksummed frame carrying a JSON-encoded `Message`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// RPC messages exchanged between primary and secondary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// Replicate a single message at a given sequence identifier. Idempotent on `id`.
    AppendMessage { id: u64, content: String },

    /// Reply to `AppendMessage`.
    Ack { success: bool },

    /// Liveness probe, carries no payload.
    Heartbeat,

    /// Reply to `Heartbeat`.
    HeartbeatAck,
}

impl Message {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Fixed-size header preceding every frame body: a length and a CRC32 checksum
/// of the body, so transport corruption is caught before deserialization.
#[derive(Debug, Clone, Copy)]
pub struct FrameHeader {
    pub length: u32,
    pub checksum: u32,
}

impl FrameHeader {
    pub const SIZE: usize = 8;

    pub fn new(body: &[u8]) -> Self {
        Self {
            length: body.len() as u32,
            checksum: crc32fast::hash(body),
        }
    }

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.length.to_be_bytes());
        buf[4..8].copy_from_slice(&self.checksum.to_be_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Self {
        let length = u32::from_be_bytes(buf[0..4].try_into().unwrap());
        let checksum = u32::from_be_bytes(buf[4..8].try_into().unwrap());
        Self { length, checksum }
    }
}

/// Messages larger than this are rejected rather than allocated, guarding
/// against a malformed length prefix exhausting memory.
const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Read one framed `Message` from a reader.
pub async fn read_message<R: tokio::io::AsyncRead + Unpin>(reader: &mut R) -> Result<Message> {
    use tokio::io::AsyncReadExt;

    let mut header_bytes = [0u8; FrameHeader::SIZE];
    reader.read_exact(&mut header_bytes).await?;
    let header = FrameHeader::from_bytes(&header_bytes);

    let msg_len = header.length as usize;
    if msg_len > MAX_MESSAGE_SIZE {
        return Err(Error::Network(format!(
            "message too large: {} bytes (max {} bytes)",
            msg_len, MAX_MESSAGE_SIZE
        )));
    }

    let mut body = vec![0u8; msg_len];
    reader.read_exact(&mut body).await?;

    let computed = crc32fast::hash(&body);
    if computed != header.checksum {
        return Err(Error::Network("frame checksum mismatch".into()));
    }

    Message::deserialize(&body)
}

/// Write one framed `Message` to a writer.
pub async fn write_message<W: tokio::io::AsyncWrite + Unpin>(
    writer: &mut W,
    message: &Message,
) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let body = message.serialize()?;
    let header = FrameHeader::new(&body);

    writer.write_all(&header.to_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_append_message() {
        let mut buf = Vec::new();
        let msg = Message::AppendMessage {
            id: 42,
            content: "hello".to_string(),
        };
        write_message(&mut buf, &msg).await.unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let decoded = read_message(&mut cursor).await.unwrap();
        match decoded {
            Message::AppendMessage { id, content } => {
                assert_eq!(id, 42);
                assert_eq!(content, "hello");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_corrupted_frame() {
        let mut buf = Vec::new();
        write_message(&mut buf, &Message::Heartbeat).await.unwrap();
        // Flip a bit in the body, leaving the header's checksum stale.
        let last = buf.len() - 1;
        buf[last] ^= 0xFF;

        let mut cursor = std::io::Cursor::new(buf);
        let result = read_message(&mut cursor).await;
        assert!(result.is_err());
    }
}
