//! QuorumLog Error Types

use thiserror::Error;

/// Result type alias for QuorumLog operations
pub type Result<T> = std::result::Result<T, Error>;

/// QuorumLog error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Write path errors, surfaced directly to HTTP clients
    #[error("Quorum lost. Primary is in read-only mode")]
    QuorumLost,

    #[error("Write concern not satisfied. Message persisted on primary only")]
    WriteConcernUnmet,

    // Replication transport errors, never surfaced to clients
    #[error("Transport failure talking to {host}: {reason}")]
    TransportFailure { host: String, reason: String },

    #[error("RPC call to {0} timed out")]
    Timeout(String),

    // Network/wire errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is the kind of error a per-host retry task should swallow and retry on.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::TransportFailure { .. } | Error::Timeout(_) | Error::Network(_)
        )
    }
}
