//! QuorumLog Configuration
//!
//! Configuration structures for the primary and secondary roles, loaded once
//! at startup from a TOML file and never reloaded.

use serde::{Deserialize, Serialize};

/// Top-level configuration, shape depends on which role the node runs as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuorumLogConfig {
    /// HTTP API configuration (shared shape for both roles).
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Primary-only settings. Required when `role = "primary"`.
    #[serde(default)]
    pub primary: PrimaryConfig,

    /// Secondary-only settings. Required when `role = "secondary"`.
    #[serde(default)]
    pub secondary: SecondaryConfig,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP API bind address, e.g. "0.0.0.0:8080".
    #[serde(default = "default_api_address")]
    pub bind_address: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_api_address(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Settings specific to the primary role.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PrimaryConfig {
    /// RPC addresses of the secondary nodes, e.g. ["10.0.0.2:7000", "10.0.0.3:7000"].
    #[serde(default)]
    pub secondary_hosts: Vec<String>,

    /// Timeout, in seconds, applied to each outbound AppendMessage/Heartbeat RPC.
    #[serde(default = "default_rpc_timeout_seconds")]
    pub rpc_timeout_seconds: u64,

    /// Heartbeat interval, in seconds. Defaults to the spec's HEARTBEAT_INTERVAL.
    #[serde(default = "default_heartbeat_interval_seconds")]
    pub heartbeat_interval_seconds: u64,

    /// Heartbeat per-call timeout, in seconds. Defaults to the spec's HEARTBEAT_TIMEOUT.
    #[serde(default = "default_heartbeat_timeout_seconds")]
    pub heartbeat_timeout_seconds: u64,
}

/// Settings specific to the secondary role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryConfig {
    /// RPC bind address this secondary listens on for AppendMessage/Heartbeat, e.g. "0.0.0.0:7000".
    #[serde(default = "default_rpc_bind_address")]
    pub rpc_bind_address: String,

    /// Artificial delay, in seconds, applied before storing each replicated append.
    /// A test affordance for exercising out-of-order arrival and write-concern waiting.
    #[serde(default)]
    pub delay_seconds: u64,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            rpc_bind_address: default_rpc_bind_address(),
            delay_seconds: 0,
        }
    }
}

fn default_api_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_rpc_bind_address() -> String {
    "0.0.0.0:7000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rpc_timeout_seconds() -> u64 {
    10
}

fn default_heartbeat_interval_seconds() -> u64 {
    5
}

fn default_heartbeat_timeout_seconds() -> u64 {
    1
}

impl QuorumLogConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string.
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: QuorumLogConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Validate the primary-role settings.
    pub fn validate_primary(&self) -> crate::Result<()> {
        if self.primary.secondary_hosts.is_empty() {
            tracing::warn!("primary.secondary_hosts is empty; this node has no replicas");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primary_config() {
        let toml = r#"
[api]
bind_address = "0.0.0.0:8080"

[primary]
secondary_hosts = ["127.0.0.1:7001", "127.0.0.1:7002"]
rpc_timeout_seconds = 5
"#;
        let config = QuorumLogConfig::from_str(toml).unwrap();
        assert_eq!(config.primary.secondary_hosts.len(), 2);
        assert_eq!(config.primary.rpc_timeout_seconds, 5);
        assert_eq!(config.primary.heartbeat_interval_seconds, 5);
    }

    #[test]
    fn defaults_when_section_missing() {
        let config = QuorumLogConfig::from_str("").unwrap();
        assert_eq!(config.api.bind_address, "0.0.0.0:8080");
        assert_eq!(config.secondary.rpc_bind_address, "0.0.0.0:7000");
        assert_eq!(config.secondary.delay_seconds, 0);
    }
}
