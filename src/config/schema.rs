//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! The signing key is not part of the schema; it is read from the
//! environment only (see [`crate::blockchain::wallet`]).

use serde::{Deserialize, Serialize};

/// Default network id (Sepolia).
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Default gas limit for `addLog` transactions.
pub const DEFAULT_GAS_LIMIT: u64 = 400_000;

/// Root configuration for the log gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Chain and contract settings.
    pub chain: ChainConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Timeout configuration for HTTP requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must cover confirmation time, since `POST /logs` waits for mining.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 300 }
    }
}

/// Chain connection and contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL. Required.
    pub rpc_url: Option<String>,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Address of the deployed LogStore contract. Required.
    pub contract_address: Option<String>,

    /// Path to the contract ABI JSON. The bundled ABI is used when unset.
    pub abi_path: Option<String>,

    /// Chain ID used for EIP-155 replay protection.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas limit attached to every `addLog` transaction.
    pub gas_limit: u64,

    /// Maximum time to wait for a receipt. Unbounded when unset.
    pub confirmation_timeout_secs: Option<u64>,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            failover_urls: Vec::new(),
            contract_address: None,
            abi_path: None,
            chain_id: DEFAULT_CHAIN_ID,
            rpc_timeout_secs: 10,
            gas_limit: DEFAULT_GAS_LIMIT,
            confirmation_timeout_secs: None,
            poll_interval_ms: 2000,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.chain.chain_id, 11_155_111);
        assert_eq!(config.chain.gas_limit, 400_000);
        assert!(config.chain.rpc_url.is_none());
        assert!(config.chain.confirmation_timeout_secs.is_none());
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [chain]
            rpc_url = "http://localhost:8545"
            chain_id = 31337

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.chain.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.chain.chain_id, 31337);
        assert_eq!(config.chain.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
    }
}
