//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All errors are
//! collected rather than stopping at the first one. Missing RPC URL or
//! contract address is not a validation error here: read-only tooling may
//! still load a partial config, and the components that need them fail
//! with a configuration error when they are built.

use std::net::SocketAddr;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    let chain = &config.chain;
    if let Some(rpc_url) = &chain.rpc_url {
        if let Err(e) = rpc_url.parse::<url::Url>() {
            errors.push(ValidationError::new("chain.rpc_url", format!("invalid URL: {}", e)));
        }
    }
    for failover in &chain.failover_urls {
        if let Err(e) = failover.parse::<url::Url>() {
            errors.push(ValidationError::new(
                "chain.failover_urls",
                format!("invalid URL '{}': {}", failover, e),
            ));
        }
    }
    if let Some(address) = &chain.contract_address {
        if address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "chain.contract_address",
                format!("'{}' is not a 20-byte hex address", address),
            ));
        }
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than zero"));
    }
    if chain.gas_limit == 0 {
        errors.push(ValidationError::new("chain.gas_limit", "must be greater than zero"));
    }
    if chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("chain.poll_interval_ms", "must be greater than zero"));
    }
    if chain.confirmation_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "chain.confirmation_timeout_secs",
            "must be greater than zero when set",
        ));
    }
    if let Some(secs) = chain.confirmation_timeout_secs {
        if secs >= config.timeouts.request_secs {
            errors.push(ValidationError::new(
                "chain.confirmation_timeout_secs",
                format!(
                    "must be shorter than timeouts.request_secs ({})",
                    config.timeouts.request_secs
                ),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nope".into();
        config.chain.rpc_url = Some("not a url".into());
        config.chain.contract_address = Some("0x1234".into());
        config.chain.gas_limit = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "chain.rpc_url",
                "chain.contract_address",
                "chain.gas_limit"
            ]
        );
    }

    #[test]
    fn test_accepts_complete_chain_section() {
        let mut config = GatewayConfig::default();
        config.chain.rpc_url = Some("https://rpc.sepolia.org".into());
        config.chain.contract_address = Some("0x5FbDB2315678afecb367f032d93F642f64180aa3".into());
        config.chain.confirmation_timeout_secs = Some(120);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_confirmation_wait_must_fit_in_request_timeout() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 60;
        config.chain.confirmation_timeout_secs = Some(60);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "chain.confirmation_timeout_secs");

        config.chain.confirmation_timeout_secs = Some(59);
        assert!(validate_config(&config).is_ok());
    }
}
