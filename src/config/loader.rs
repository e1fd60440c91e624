//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `chain.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "RPC_URL";
/// Environment variable overriding `chain.contract_address`.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "CONTRACT_ADDRESS";
/// Environment variable overriding `chain.chain_id`.
pub const CHAIN_ID_ENV_VAR: &str = "CHAIN_ID";
/// Environment variable overriding `chain.abi_path`.
pub const ABI_PATH_ENV_VAR: &str = "ABI_PATH";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {message}")]
    Env { name: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file plus process environment.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Load configuration using `lookup` to resolve environment variables.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values on top of file values. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(rpc_url) = get(RPC_URL_ENV_VAR) {
        config.chain.rpc_url = Some(rpc_url);
    }
    if let Some(address) = get(CONTRACT_ADDRESS_ENV_VAR) {
        config.chain.contract_address = Some(address);
    }
    if let Some(abi_path) = get(ABI_PATH_ENV_VAR) {
        config.chain.abi_path = Some(abi_path);
    }
    if let Some(chain_id) = get(CHAIN_ID_ENV_VAR) {
        config.chain.chain_id = chain_id.trim().parse().map_err(|e| ConfigError::Env {
            name: CHAIN_ID_ENV_VAR,
            message: format!("{}", e),
        })?;
    }

    Ok(())
}
