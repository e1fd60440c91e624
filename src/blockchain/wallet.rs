//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged, serialized or echoed in error messages
//! - Signing happens in-process; key material never leaves it

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest as RpcTransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::blockchain::types::{BlockchainError, BlockchainResult, TransactionRequest};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// Holder of a signing credential.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Address derived from the credential. No network access.
    fn address(&self) -> Address;

    /// Sign a transaction, returning the raw bytes ready for broadcast.
    async fn sign(&self, request: &TransactionRequest) -> BlockchainResult<Bytes>;
}

/// Local private-key wallet.
#[derive(Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        // The parse error is dropped: it can quote the offending input.
        let signer: PrivateKeySigner = key_hex.parse().map_err(|_| {
            BlockchainError::Configuration("Invalid private key format".to_string())
        })?;

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self { signer })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `PRIVATE_KEY`. Returns `Ok(None)` when unset or empty, so
    /// read-only deployments can run without a credential.
    pub fn from_env() -> BlockchainResult<Option<Self>> {
        match std::env::var(PRIVATE_KEY_ENV_VAR) {
            Ok(key) if !key.trim().is_empty() => Self::from_private_key(&key).map(Some),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl Signer for Wallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign(&self, request: &TransactionRequest) -> BlockchainResult<Bytes> {
        let wallet = EthereumWallet::from(self.signer.clone());

        let tx = RpcTransactionRequest::default()
            .with_from(request.from)
            .with_to(request.to)
            .with_nonce(request.nonce)
            .with_chain_id(request.chain_id)
            .with_gas_limit(request.gas_limit)
            .with_gas_price(request.gas_price)
            .with_input(request.call_data.clone());

        let envelope = TransactionBuilder::<Ethereum>::build(tx, &wallet)
            .await
            .map_err(|e| BlockchainError::Configuration(format!("Signing failed: {}", e)))?;

        Ok(envelope.encoded_2718().into())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}
