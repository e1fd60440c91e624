//! Chain gateway: the RPC boundary of the service.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Query chain state (nonce, gas price, block number, receipts)
//! - Broadcast signed transactions and wait for their receipts
//! - Execute read-only contract calls
//! - Classify failures: transport vs. node rejection vs. revert

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest as RpcTransactionRequest;
use alloy::transports::{RpcError, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, timeout};

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainConfig, ReceiptStatus, TransactionReceipt,
};

/// RPC operations the core needs from a chain node.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Current transaction count (nonce) of `address`.
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    /// Current gas price recommendation in wei.
    async fn get_gas_price(&self) -> BlockchainResult<u128>;

    /// Broadcast a signed transaction, returning its hash.
    async fn send_raw_transaction(&self, signed: Bytes) -> BlockchainResult<TxHash>;

    /// Wait until `tx_hash` is mined. `None` waits indefinitely.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Option<Duration>,
    ) -> BlockchainResult<TransactionReceipt>;

    /// Execute a read-only call against `to`, returning raw return data.
    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes>;

    /// Latest block number.
    async fn get_block_number(&self) -> BlockchainResult<u64>;
}

/// JSON-RPC gateway with failover support.
#[derive(Clone)]
pub struct RpcGateway {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Primary endpoint, for diagnostics.
    rpc_url: String,
    /// Per-request timeout.
    timeout_duration: Duration,
    /// Receipt polling interval.
    poll_interval: Duration,
}

impl RpcGateway {
    /// Create a new gateway. Does not touch the network.
    ///
    /// # Errors
    /// `Configuration` if the RPC URL is missing or unparseable.
    pub fn new(config: &ChainConfig) -> BlockchainResult<Self> {
        let rpc_url = config
            .rpc_url
            .as_deref()
            .ok_or_else(|| BlockchainError::Configuration("RPC_URL not set".to_string()))?;

        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = rpc_url.parse().map_err(|e| {
            BlockchainError::Configuration(format!("Invalid RPC URL '{}': {}", rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %rpc_url,
            failovers = providers.len() - 1,
            "RPC gateway initialized"
        );

        Ok(Self {
            providers,
            rpc_url: rpc_url.to_string(),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    async fn fetch_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TransactionReceipt>> {
        let mut attempts = Attempts::default();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_receipt(tx_hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(Some(receipt))) => {
                    let status = if receipt.status() {
                        ReceiptStatus::Success
                    } else {
                        ReceiptStatus::Failed
                    };
                    return Ok(Some(TransactionReceipt {
                        tx_hash,
                        block_number: receipt.block_number.unwrap_or_default(),
                        gas_used: receipt.gas_used,
                        status,
                    }));
                }
                Ok(Ok(None)) => return Ok(None),
                Ok(Err(e)) => attempts.rpc_error(i, &e),
                Err(_) => attempts.timed_out(i, self.timeout_duration),
            }
        }
        Err(attempts.exhausted("get receipt"))
    }

    async fn poll_receipt(&self, tx_hash: TxHash) -> TransactionReceipt {
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            match self.fetch_receipt(tx_hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                // Already broadcast: keep polling rather than report it as never sent.
                Err(e) => tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed"),
            }
        }
    }
}

/// Last failure seen while walking the provider list.
#[derive(Default)]
struct Attempts {
    last: Option<String>,
}

impl Attempts {
    fn rpc_error(&mut self, provider_idx: usize, err: &TransportError) {
        let cause = describe(err);
        tracing::warn!(provider_idx, error = %cause, "RPC error");
        self.last = Some(cause);
    }

    fn timed_out(&mut self, provider_idx: usize, after: Duration) {
        tracing::warn!(provider_idx, "RPC timeout");
        self.last = Some(format!("request timed out after {}s", after.as_secs()));
    }

    fn exhausted(self, op: &str) -> BlockchainError {
        let message = match self.last {
            Some(cause) => format!("All providers failed to {}: {}", op, cause),
            None => format!("All providers failed to {}", op),
        };
        BlockchainError::Transport(message)
    }
}

/// Render an RPC failure with its cause chain, so "connection refused"
/// survives the transport wrappers.
fn describe(err: &TransportError) -> String {
    if let RpcError::ErrorResp(payload) = err {
        return format!("node returned error {}: {}", payload.code, payload.message);
    }
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Split a transport-level failure from a node's JSON-RPC error response.
fn is_error_response(err: &TransportError) -> bool {
    matches!(err, RpcError::ErrorResp(_))
}

fn error_message(err: &TransportError) -> String {
    match err {
        RpcError::ErrorResp(payload) => payload.message.to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ChainGateway for RpcGateway {
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        let mut attempts = Attempts::default();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => attempts.rpc_error(i, &e),
                Err(_) => attempts.timed_out(i, self.timeout_duration),
            }
        }
        Err(attempts.exhausted("get transaction count"))
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        let mut attempts = Attempts::default();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => attempts.rpc_error(i, &e),
                Err(_) => attempts.timed_out(i, self.timeout_duration),
            }
        }
        Err(attempts.exhausted("get gas price"))
    }

    async fn send_raw_transaction(&self, signed: Bytes) -> BlockchainResult<TxHash> {
        let mut attempts = Attempts::default();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.send_raw_transaction(&signed);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                // A node that answered and refused will not change its mind on a retry.
                Ok(Err(e)) if is_error_response(&e) => {
                    return Err(BlockchainError::Submission(error_message(&e)));
                }
                Ok(Err(e)) => attempts.rpc_error(i, &e),
                Err(_) => attempts.timed_out(i, self.timeout_duration),
            }
        }
        Err(attempts.exhausted("broadcast transaction"))
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        wait: Option<Duration>,
    ) -> BlockchainResult<TransactionReceipt> {
        let started = Instant::now();
        match wait {
            Some(limit) => timeout(limit, self.poll_receipt(tx_hash)).await.map_err(|_| {
                BlockchainError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: started.elapsed().as_secs(),
                }
            }),
            None => Ok(self.poll_receipt(tx_hash).await),
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let request = RpcTransactionRequest::default().to(to).input(data.into());
        let mut attempts = Attempts::default();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.call(request.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) if is_error_response(&e) => {
                    return Err(BlockchainError::CallReverted(error_message(&e)));
                }
                Ok(Err(e)) => attempts.rpc_error(i, &e),
                Err(_) => attempts.timed_out(i, self.timeout_duration),
            }
        }
        Err(attempts.exhausted("execute call"))
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        let mut attempts = Attempts::default();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => attempts.rpc_error(i, &e),
                Err(_) => attempts.timed_out(i, self.timeout_duration),
            }
        }
        Err(attempts.exhausted("get block number"))
    }
}

impl std::fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGateway")
            .field("rpc_url", &self.rpc_url)
            .field("providers", &self.providers.len())
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
