//! Transaction lifecycle for `addLog` writes.
//!
//! # Pipeline
//! ```text
//! credentials  (signer + contract present? sender address)   local
//!   → sequence (sender nonce)                                 RPC
//!   → price    (gas price)                                    RPC
//!   → build    (ABI-encode addLog, fixed gas limit)           local
//!   → sign     (EIP-155 legacy transaction)                   local
//!   → broadcast (raw transaction → hash)                      RPC
//!   → confirm  (receipt, execution status)                    RPC
//! ```
//!
//! Each stage consumes the previous stage's output type, so the order
//! cannot be rearranged by accident.
//!
//! # Known limitation
//! The nonce is read from the chain on every submission and no lock is held
//! between reading it and broadcasting. Concurrent submissions from the same
//! credential can pick the same nonce; the node rejects the loser with a
//! `Submission` error. Such errors are reported, never retried.

use std::sync::Arc;
use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, TxHash, U256};

use crate::blockchain::contract::{ContractDescriptor, ADD_LOG};
use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::types::{
    BlockchainError, ChainConfig, ReceiptStatus, TransactionReceipt, TransactionRequest,
};
use crate::blockchain::wallet::Signer;
use crate::logs::types::{LogError, LogRecordInput, LogResult};
use crate::observability::metrics;

/// Fixed parameters applied to every submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterSettings {
    pub chain_id: u64,
    pub gas_limit: u64,
    /// Default confirmation wait; `None` waits indefinitely.
    pub confirmation_timeout: Option<Duration>,
}

impl From<&ChainConfig> for SubmitterSettings {
    fn from(config: &ChainConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            gas_limit: config.gas_limit,
            confirmation_timeout: config.confirmation_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Writes log records to the contract and waits for inclusion.
pub struct TransactionSubmitter {
    gateway: Arc<dyn ChainGateway>,
    signer: Option<Arc<dyn Signer>>,
    contract: Option<Arc<ContractDescriptor>>,
    settings: SubmitterSettings,
}

struct Credentials<'a> {
    signer: &'a dyn Signer,
    contract: &'a ContractDescriptor,
    sender: Address,
}

struct Sequenced<'a> {
    credentials: Credentials<'a>,
    nonce: u64,
}

struct Priced<'a> {
    sequenced: Sequenced<'a>,
    gas_price: u128,
}

struct Built<'a> {
    signer: &'a dyn Signer,
    request: TransactionRequest,
}

struct Signed {
    raw: Bytes,
    nonce: u64,
}

struct Broadcast {
    tx_hash: TxHash,
}

impl TransactionSubmitter {
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        signer: Option<Arc<dyn Signer>>,
        contract: Option<Arc<ContractDescriptor>>,
        settings: SubmitterSettings,
    ) -> Self {
        Self {
            gateway,
            signer,
            contract,
            settings,
        }
    }

    /// Whether a signing credential is configured.
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Configured confirmation wait; `None` waits indefinitely.
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.settings.confirmation_timeout
    }

    /// Submit `record` using the configured confirmation timeout.
    pub async fn submit(&self, record: LogRecordInput) -> LogResult<TransactionReceipt> {
        self.submit_with_timeout(record, self.settings.confirmation_timeout)
            .await
    }

    /// Submit `record`, waiting at most `wait` for the receipt.
    ///
    /// # Errors
    /// - `Configuration` before any RPC call if signer or contract is missing
    /// - `Transport`, `Submission` if the transaction never reached the chain
    /// - `Execution` if it was mined and reverted
    /// - `ConfirmationTimeout` (with hash) if it was sent but not yet mined
    pub async fn submit_with_timeout(
        &self,
        record: LogRecordInput,
        wait: Option<Duration>,
    ) -> LogResult<TransactionReceipt> {
        let result = self.run_pipeline(record, wait).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => kind_label(e),
        };
        metrics::record_submission(outcome);
        result
    }

    async fn run_pipeline(
        &self,
        record: LogRecordInput,
        wait: Option<Duration>,
    ) -> LogResult<TransactionReceipt> {
        let credentials = self.credentials()?;
        let sequenced = self.sequence(credentials).await?;
        let priced = self.price(sequenced).await?;
        let built = self.build(priced, &record)?;
        let signed = self.sign(built).await?;
        let broadcast = self.broadcast(signed).await?;
        self.confirm(broadcast, wait).await
    }

    fn credentials(&self) -> LogResult<Credentials<'_>> {
        let signer = self
            .signer
            .as_deref()
            .ok_or_else(|| LogError::configuration("PRIVATE_KEY not configured for server-side signing"))?;
        let contract = self
            .contract
            .as_deref()
            .ok_or_else(|| LogError::configuration("CONTRACT_ADDRESS not configured"))?;

        Ok(Credentials {
            signer,
            contract,
            sender: signer.address(),
        })
    }

    async fn sequence<'a>(&self, credentials: Credentials<'a>) -> LogResult<Sequenced<'a>> {
        let nonce = self
            .gateway
            .get_transaction_count(credentials.sender)
            .await?;
        tracing::debug!(sender = %credentials.sender, nonce, "Resolved nonce");
        Ok(Sequenced { credentials, nonce })
    }

    async fn price<'a>(&self, sequenced: Sequenced<'a>) -> LogResult<Priced<'a>> {
        let gas_price = self.gateway.get_gas_price().await?;
        tracing::debug!(gas_price, "Resolved gas price");
        Ok(Priced {
            sequenced,
            gas_price,
        })
    }

    fn build<'a>(&self, priced: Priced<'a>, record: &LogRecordInput) -> LogResult<Built<'a>> {
        let Priced {
            sequenced: Sequenced { credentials, nonce },
            gas_price,
        } = priced;

        let call_data = credentials.contract.encode_call(
            ADD_LOG,
            &[
                DynSolValue::String(record.doctor_name.clone()),
                DynSolValue::String(record.reason.clone()),
                DynSolValue::String(record.patient_id.clone()),
                DynSolValue::Uint(U256::from(record.log_time), 256),
                DynSolValue::String(record.message.clone()),
            ],
        )?;

        let request = TransactionRequest {
            from: credentials.sender,
            to: credentials.contract.address(),
            nonce,
            chain_id: self.settings.chain_id,
            gas_limit: self.settings.gas_limit,
            gas_price,
            call_data,
        };

        Ok(Built {
            signer: credentials.signer,
            request,
        })
    }

    async fn sign(&self, built: Built<'_>) -> LogResult<Signed> {
        let raw = built.signer.sign(&built.request).await?;
        Ok(Signed {
            raw,
            nonce: built.request.nonce,
        })
    }

    async fn broadcast(&self, signed: Signed) -> LogResult<Broadcast> {
        let tx_hash = self.gateway.send_raw_transaction(signed.raw).await?;
        tracing::info!(tx_hash = %tx_hash, nonce = signed.nonce, "Transaction broadcast");
        Ok(Broadcast { tx_hash })
    }

    async fn confirm(
        &self,
        broadcast: Broadcast,
        wait: Option<Duration>,
    ) -> LogResult<TransactionReceipt> {
        let receipt = self
            .gateway
            .wait_for_receipt(broadcast.tx_hash, wait)
            .await?;

        match receipt.status {
            ReceiptStatus::Success => {
                tracing::info!(
                    tx_hash = %receipt.tx_hash,
                    block_number = receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Transaction confirmed"
                );
                Ok(receipt)
            }
            ReceiptStatus::Failed => {
                tracing::warn!(
                    tx_hash = %receipt.tx_hash,
                    block_number = receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Transaction reverted"
                );
                Err(BlockchainError::Reverted {
                    tx_hash: receipt.tx_hash,
                    block_number: receipt.block_number,
                    gas_used: receipt.gas_used,
                }
                .into())
            }
        }
    }
}

fn kind_label(err: &LogError) -> &'static str {
    use crate::blockchain::types::ErrorKind;
    match err.kind() {
        ErrorKind::Configuration => "configuration",
        ErrorKind::Transport => "transport",
        ErrorKind::Submission => "rejected",
        ErrorKind::Execution => "reverted",
        ErrorKind::ConfirmationTimeout => "timeout",
        ErrorKind::NotFound => "not_found",
        ErrorKind::UnknownSchema => "unknown_schema",
    }
}
