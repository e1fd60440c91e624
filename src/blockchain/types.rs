//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Closed set of failure kinds surfaced by every public operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required external setting is missing or malformed.
    Configuration,
    /// RPC endpoint unreachable or returned a malformed response.
    Transport,
    /// The node rejected the signed transaction.
    Submission,
    /// Mined (or simulated) but contract execution failed.
    Execution,
    /// No receipt within the allotted wait.
    ConfirmationTimeout,
    /// Requested record index does not exist.
    NotFound,
    /// Record shape not recognized.
    UnknownSchema,
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Missing or invalid setting (RPC URL, contract, ABI, signing key).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Transport(String),

    /// The node refused the raw transaction (nonce too low, underpriced, ...).
    #[error("Transaction rejected: {0}")]
    Submission(String),

    /// Transaction was mined but reverted.
    #[error("Transaction {tx_hash} reverted in block {block_number} (gas used {gas_used})")]
    Reverted {
        tx_hash: TxHash,
        block_number: u64,
        gas_used: u64,
    },

    /// A read-only contract call reverted.
    #[error("Contract call reverted: {0}")]
    CallReverted(String),

    /// Transaction was not mined within the wait budget. It may still land.
    #[error("Transaction {tx_hash} not confirmed after {waited_secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },
}

impl BlockchainError {
    /// The failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockchainError::Configuration(_) => ErrorKind::Configuration,
            BlockchainError::Transport(_) => ErrorKind::Transport,
            BlockchainError::Submission(_) => ErrorKind::Submission,
            BlockchainError::Reverted { .. } | BlockchainError::CallReverted(_) => {
                ErrorKind::Execution
            }
            BlockchainError::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
        }
    }

    /// Hash of the transaction involved, if it was broadcast.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            BlockchainError::Reverted { tx_hash, .. }
            | BlockchainError::ConfirmationTimeout { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// An unsigned `addLog` transaction, built and consumed within one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub call_data: Bytes,
}

/// Execution outcome recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Failed,
}

/// Confirmation record for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub status: ReceiptStatus,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BlockchainError::Configuration("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(BlockchainError::Transport("x".into()).kind(), ErrorKind::Transport);
        assert_eq!(BlockchainError::Submission("x".into()).kind(), ErrorKind::Submission);
        assert_eq!(BlockchainError::CallReverted("x".into()).kind(), ErrorKind::Execution);
        let reverted = BlockchainError::Reverted {
            tx_hash: TxHash::ZERO,
            block_number: 1,
            gas_used: 21_000,
        };
        assert_eq!(reverted.kind(), ErrorKind::Execution);
        assert_eq!(reverted.tx_hash(), Some(TxHash::ZERO));
    }

    #[test]
    fn test_timeout_keeps_hash() {
        let hash = TxHash::repeat_byte(0xab);
        let err = BlockchainError::ConfirmationTimeout {
            tx_hash: hash,
            waited_secs: 30,
        };
        assert_eq!(err.kind(), ErrorKind::ConfirmationTimeout);
        assert_eq!(err.tx_hash(), Some(hash));
        assert!(err.to_string().contains("30 seconds"));
        assert!(err.to_string().contains("0xabab"));
    }

    #[test]
    fn test_receipt_serializes_snake_case() {
        let receipt = TransactionReceipt {
            tx_hash: TxHash::repeat_byte(1),
            block_number: 42,
            gas_used: 51_234,
            status: ReceiptStatus::Success,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["block_number"], 42);
        assert_eq!(json["gas_used"], 51_234);
        assert_eq!(json["status"], "success");
        assert!(json["tx_hash"].as_str().unwrap().starts_with("0x0101"));
    }
}
