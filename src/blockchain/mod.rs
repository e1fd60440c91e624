//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, RPC URL, contract address)
//!     → wallet.rs (key loading, signing)
//!     → contract.rs (ABI encode/decode for addLog, getLog, count)
//!     → gateway.rs (RPC connection with timeouts and failover)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod contract;
pub mod gateway;
pub mod types;
pub mod wallet;

pub use contract::ContractDescriptor;
pub use gateway::{ChainGateway, RpcGateway};
pub use types::{
    BlockchainError, BlockchainResult, ErrorKind, ReceiptStatus, TransactionReceipt,
    TransactionRequest,
};
pub use wallet::{Signer, Wallet};
