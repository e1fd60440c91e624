//! Contract descriptor: the fixed `{address, abi}` pair of the LogStore contract.
//!
//! ABI-level encoding of call arguments and decoding of return data lives
//! here, so the RPC layer only ever moves raw bytes.

use std::fs;
use std::path::Path;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// ABI of the current (7-field) LogStore contract, bundled at build time.
pub const DEFAULT_ABI_JSON: &str = include_str!("../../abi/LogStore.abi.json");

pub const ADD_LOG: &str = "addLog";
pub const GET_LOG: &str = "getLog";
pub const COUNT: &str = "count";

/// Immutable description of the deployed contract.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    address: Address,
    abi: JsonAbi,
}

impl ContractDescriptor {
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self { address, abi }
    }

    /// Build a descriptor from a textual address and ABI JSON.
    pub fn from_json(address: &str, abi_json: &str) -> BlockchainResult<Self> {
        let address: Address = address.trim().parse().map_err(|e| {
            BlockchainError::Configuration(format!("Invalid contract address '{}': {}", address, e))
        })?;
        let abi: JsonAbi = serde_json::from_str(abi_json)
            .map_err(|e| BlockchainError::Configuration(format!("Invalid contract ABI: {}", e)))?;
        Ok(Self::new(address, abi))
    }

    /// Load the ABI from `abi_path`, or fall back to the bundled ABI.
    pub fn load(address: &str, abi_path: Option<&Path>) -> BlockchainResult<Self> {
        match abi_path {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|e| {
                    BlockchainError::Configuration(format!(
                        "Cannot read ABI file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_json(address, &json)
            }
            None => Self::from_json(address, DEFAULT_ABI_JSON),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Look up a function by name (first overload).
    pub fn function(&self, name: &str) -> BlockchainResult<&Function> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| {
                BlockchainError::Configuration(format!("Contract ABI has no function '{}'", name))
            })
    }

    /// ABI-encode a call, selector included.
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> BlockchainResult<Bytes> {
        let function = self.function(name)?;
        function.abi_encode_input(args).map(Bytes::from).map_err(|e| {
            BlockchainError::Configuration(format!(
                "Cannot encode {} for this contract ABI: {}",
                function.signature(),
                e
            ))
        })
    }

    /// Decode the return data of `name` into positional values.
    pub fn decode_output(&self, name: &str, data: &[u8]) -> BlockchainResult<Vec<DynSolValue>> {
        let function = self.function(name)?;
        function.abi_decode_output(data).map_err(|e| {
            BlockchainError::Transport(format!(
                "Malformed return data for {}: {}",
                function.signature(),
                e
            ))
        })
    }
}
