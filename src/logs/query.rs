//! Read path: `count`, single record and full listing.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::U256;

use crate::blockchain::contract::{ContractDescriptor, COUNT, GET_LOG};
use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::types::BlockchainError;
use crate::logs::decoder;
use crate::logs::types::{LogError, LogRecordOutput, LogResult, RawLogTuple};

/// Reads log records back from the contract.
#[derive(Clone)]
pub struct LogQueryService {
    gateway: Arc<dyn ChainGateway>,
    contract: Arc<ContractDescriptor>,
}

impl LogQueryService {
    pub fn new(gateway: Arc<dyn ChainGateway>, contract: Arc<ContractDescriptor>) -> Self {
        Self { gateway, contract }
    }

    /// Number of records currently stored.
    pub async fn count(&self) -> LogResult<u64> {
        let data = self.contract.encode_call(COUNT, &[])?;
        let output = self.gateway.call(self.contract.address(), data).await?;
        let values = self.contract.decode_output(COUNT, &output)?;

        match values.as_slice() {
            [DynSolValue::Uint(n, _)] => u64::try_from(*n).map_err(|_| {
                BlockchainError::Transport(format!("count() returned out-of-range value {}", n))
                    .into()
            }),
            _ => Err(BlockchainError::Transport(format!(
                "count() returned {} values, expected one uint",
                values.len()
            ))
            .into()),
        }
    }

    /// Record at `index`.
    ///
    /// # Errors
    /// `NotFound` if `index >= count`.
    pub async fn get_one(&self, index: u64) -> LogResult<LogRecordOutput> {
        let count = self.count().await?;
        if index >= count {
            return Err(LogError::NotFound { index, count });
        }
        self.fetch(index).await
    }

    /// All records in insertion order (index 0 first).
    ///
    /// Reads `count` once, then indices `0..count`. Records appended while
    /// iterating are not included. Any undecodable record fails the listing.
    pub async fn get_all(&self) -> LogResult<Vec<LogRecordOutput>> {
        let count = self.count().await?;
        let mut records = Vec::with_capacity(count.min(1024) as usize);
        for index in 0..count {
            records.push(self.fetch(index).await?);
        }
        tracing::debug!(count, "Listed log records");
        Ok(records)
    }

    async fn fetch(&self, index: u64) -> LogResult<LogRecordOutput> {
        let data = self
            .contract
            .encode_call(GET_LOG, &[DynSolValue::Uint(U256::from(index), 256)])?;
        let output = self.gateway.call(self.contract.address(), data).await?;
        let raw = RawLogTuple(self.contract.decode_output(GET_LOG, &output)?);

        decoder::decode(raw).inspect_err(|e| {
            tracing::warn!(index, error = %e, "Undecodable log record");
        })
    }
}
