//! Log record types and the read/write error type.

use alloy::dyn_abi::DynSolValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, ErrorKind};

/// A log entry as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecordInput {
    pub doctor_name: String,
    pub reason: String,
    pub patient_id: String,
    /// Unix seconds.
    pub log_time: u64,
    pub message: String,
}

/// Canonical log entry, independent of the on-chain schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecordOutput {
    pub sender: String,
    pub block_timestamp: u64,
    pub doctor_name: String,
    pub reason: String,
    pub patient_id: String,
    pub log_time: u64,
    pub message: String,
}

/// Positional values returned by one `getLog` call, not yet interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLogTuple(pub Vec<DynSolValue>);

impl RawLogTuple {
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<DynSolValue>> for RawLogTuple {
    fn from(values: Vec<DynSolValue>) -> Self {
        Self(values)
    }
}

/// Errors from log submission and queries.
#[derive(Debug, Error)]
pub enum LogError {
    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error("Log index {index} out of range (count is {count})")]
    NotFound { index: u64, count: u64 },

    #[error("Unrecognized log record shape: {0}")]
    UnknownSchema(String),
}

impl LogError {
    /// The failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogError::Chain(e) => e.kind(),
            LogError::NotFound { .. } => ErrorKind::NotFound,
            LogError::UnknownSchema(_) => ErrorKind::UnknownSchema,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        LogError::Chain(BlockchainError::Configuration(message.into()))
    }
}

/// Result type for log operations.
pub type LogResult<T> = Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_uses_camel_case() {
        let input: LogRecordInput = serde_json::from_str(
            r#"{"doctorName":"Dr. A","reason":"checkup","patientId":"P-1","logTime":1700000000,"message":"ok"}"#,
        )
        .unwrap();
        assert_eq!(input.doctor_name, "Dr. A");
        assert_eq!(input.patient_id, "P-1");
        assert_eq!(input.log_time, 1_700_000_000);
    }

    #[test]
    fn test_input_rejects_missing_field() {
        let result: Result<LogRecordInput, _> =
            serde_json::from_str(r#"{"doctorName":"Dr. A","message":"ok"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_always_has_seven_fields() {
        let output = LogRecordOutput {
            sender: "0xabc".into(),
            block_timestamp: 1_600_000_000,
            doctor_name: String::new(),
            reason: String::new(),
            patient_id: String::new(),
            log_time: 0,
            message: "legacy entry".into(),
        };
        let json = serde_json::to_value(&output).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 7);
        assert_eq!(json["blockTimestamp"], 1_600_000_000u64);
        assert_eq!(json["doctorName"], "");
        assert_eq!(json["logTime"], 0);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(LogError::NotFound { index: 3, count: 3 }.kind(), ErrorKind::NotFound);
        assert_eq!(LogError::UnknownSchema("x".into()).kind(), ErrorKind::UnknownSchema);
        assert_eq!(LogError::configuration("no key").kind(), ErrorKind::Configuration);
    }
}
