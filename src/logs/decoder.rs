//! Schema normalization for on-chain log records.
//!
//! Two layouts exist on deployed contracts:
//!
//! | Arity | Layout |
//! |---|---|
//! | 7 | sender, blockTimestamp, doctorName, reason, patientId, logTime, message |
//! | 3 | sender, timestamp, message |
//!
//! A raw tuple is matched by arity into a [`RawLogRecord`] variant, then
//! converted into the canonical [`LogRecordOutput`]. Decoding is a pure
//! function of the tuple.

use alloy::dyn_abi::DynSolValue;

use crate::logs::types::{LogError, LogRecordOutput, LogResult, RawLogTuple};

/// Arity of the legacy record layout.
pub const LEGACY_ARITY: usize = 3;
/// Arity of the current record layout.
pub const CURRENT_ARITY: usize = 7;

/// A raw tuple recognized as one of the known schema versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLogRecord {
    Legacy {
        sender: String,
        timestamp: u64,
        message: String,
    },
    Current {
        sender: String,
        block_timestamp: u64,
        doctor_name: String,
        reason: String,
        patient_id: String,
        log_time: u64,
        message: String,
    },
}

impl RawLogRecord {
    /// Identify the schema version of `raw` and type-check each position.
    pub fn from_tuple(raw: RawLogTuple) -> LogResult<Self> {
        let values = raw.0;
        match values.as_slice() {
            [sender, timestamp, message] => Ok(RawLogRecord::Legacy {
                sender: address_field("sender", sender)?,
                timestamp: uint_field("timestamp", timestamp)?,
                message: string_field("message", message)?,
            }),
            [sender, block_timestamp, doctor_name, reason, patient_id, log_time, message] => {
                Ok(RawLogRecord::Current {
                    sender: address_field("sender", sender)?,
                    block_timestamp: uint_field("blockTimestamp", block_timestamp)?,
                    doctor_name: string_field("doctorName", doctor_name)?,
                    reason: string_field("reason", reason)?,
                    patient_id: string_field("patientId", patient_id)?,
                    log_time: uint_field("logTime", log_time)?,
                    message: string_field("message", message)?,
                })
            }
            other => Err(LogError::UnknownSchema(format!(
                "expected {} or {} fields, got {}",
                LEGACY_ARITY,
                CURRENT_ARITY,
                other.len()
            ))),
        }
    }

    /// Arity of the layout this record came from.
    pub fn arity(&self) -> usize {
        match self {
            RawLogRecord::Legacy { .. } => LEGACY_ARITY,
            RawLogRecord::Current { .. } => CURRENT_ARITY,
        }
    }
}

impl From<RawLogRecord> for LogRecordOutput {
    fn from(record: RawLogRecord) -> Self {
        match record {
            RawLogRecord::Legacy {
                sender,
                timestamp,
                message,
            } => LogRecordOutput {
                sender,
                block_timestamp: timestamp,
                doctor_name: String::new(),
                reason: String::new(),
                patient_id: String::new(),
                log_time: 0,
                message,
            },
            RawLogRecord::Current {
                sender,
                block_timestamp,
                doctor_name,
                reason,
                patient_id,
                log_time,
                message,
            } => LogRecordOutput {
                sender,
                block_timestamp,
                doctor_name,
                reason,
                patient_id,
                log_time,
                message,
            },
        }
    }
}

/// Decode a raw `getLog` tuple into the canonical record.
pub fn decode(raw: RawLogTuple) -> LogResult<LogRecordOutput> {
    RawLogRecord::from_tuple(raw).map(LogRecordOutput::from)
}

fn address_field(name: &str, value: &DynSolValue) -> LogResult<String> {
    match value {
        DynSolValue::Address(address) => Ok(address.to_checksum(None)),
        DynSolValue::String(s) => Ok(s.clone()),
        other => Err(mismatch(name, "address", other)),
    }
}

fn uint_field(name: &str, value: &DynSolValue) -> LogResult<u64> {
    match value {
        DynSolValue::Uint(n, _) => u64::try_from(*n).map_err(|_| {
            LogError::UnknownSchema(format!("field '{}' value {} does not fit in u64", name, n))
        }),
        other => Err(mismatch(name, "uint", other)),
    }
}

fn string_field(name: &str, value: &DynSolValue) -> LogResult<String> {
    match value {
        DynSolValue::String(s) => Ok(s.clone()),
        other => Err(mismatch(name, "string", other)),
    }
}

fn mismatch(name: &str, expected: &str, got: &DynSolValue) -> LogError {
    let found = match got {
        DynSolValue::Bool(_) => "bool",
        DynSolValue::Int(..) => "int",
        DynSolValue::Uint(..) => "uint",
        DynSolValue::Address(_) => "address",
        DynSolValue::String(_) => "string",
        DynSolValue::Bytes(_) | DynSolValue::FixedBytes(..) => "bytes",
        DynSolValue::Array(_) | DynSolValue::FixedArray(_) => "array",
        DynSolValue::Tuple(_) => "tuple",
        _ => "other",
    };
    LogError::UnknownSchema(format!("field '{}' expected {}, found {}", name, expected, found))
}
