//! Audit log subsystem.
//!
//! # Data Flow
//! ```text
//! Write: LogRecordInput
//!     → submitter.rs (nonce → gas price → build → sign → broadcast → confirm)
//!     → TransactionReceipt
//!
//! Read:  query.rs (count, getLog(i) via the gateway)
//!     → RawLogTuple (positional ABI values, 3 or 7 fields)
//!     → decoder.rs (schema version by arity → canonical record)
//!     → LogRecordOutput
//! ```

pub mod decoder;
pub mod query;
pub mod submitter;
pub mod types;

pub use query::LogQueryService;
pub use submitter::{SubmitterSettings, TransactionSubmitter};
pub use types::{LogError, LogRecordInput, LogRecordOutput, LogResult, RawLogTuple};
