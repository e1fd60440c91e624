//! Audit log gateway for an on-chain `LogStore` contract.
//!
//! Writes are signed server-side and submitted as `addLog` transactions;
//! reads go through `count()` / `getLog(i)` and are normalized across
//! contract schema versions.

pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logs;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
