//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, tower layers)
//!     → request.rs (request ID, request span)
//!     → middleware/ (per-route metrics)
//!     → handlers.rs (JSON ↔ log services)
//!     → response.rs (error kind → status, `{detail}` body)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
