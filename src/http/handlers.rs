//! Route handlers.
//!
//! Handlers translate between JSON and the log services; status mapping
//! lives in `response.rs`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::blockchain::types::{ErrorKind, TransactionReceipt};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::logs::types::{LogRecordInput, LogRecordOutput};
use crate::observability::metrics;

/// `POST /logs`
///
/// The receipt wait is capped below the request timeout, so a transaction
/// that is broadcast but not yet mined answers 500 with its hash.
pub async fn add_log(
    State(state): State<AppState>,
    payload: Result<Json<LogRecordInput>, JsonRejection>,
) -> Result<Json<TransactionReceipt>, ApiError> {
    let Json(record) = payload
        .map_err(|rejection| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()))?;

    let wait = match state.submitter.confirmation_timeout() {
        Some(configured) => configured.min(state.submit_wait_limit),
        None => state.submit_wait_limit,
    };

    match state.submitter.submit_with_timeout(record, Some(wait)).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(e) => {
            tracing::error!(kind = ?e.kind(), error = %e, "Log submission failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}

/// `GET /logs/{index}`
///
/// A non-numeric or negative index, an index past the end and a record
/// of unknown shape all answer 404.
pub async fn get_log(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<LogRecordOutput>, ApiError> {
    let index: u64 = index
        .parse()
        .map_err(|_| ApiError::not_found(format!("Invalid log index: {}", index)))?;

    state.query.get_one(index).await.map(Json).map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::UnknownSchema => ApiError::not_found(e.to_string()),
        _ => ApiError::from(e),
    })
}

/// `GET /logs`
pub async fn list_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<LogRecordOutput>>, ApiError> {
    state
        .query
        .get_all()
        .await
        .map(Json)
        .map_err(ApiError::internal_from)
}

/// `GET /count`
pub async fn count_logs(State(state): State<AppState>) -> Result<Json<u64>, ApiError> {
    state
        .query
        .count()
        .await
        .map(Json)
        .map_err(ApiError::internal_from)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    match state.gateway.get_block_number().await {
        Ok(block_number) => {
            metrics::record_rpc_health(true);
            Json(json!({ "status": "ok", "block_number": block_number })).into_response()
        }
        Err(e) => {
            metrics::record_rpc_health(false);
            tracing::warn!(error = %e, "RPC node unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "detail": e.to_string() })),
            )
                .into_response()
        }
    }
}
