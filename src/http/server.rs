//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the log handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, metrics)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::gateway::ChainGateway;
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::middleware::track_metrics;
use crate::http::request::{make_request_span, UuidRequestId};
use crate::logs::{LogQueryService, TransactionSubmitter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub submitter: Arc<TransactionSubmitter>,
    pub query: Arc<LogQueryService>,
    pub gateway: Arc<dyn ChainGateway>,
    /// Upper bound on the receipt wait of `POST /logs`.
    pub submit_wait_limit: Duration,
}

/// Longest confirmation wait that still answers before the request
/// timeout fires, so a slow transaction surfaces as an error with its hash.
pub fn submit_wait_limit(request_timeout: Duration) -> Duration {
    let margin = (request_timeout / 5).min(Duration::from_secs(5));
    request_timeout.saturating_sub(margin)
}

/// HTTP front end for the log store.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &GatewayConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        Router::new()
            .route("/logs", get(handlers::list_logs).post(handlers::add_log))
            .route("/logs/{index}", get(handlers::get_log))
            .route("/count", get(handlers::count_logs))
            .route("/health", get(handlers::health))
            .route_layer(middleware::from_fn(track_metrics))
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .with_state(state)
            .layer(layers)
    }

    /// Serve on `listener` until a value arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}
