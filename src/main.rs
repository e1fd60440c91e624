//! LogStore gateway (v1)
//!
//! HTTP front end for an append-only audit log kept in a smart contract.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │               LOGSTORE GATEWAY                │
//!   POST /logs        │  ┌────────┐    ┌───────────┐    ┌─────────┐  │
//!   ──────────────────┼─▶│  http  │───▶│ submitter │───▶│ gateway │──┼──▶ JSON-RPC
//!                     │  │ server │    │  + signer │    │ (alloy) │  │    node(s)
//!   GET /logs, /count │  │        │    ├───────────┤    │         │  │
//!   ──────────────────┼─▶│        │───▶│   query   │───▶│         │  │
//!                     │  └────────┘    │ + decoder │    └─────────┘  │
//!                     │                └───────────┘                 │
//!                     │  config · observability · lifecycle          │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use logstore_gateway::config::load_config;
use logstore_gateway::lifecycle::{bootstrap, Shutdown};
use logstore_gateway::observability::{logging, metrics};
use logstore_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "logstore-gateway", version, about = "HTTP gateway for the LogStore contract")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "LOGSTORE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_tracing(&config.observability);

    tracing::info!("logstore-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        chain_id = config.chain.chain_id,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let components = bootstrap(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, components.app_state());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown.trigger_on_signal().await;

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
