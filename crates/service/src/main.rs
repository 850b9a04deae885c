//! Ethereum Proof Service
//!
//! REST API serving execution payload header proofs and IBC contract state
//! proofs to a relayer.

mod api;
mod state;
mod telemetry;

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use clap::Parser;
use eth_proof_gen::{AlloyProofFetcher, ExecutionStateProver};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "eth-proof-service")]
#[command(about = "Proof API for relaying Ethereum execution state over IBC")]
struct Args {
    /// Execution client JSON-RPC URL
    #[arg(long, env = "EXECUTION_RPC_URL", default_value = "http://localhost:8545")]
    execution_rpc_url: String,

    /// IBC contract address
    #[arg(long, env = "IBC_ADDRESS")]
    ibc_address: Address,

    /// API listen address
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Metrics listen address
    #[arg(long, env = "METRICS_LISTEN", default_value = "0.0.0.0:9090")]
    metrics_listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    tracing::info!("Starting Ethereum proof service");
    tracing::info!(execution_rpc_url = %args.execution_rpc_url, "Execution client");
    tracing::info!(ibc_address = %args.ibc_address, "IBC contract");
    tracing::info!(listen = %args.listen, "API server");

    telemetry::init_prometheus(args.metrics_listen).context("failed to start metrics exporter")?;

    let rpc_url: Url = args
        .execution_rpc_url
        .parse()
        .with_context(|| format!("invalid execution RPC URL: {}", args.execution_rpc_url))?;
    let provider = ProviderBuilder::new().connect_http(rpc_url);
    let prover = ExecutionStateProver::new(AlloyProofFetcher::new(provider), args.ibc_address);

    // Initialize application state
    let app_state = state::AppState::new(prover);

    // Start API server
    let api_handle = tokio::spawn(api::run_server(args.listen.clone(), app_state));

    // Wait for shutdown
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
        result = api_handle => {
            match result {
                Ok(Err(e)) => tracing::error!(error = %e, "API server error"),
                Err(e) => tracing::error!(error = %e, "API server task failed"),
                Ok(Ok(())) => {}
            }
        }
    }

    Ok(())
}
