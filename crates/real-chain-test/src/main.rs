//! Fetch-and-prove against live nodes
//!
//! Reads the finalized execution payload header from a beacon node, builds
//! header proofs for it, and fetches the IBC contract's account proof (and
//! optionally a commitment's storage proof) at that block.

use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::ProviderBuilder;
use alloy::transports::http::reqwest::Url;
use anyhow::{ensure, Context, Result};
use clap::Parser;
use eth_proof_gen::gindex::leaf_proof_index;
use eth_proof_gen::{
    derive_slot_key, ssz_oracle, AlloyProofFetcher, BeaconClient, ExecutionStateProver,
    HeaderField, HeaderProofBuilder,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug, Clone)]
#[command(name = "fetch-and-prove")]
#[command(about = "Build header and state proofs for the finalized block of a live chain")]
struct Args {
    /// Beacon node URL
    #[arg(long, env = "BEACON_URL", default_value = "http://localhost:5052")]
    beacon_url: String,

    /// Execution client JSON-RPC URL
    #[arg(long, env = "EXECUTION_RPC_URL", default_value = "http://localhost:8545")]
    execution_rpc_url: String,

    /// IBC contract address
    #[arg(long, env = "IBC_ADDRESS")]
    ibc_address: Address,

    /// Commitment path (0x-hex) to fetch a storage proof for
    #[arg(long)]
    path: Option<String>,

    /// Snapshot output file
    #[arg(short, long, default_value = "real_chain_snapshot.json")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct RealChainSnapshot {
    description: String,
    beacon_node: String,
    fetched_at: String,
    finalized_epoch: u64,
    finalized_block_root: B256,
    block_number: u64,
    header_root: B256,
    header_proofs: Vec<HeaderFieldProof>,
    account_update: AccountUpdateData,
    state_proof: Option<StateProofData>,
}

#[derive(Debug, Serialize)]
struct HeaderFieldProof {
    field: &'static str,
    generalized_index: u64,
    leaf: B256,
    proof: Vec<B256>,
}

#[derive(Debug, Serialize)]
struct AccountUpdateData {
    ibc_address: Address,
    account_proof: Bytes,
    account_storage_root: B256,
}

#[derive(Debug, Serialize)]
struct StateProofData {
    path: Bytes,
    slot: B256,
    proof: Bytes,
}

async fn fetch_and_prove(args: &Args) -> Result<RealChainSnapshot> {
    let beacon = BeaconClient::new(args.beacon_url.clone());

    tracing::info!("Fetching finalized checkpoint");
    let finality = beacon
        .get_finality_checkpoints()
        .await
        .context("Failed to fetch finality checkpoints")?;
    tracing::info!(
        epoch = finality.finalized_epoch,
        root = %finality.finalized_root,
        "Finalized checkpoint"
    );

    let header = beacon
        .get_execution_payload_header(finality.finalized_root)
        .await
        .context("Failed to fetch execution payload header")?;
    let block_number = header.block_number;
    tracing::info!(block_number, block_hash = %header.block_hash, "Execution payload header");

    let builder = HeaderProofBuilder::new();
    let leaves = builder.leaves(&header)?;
    let header_root = builder.hash_tree_root(&header)?;
    ensure!(
        header_root == ssz_oracle::hash_tree_root(&header)?,
        "header root disagrees with ssz_rs"
    );

    let header_proofs = [HeaderField::StateRoot, HeaderField::BlockNumber]
        .into_iter()
        .map(|field| -> Result<HeaderFieldProof> {
            let proof = builder.build_proof(&header, leaf_proof_index(field))?;
            Ok(HeaderFieldProof {
                field: field.name(),
                generalized_index: field.generalized_index(),
                leaf: B256::from(leaves[field.leaf_index()]),
                proof: proof.into_iter().map(B256::from).collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let rpc_url: Url = args
        .execution_rpc_url
        .parse()
        .with_context(|| format!("invalid execution RPC URL: {}", args.execution_rpc_url))?;
    let provider = ProviderBuilder::new().connect_http(rpc_url);
    let prover = ExecutionStateProver::new(AlloyProofFetcher::new(provider), args.ibc_address);

    tracing::info!(block_number, "Fetching account update");
    let update = prover
        .build_account_update(block_number)
        .await
        .context("Failed to build account update")?;

    let state_proof = match &args.path {
        Some(path) => {
            let path = alloy::hex::decode(path).context("invalid commitment path")?;
            tracing::info!(block_number, "Fetching state proof");
            let proof = prover
                .build_state_proof(&path, block_number)
                .await
                .context("Failed to build state proof")?;
            Some(StateProofData {
                slot: derive_slot_key(&path),
                path: path.into(),
                proof: proof.0,
            })
        }
        None => None,
    };

    Ok(RealChainSnapshot {
        description: "Finalized execution header and IBC contract proofs".to_string(),
        beacon_node: args.beacon_url.clone(),
        fetched_at: chrono::Utc::now().to_rfc3339(),
        finalized_epoch: finality.finalized_epoch,
        finalized_block_root: finality.finalized_root,
        block_number,
        header_root: B256::from(header_root),
        header_proofs,
        account_update: AccountUpdateData {
            ibc_address: args.ibc_address,
            account_proof: update.account_proof,
            account_storage_root: update.account_storage_root,
        },
        state_proof,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::info!(beacon_url = %args.beacon_url, execution_rpc_url = %args.execution_rpc_url, "Using endpoints");

    let snapshot = fetch_and_prove(&args).await?;

    println!("📊 Summary:");
    println!("   Finalized epoch: {}", snapshot.finalized_epoch);
    println!("   Block number: {}", snapshot.block_number);
    println!("   Header root: {}", snapshot.header_root);
    println!("   Storage root: {}", snapshot.account_update.account_storage_root);

    fs::write(&args.output, serde_json::to_string_pretty(&snapshot)?)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("\n💾 Saved snapshot to {}", args.output.display());

    Ok(())
}
