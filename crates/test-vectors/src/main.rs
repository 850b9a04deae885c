//! Test Vector Generator
//!
//! Generates JSON golden vectors for execution payload header proofs. Every
//! leaf branch is cross-checked against `ssz_rs` before it is written.

use alloy::primitives::B256;
use anyhow::{ensure, Context, Result};
use clap::Parser;
use eth_proof_gen::gindex::{body_gindex, leaf_proof_index, merkleizer_position};
use eth_proof_gen::{ssz_oracle, ExecutionPayloadHeader, HeaderField, HeaderProofBuilder};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SAMPLE_HEADER_JSON: &str = include_str!("../../proof-gen/testdata/execution_payload_header.json");

/// Generalized indices of internal nodes included as extra vectors.
const NODE_GINDICES: [u64; 3] = [1, 2, 15];

#[derive(Parser, Debug)]
#[command(name = "generate-test-vectors")]
#[command(about = "Generate golden vectors for execution payload header proofs")]
struct Args {
    /// Output directory for test vectors
    #[arg(short, long, default_value = "test-vectors")]
    output: PathBuf,

    /// Execution payload header in beacon API JSON (defaults to the built-in sample)
    #[arg(long)]
    header: Option<PathBuf>,
}

/// Test vector file format
#[derive(Debug, Serialize)]
struct TestVectorFile {
    /// Header the proofs are built over
    header: ExecutionPayloadHeader,
    /// SSZ hash tree root of the header
    root: B256,
    /// One leaf proof per header field
    fields: Vec<FieldVector>,
    /// Proofs requested for arbitrary generalized indices
    nodes: Vec<NodeVector>,
}

/// Proof of a single header field leaf
#[derive(Debug, Serialize)]
struct FieldVector {
    field: &'static str,
    /// Consensus gindex of the leaf in the header
    generalized_index: u64,
    /// Index handed to the proof builder for this leaf
    proof_index: u64,
    /// Consensus gindex of the leaf from the beacon block body root
    body_generalized_index: u64,
    leaf: B256,
    proof: Vec<B256>,
}

/// Proof returned for a requested generalized index
#[derive(Debug, Serialize)]
struct NodeVector {
    generalized_index: u64,
    merkleizer_position: u64,
    proof: Vec<B256>,
}

fn to_b256(proof: Vec<[u8; 32]>) -> Vec<B256> {
    proof.into_iter().map(B256::from).collect()
}

fn build_vectors(header: ExecutionPayloadHeader) -> Result<TestVectorFile> {
    let builder = HeaderProofBuilder::new();
    let leaves = builder.leaves(&header)?;
    let root = builder.hash_tree_root(&header)?;

    let oracle_root = ssz_oracle::hash_tree_root(&header)?;
    ensure!(
        root == oracle_root,
        "header root {} disagrees with ssz_rs root {}",
        B256::from(root),
        B256::from(oracle_root)
    );

    let mut fields = Vec::with_capacity(HeaderField::ALL.len());
    for field in HeaderField::ALL {
        let proof = builder.build_proof(&header, leaf_proof_index(field))?;

        let (expected, _) = ssz_oracle::prove_field(&header, field)?;
        ensure!(proof == expected, "{} proof disagrees with ssz_rs", field.name());

        fields.push(FieldVector {
            field: field.name(),
            generalized_index: field.generalized_index(),
            proof_index: leaf_proof_index(field),
            body_generalized_index: body_gindex(field),
            leaf: B256::from(leaves[field.leaf_index()]),
            proof: to_b256(proof),
        });
    }

    let nodes = NODE_GINDICES
        .iter()
        .map(|&g| -> Result<NodeVector> {
            Ok(NodeVector {
                generalized_index: g,
                merkleizer_position: merkleizer_position(g)
                    .with_context(|| format!("generalized index {g} has no tree position"))?,
                proof: to_b256(builder.build_proof(&header, g)?),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TestVectorFile {
        header,
        root: B256::from(root),
        fields,
        nodes,
    })
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    tracing::info!(
        output = %args.output.display(),
        header = ?args.header,
        "Generating test vectors"
    );

    let header_json = match &args.header {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => SAMPLE_HEADER_JSON.to_string(),
    };
    let header: ExecutionPayloadHeader =
        serde_json::from_str(&header_json).context("invalid execution payload header")?;

    let vectors = build_vectors(header)?;

    // Ensure output directory exists
    std::fs::create_dir_all(&args.output)?;

    let output_path = args.output.join("header_proof_vectors.json");
    let json = serde_json::to_string_pretty(&vectors)?;
    std::fs::write(&output_path, json)?;

    tracing::info!(
        path = %output_path.display(),
        root = %vectors.root,
        fields = vectors.fields.len(),
        "Wrote test vectors"
    );

    Ok(())
}
