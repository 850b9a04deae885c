//! # Proof Generation Library
//!
//! Proof construction for relaying Ethereum execution state to a light client:
//! - SSZ inclusion proofs for execution payload header fields, by generalized index
//! - storage slot keys for IBC commitment paths
//! - account updates and storage proofs from `eth_getProof`

pub mod beacon_client;
pub mod error;
pub mod execution_client;
pub mod field_hasher;
pub mod gindex;
pub mod hash;
pub mod header_proof;
pub mod merkle;
#[cfg(any(test, feature = "ssz-oracle"))]
pub mod ssz_oracle;
pub mod state_prover;
pub mod storage_key;
pub mod types;

pub use beacon_client::{BeaconClient, BeaconClientError};
pub use error::ProofError;
pub use execution_client::{AccountProof, AlloyProofFetcher, ProofFetchError, ProofFetcher};
pub use header_proof::{HeaderProofBuilder, MerkleProof};
pub use merkle::{ChunkMerkleizer, ChunkTree, Sha256Merkleizer};
pub use state_prover::ExecutionStateProver;
pub use storage_key::{derive_slot_key, encode_slot_key};
pub use types::*;
