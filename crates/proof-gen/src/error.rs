//! Errors surfaced by proof construction.

use crate::execution_client::ProofFetchError;
use thiserror::Error;

/// Errors that can occur while building header proofs or execution state proofs.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The leaf sequence handed to the Merkleizer is empty or not a power of two.
    #[error("leaves length must be a non-zero power of 2: actual={0}")]
    InvalidLeafCount(usize),

    /// The Merkleizer cannot produce a branch for the requested position.
    #[error("proof generation failed: {0}")]
    ProofGenerationFailure(String),

    /// The execution client's proof query failed; the transport error is kept as-is.
    #[error("eth_getProof failed: {0}")]
    RpcFailure(#[from] ProofFetchError),

    /// An intermediate value could not be encoded or hashed.
    #[error("encoding failed: {0}")]
    EncodingFailure(String),
}
