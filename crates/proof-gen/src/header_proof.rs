//! Execution payload header inclusion proofs.
//!
//! The header is hashed as a 32-leaf tree: the 17 field leaves in SSZ order,
//! then zero chunks. A proof for generalized index `g` is the branch of the
//! node at Merkleizer position `g + 1` (see
//! [`MERKLEIZER_POSITION_OFFSET`](crate::gindex::MERKLEIZER_POSITION_OFFSET)).

use crate::error::ProofError;
use crate::field_hasher::hash_field;
use crate::gindex::{merkleizer_position, HEADER_LEAF_COUNT};
use crate::merkle::{ChunkMerkleizer, ChunkTree, Sha256Merkleizer};
use crate::types::{ExecutionPayloadHeader, HeaderField};
use tracing::debug;

/// Sibling hashes ordered from the proven node up to the root.
pub type MerkleProof = Vec<[u8; 32]>;

/// Builds generalized-index proofs over an execution payload header.
#[derive(Debug, Clone, Default)]
pub struct HeaderProofBuilder<M = Sha256Merkleizer> {
    merkleizer: M,
}

impl HeaderProofBuilder<Sha256Merkleizer> {
    /// Builder backed by the SHA-256 Merkleizer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_merkleizer(Sha256Merkleizer)
    }
}

impl<M: ChunkMerkleizer> HeaderProofBuilder<M> {
    /// Builder backed by a custom Merkleizer.
    pub fn with_merkleizer(merkleizer: M) -> Self {
        Self { merkleizer }
    }

    /// The 32 leaves of the header tree.
    ///
    /// # Errors
    /// Returns [`ProofError::EncodingFailure`] if a field cannot be hashed.
    pub fn leaves(&self, header: &ExecutionPayloadHeader) -> Result<Vec<[u8; 32]>, ProofError> {
        let mut leaves = Vec::with_capacity(HEADER_LEAF_COUNT);
        for field in HeaderField::ALL {
            leaves.push(hash_field(&self.merkleizer, header.field_value(field))?);
        }
        leaves.resize(HEADER_LEAF_COUNT, [0u8; 32]);
        Ok(leaves)
    }

    /// SSZ hash tree root of the header.
    ///
    /// # Errors
    /// Returns an error if a field cannot be hashed.
    pub fn hash_tree_root(&self, header: &ExecutionPayloadHeader) -> Result<[u8; 32], ProofError> {
        let leaves = self.leaves(header)?;
        Ok(self.merkleizer.build_tree(&leaves)?.root())
    }

    /// Proof for `generalized_index` within the header tree.
    ///
    /// # Errors
    /// - [`ProofError::EncodingFailure`] if a field cannot be hashed
    /// - [`ProofError::ProofGenerationFailure`] if the index is outside the tree
    pub fn build_proof(
        &self,
        header: &ExecutionPayloadHeader,
        generalized_index: u64,
    ) -> Result<MerkleProof, ProofError> {
        let leaves = self.leaves(header)?;
        self.generate_merkle_proof(&leaves, generalized_index)
    }

    /// Proof for `generalized_index` over an arbitrary leaf sequence.
    ///
    /// # Errors
    /// - [`ProofError::InvalidLeafCount`] if `leaves` is empty or not a power of two
    /// - [`ProofError::ProofGenerationFailure`] if the index is outside the tree
    pub fn generate_merkle_proof(
        &self,
        leaves: &[[u8; 32]],
        generalized_index: u64,
    ) -> Result<MerkleProof, ProofError> {
        if !leaves.len().is_power_of_two() {
            return Err(ProofError::InvalidLeafCount(leaves.len()));
        }
        let tree = self.merkleizer.build_tree(leaves)?;

        let position = merkleizer_position(generalized_index)
            .and_then(|position| usize::try_from(position).ok())
            .ok_or_else(|| {
                ProofError::ProofGenerationFailure(format!(
                    "generalized index {generalized_index} has no tree position"
                ))
            })?;
        let proof = tree.prove(position)?;

        debug!(
            generalized_index,
            position,
            depth = proof.len(),
            "Built header proof"
        );
        Ok(proof)
    }
}
