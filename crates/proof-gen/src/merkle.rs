//! Chunk Merkleization
//!
//! Binary SHA-256 Merkle trees over 32-byte chunks, plus the SSZ helpers
//! needed to hash basic values and byte lists:
//! - `pack_and_merkleize`: right-pad bytes into chunks and merkleize them
//!   against a chunk limit, using precomputed zero hashes for empty subtrees
//! - `mix_in_length`: `hash(root, length_as_le_bytes32)`
//!
//! Tree positions use the generalized index numbering: root = 1, the
//! children of `i` are `2i` and `2i + 1`.

use crate::error::ProofError;
use crate::hash::hash_pair;

/// Size of an SSZ chunk in bytes.
pub const BYTES_PER_CHUNK: usize = 32;

/// A built Merkle tree that can produce branches for its nodes.
pub trait ChunkTree {
    /// Root of the tree.
    fn root(&self) -> [u8; 32];

    /// Sibling hashes from the node at `position` up to the root.
    ///
    /// # Errors
    /// Returns [`ProofError::ProofGenerationFailure`] if `position` is not a
    /// node of this tree.
    fn prove(&self, position: usize) -> Result<Vec<[u8; 32]>, ProofError>;
}

/// Builds chunk trees and hashes SSZ byte sequences.
pub trait ChunkMerkleizer {
    /// Tree type returned by [`ChunkMerkleizer::build_tree`].
    type Tree: ChunkTree;

    /// Build a tree over `chunks`, whose count must be a non-zero power of two.
    ///
    /// # Errors
    /// Returns [`ProofError::InvalidLeafCount`] for any other count.
    fn build_tree(&self, chunks: &[[u8; 32]]) -> Result<Self::Tree, ProofError>;

    /// Pack `bytes` into 32-byte chunks and merkleize them with room for
    /// `max_chunks` chunks.
    ///
    /// # Errors
    /// Returns [`ProofError::EncodingFailure`] if `bytes` needs more than
    /// `max_chunks` chunks.
    fn pack_and_merkleize(&self, bytes: &[u8], max_chunks: usize) -> Result<[u8; 32], ProofError>;

    /// Mix `length` into `root` as SSZ does for lists.
    fn mix_in_length(&self, root: [u8; 32], length: usize) -> [u8; 32];
}

/// SHA-256 Merkleizer following the SSZ specification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Merkleizer;

/// Fully materialized tree, stored bottom-up: `layers[0]` are the leaves and
/// the last layer holds the root.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    layers: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Tree depth (`log2(leaf_count)`).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }
}

impl ChunkTree for MerkleTree {
    fn root(&self) -> [u8; 32] {
        self.layers[self.depth()][0]
    }

    fn prove(&self, position: usize) -> Result<Vec<[u8; 32]>, ProofError> {
        let max_position = 2 * self.leaf_count();
        if position == 0 || position >= max_position {
            return Err(ProofError::ProofGenerationFailure(format!(
                "position {position} out of range for a tree of {} leaves (valid: 1..{max_position})",
                self.leaf_count()
            )));
        }

        let level_from_root = position.ilog2() as usize;
        let mut layer = self.depth() - level_from_root;
        let mut index = position - (1 << level_from_root);

        let mut branch = Vec::with_capacity(level_from_root);
        while layer < self.depth() {
            branch.push(self.layers[layer][index ^ 1]);
            index /= 2;
            layer += 1;
        }
        Ok(branch)
    }
}

impl ChunkMerkleizer for Sha256Merkleizer {
    type Tree = MerkleTree;

    fn build_tree(&self, chunks: &[[u8; 32]]) -> Result<MerkleTree, ProofError> {
        if !chunks.len().is_power_of_two() {
            return Err(ProofError::InvalidLeafCount(chunks.len()));
        }

        let mut layers = vec![chunks.to_vec()];
        while layers[layers.len() - 1].len() > 1 {
            let next = layers[layers.len() - 1]
                .chunks_exact(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
            layers.push(next);
        }
        Ok(MerkleTree { layers })
    }

    fn pack_and_merkleize(&self, bytes: &[u8], max_chunks: usize) -> Result<[u8; 32], ProofError> {
        let chunks = pack(bytes);
        if chunks.len() > max_chunks.max(1) {
            return Err(ProofError::EncodingFailure(format!(
                "{} bytes need {} chunks, limit is {max_chunks}",
                bytes.len(),
                chunks.len()
            )));
        }
        let depth = chunk_depth(max_chunks);
        let zh = zero_hashes(depth);
        Ok(compute_subtree_root(&chunks, 0, depth, &zh))
    }

    fn mix_in_length(&self, root: [u8; 32], length: usize) -> [u8; 32] {
        mix_in_length(root, length)
    }
}

/// Mix in the length for a List's Merkle root.
/// `list_root = hash(data_root, length_as_le_bytes32)`
#[must_use]
pub fn mix_in_length(data_root: [u8; 32], length: usize) -> [u8; 32] {
    let mut length_bytes = [0u8; 32];
    length_bytes[..8].copy_from_slice(&(length as u64).to_le_bytes());
    hash_pair(&data_root, &length_bytes)
}

/// Number of chunks needed to hold `len` bytes.
#[must_use]
pub const fn chunk_count(len: usize) -> usize {
    len.div_ceil(BYTES_PER_CHUNK)
}

/// Right-pad `bytes` with zeros into 32-byte chunks. Empty input packs to no chunks.
fn pack(bytes: &[u8]) -> Vec<[u8; 32]> {
    bytes
        .chunks(BYTES_PER_CHUNK)
        .map(|chunk| {
            let mut padded = [0u8; 32];
            padded[..chunk.len()].copy_from_slice(chunk);
            padded
        })
        .collect()
}

/// Depth of a tree with room for `max_chunks` leaves.
fn chunk_depth(max_chunks: usize) -> usize {
    max_chunks.max(1).next_power_of_two().trailing_zeros() as usize
}

/// `zh[0]` is the zero chunk, `zh[i] = hash(zh[i-1], zh[i-1])`.
fn zero_hashes(depth: usize) -> Vec<[u8; 32]> {
    let mut hashes = vec![[0u8; 32]; depth + 1];
    for i in 1..=depth {
        hashes[i] = hash_pair(&hashes[i - 1], &hashes[i - 1]);
    }
    hashes
}

/// Root of the subtree of `depth` whose leftmost leaf is `start`.
/// Leaves past the end of `chunks` are zero.
fn compute_subtree_root(
    chunks: &[[u8; 32]],
    start: usize,
    depth: usize,
    zh: &[[u8; 32]],
) -> [u8; 32] {
    if start >= chunks.len() {
        return zh[depth];
    }
    if depth == 0 {
        return chunks[start];
    }
    let half = 1usize << (depth - 1);
    let left = compute_subtree_root(chunks, start, depth - 1, zh);
    let right = compute_subtree_root(chunks, start + half, depth - 1, zh);
    hash_pair(&left, &right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssz_rs::prelude::*;

    fn leaves(n: u8) -> Vec<[u8; 32]> {
        (1..=n).map(|i| [i; 32]).collect()
    }

    #[test]
    fn test_zero_hashes() {
        let zh = zero_hashes(2);
        assert_eq!(zh[0], [0u8; 32]);
        assert_eq!(zh[1], hash_pair(&[0u8; 32], &[0u8; 32]));
        assert_eq!(zh[2], hash_pair(&zh[1], &zh[1]));
    }

    #[test]
    fn test_build_tree_rejects_bad_counts() {
        for n in [0usize, 3, 5, 6, 7, 31, 33] {
            let chunks = vec![[0u8; 32]; n];
            let err = Sha256Merkleizer.build_tree(&chunks).unwrap_err();
            assert!(matches!(err, ProofError::InvalidLeafCount(c) if c == n), "count {n}");
        }
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = Sha256Merkleizer.build_tree(&[[42u8; 32]]).unwrap();
        assert_eq!(tree.root(), [42u8; 32]);
        assert!(tree.prove(1).unwrap().is_empty());
        assert!(tree.prove(2).is_err());
    }

    #[test]
    fn test_prove_two_leaves() {
        let tree = Sha256Merkleizer.build_tree(&leaves(2)).unwrap();
        assert_eq!(tree.root(), hash_pair(&[1u8; 32], &[2u8; 32]));
        assert_eq!(tree.prove(2).unwrap(), vec![[2u8; 32]]);
        assert_eq!(tree.prove(3).unwrap(), vec![[1u8; 32]]);
    }

    #[test]
    fn test_prove_internal_node() {
        let tree = Sha256Merkleizer.build_tree(&leaves(4)).unwrap();
        // node 3 covers leaves 2 and 3; its sibling is node 2 (leaves 0 and 1)
        let branch = tree.prove(3).unwrap();
        assert_eq!(branch, vec![hash_pair(&[1u8; 32], &[2u8; 32])]);
    }

    #[test]
    fn test_prove_out_of_range() {
        let tree = Sha256Merkleizer.build_tree(&leaves(4)).unwrap();
        assert!(matches!(tree.prove(0), Err(ProofError::ProofGenerationFailure(_))));
        assert!(matches!(tree.prove(8), Err(ProofError::ProofGenerationFailure(_))));
        assert_eq!(tree.prove(7).unwrap().len(), 2);
    }

    #[test]
    fn test_verify_proof_with_ssz_rs() {
        let chunks = leaves(8);
        let tree = Sha256Merkleizer.build_tree(&chunks).unwrap();

        let root_node = Node::try_from(tree.root().as_slice()).unwrap();
        for (i, leaf) in chunks.iter().enumerate() {
            let gindex = 8 + i;
            let branch: Vec<Node> = tree
                .prove(gindex)
                .unwrap()
                .iter()
                .map(|b| Node::try_from(b.as_slice()).unwrap())
                .collect();
            let leaf_node = Node::try_from(leaf.as_slice()).unwrap();
            ssz_rs::proofs::is_valid_merkle_branch_for_generalized_index(
                leaf_node, &branch, gindex, root_node,
            )
            .unwrap_or_else(|e| panic!("leaf {i} proof failed: {e}"));
        }
    }

    #[test]
    fn test_pack_and_merkleize_short_value_is_padded_chunk() {
        let root = Sha256Merkleizer.pack_and_merkleize(&[0xab; 20], 1).unwrap();
        let mut expected = [0u8; 32];
        expected[..20].copy_from_slice(&[0xab; 20]);
        assert_eq!(root, expected);
    }

    #[test]
    fn test_pack_and_merkleize_empty() {
        assert_eq!(Sha256Merkleizer.pack_and_merkleize(&[], 1).unwrap(), [0u8; 32]);
        assert_eq!(
            Sha256Merkleizer.pack_and_merkleize(&[], 4).unwrap(),
            zero_hashes(2)[2]
        );
    }

    #[test]
    fn test_pack_and_merkleize_matches_ssz_rs_vector() {
        let bytes = vec![0x05u8; 256];
        let expected: [u8; 32] = Vector::<u8, 256>::try_from(bytes.clone())
            .unwrap()
            .hash_tree_root()
            .unwrap()
            .into();
        let root = Sha256Merkleizer
            .pack_and_merkleize(&bytes, chunk_count(bytes.len()))
            .unwrap();
        assert_eq!(root, expected);
    }

    #[test]
    fn test_pack_and_merkleize_over_limit() {
        let err = Sha256Merkleizer.pack_and_merkleize(&[1u8; 33], 1).unwrap_err();
        assert!(matches!(err, ProofError::EncodingFailure(_)));
    }

    #[test]
    fn test_mix_in_length_matches_ssz_rs_list() {
        let bytes = vec![7u8, 8, 9];
        let expected: [u8; 32] = List::<u8, 32>::try_from(bytes.clone())
            .unwrap()
            .hash_tree_root()
            .unwrap()
            .into();
        let data_root = Sha256Merkleizer.pack_and_merkleize(&bytes, 1).unwrap();
        assert_eq!(Sha256Merkleizer.mix_in_length(data_root, bytes.len()), expected);
    }
}
