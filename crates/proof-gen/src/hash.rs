//! Hash primitives.
//!
//! Storage slot derivation uses Keccak-256 (the EVM's hash); SSZ Merkleization
//! uses SHA-256.

use sha2::Digest;

/// A deterministic function from bytes to a 32-byte digest.
pub trait HashPrimitive {
    /// Hash `data` into a 32-byte digest.
    fn hash(&self, data: &[u8]) -> [u8; 32];
}

/// Keccak-256, as used for EVM storage layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256;

impl HashPrimitive for Keccak256 {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        alloy::primitives::keccak256(data).0
    }
}

/// SHA-256, as used by SSZ hash tree roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

impl HashPrimitive for Sha256 {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        sha2::Sha256::digest(data).into()
    }
}

/// SHA-256 hash of two 32-byte nodes
pub(crate) fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = sha2::Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}
