//! Storage slot keys for IBC commitment paths.
//!
//! The IBC contract keeps commitments in a mapping at slot 0, so the slot of
//! `path` is `keccak256(keccak256(path) ++ uint256(0))`.

use crate::error::ProofError;
use crate::hash::{HashPrimitive, Keccak256};
use alloy::primitives::B256;

/// Storage slot of the commitments mapping in the IBC contract.
const COMMITMENTS_MAPPING_SLOT: [u8; 32] = [0u8; 32];

/// Slot key of `path` using Keccak-256.
#[must_use]
pub fn derive_slot_key(path: &[u8]) -> B256 {
    derive_slot_key_with(&Keccak256, path)
}

/// Slot key of `path` using an arbitrary hash primitive.
pub fn derive_slot_key_with<H: HashPrimitive>(hasher: &H, path: &[u8]) -> B256 {
    let path_hash = hasher.hash(path);

    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(&path_hash);
    preimage[32..].copy_from_slice(&COMMITMENTS_MAPPING_SLOT);

    B256::from(hasher.hash(&preimage))
}

/// Text form of a slot key as `eth_getProof` takes it: `0x` and 64 lowercase hex digits.
///
/// # Errors
/// Returns [`ProofError::EncodingFailure`] if the key cannot be hex-encoded.
pub fn encode_slot_key(key: &B256) -> Result<String, ProofError> {
    let mut digits = [0u8; 64];
    hex::encode_to_slice(key.as_slice(), &mut digits)
        .map_err(|e| ProofError::EncodingFailure(format!("slot key: {e}")))?;
    let digits = std::str::from_utf8(&digits)
        .map_err(|e| ProofError::EncodingFailure(format!("slot key: {e}")))?;
    Ok(format!("0x{digits}"))
}
