//! `ssz_rs` mirror of the execution payload header.
//!
//! Independent of the chunk Merkleizer, so roots and branches produced by
//! [`HeaderProofBuilder`](crate::HeaderProofBuilder) can be checked against a
//! reference SSZ implementation.

use crate::error::ProofError;
use crate::types::{ExecutionPayloadHeader, HeaderField};
use ssz_rs::prelude::*;

/// Execution payload header as an `ssz_rs` container.
#[derive(Debug, Clone, Default, PartialEq, Eq, SimpleSerialize)]
pub struct SszExecutionPayloadHeader {
    pub parent_hash: [u8; 32],
    pub fee_recipient: [u8; 20],
    pub state_root: [u8; 32],
    pub receipts_root: [u8; 32],
    pub logs_bloom: Vector<u8, 256>,
    pub prev_randao: [u8; 32],
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: List<u8, 32>,
    /// uint256 in little-endian form; hashes identically to a `U256`
    pub base_fee_per_gas: [u8; 32],
    pub block_hash: [u8; 32],
    pub transactions_root: [u8; 32],
    pub withdrawals_root: [u8; 32],
    pub blob_gas_used: u64,
    pub excess_blob_gas: u64,
}

impl TryFrom<&ExecutionPayloadHeader> for SszExecutionPayloadHeader {
    type Error = ProofError;

    fn try_from(header: &ExecutionPayloadHeader) -> Result<Self, Self::Error> {
        let logs_bloom = Vector::<u8, 256>::try_from(header.logs_bloom.to_vec())
            .map_err(|_| ProofError::EncodingFailure("logs_bloom is not 256 bytes".into()))?;
        let extra_data = List::<u8, 32>::try_from(header.extra_data.to_vec()).map_err(|_| {
            ProofError::EncodingFailure(format!(
                "extra_data of {} bytes exceeds 32",
                header.extra_data.len()
            ))
        })?;

        Ok(Self {
            parent_hash: header.parent_hash.0,
            fee_recipient: header.fee_recipient.0 .0,
            state_root: header.state_root.0,
            receipts_root: header.receipts_root.0,
            logs_bloom,
            prev_randao: header.prev_randao.0,
            block_number: header.block_number,
            gas_limit: header.gas_limit,
            gas_used: header.gas_used,
            timestamp: header.timestamp,
            extra_data,
            base_fee_per_gas: header.base_fee_per_gas.0,
            block_hash: header.block_hash.0,
            transactions_root: header.transactions_root.0,
            withdrawals_root: header.withdrawals_root.0,
            blob_gas_used: header.blob_gas_used,
            excess_blob_gas: header.excess_blob_gas,
        })
    }
}

/// Hash tree root of `header` computed by `ssz_rs`.
///
/// # Errors
/// Returns [`ProofError::EncodingFailure`] if the header does not fit the container.
pub fn hash_tree_root(header: &ExecutionPayloadHeader) -> Result<[u8; 32], ProofError> {
    let container = SszExecutionPayloadHeader::try_from(header)?;
    let root = container
        .hash_tree_root()
        .map_err(|e| ProofError::EncodingFailure(e.to_string()))?;
    Ok(root.into())
}

/// Leaf branch of `field` computed by `ssz_rs`, with its generalized index.
///
/// # Errors
/// Returns an error if the header does not fit the container or `ssz_rs`
/// cannot prove the path.
pub fn prove_field(
    header: &ExecutionPayloadHeader,
    field: HeaderField,
) -> Result<(Vec<[u8; 32]>, usize), ProofError> {
    let container = SszExecutionPayloadHeader::try_from(header)?;
    let path: &[PathElement] = &[field.name().into()];
    let (proof, witness) = container
        .prove(path)
        .map_err(|e| ProofError::ProofGenerationFailure(e.to_string()))?;
    proof
        .verify(witness)
        .map_err(|e| ProofError::ProofGenerationFailure(e.to_string()))?;

    let index = proof.index;
    let branch = proof.branch.into_iter().map(Into::into).collect();
    Ok((branch, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gindex::leaf_proof_index;
    use crate::header_proof::HeaderProofBuilder;

    fn sample_header() -> ExecutionPayloadHeader {
        serde_json::from_str(include_str!("../testdata/execution_payload_header.json")).unwrap()
    }

    #[test]
    fn test_default_header_roots_agree() {
        let header = ExecutionPayloadHeader::default();
        let builder = HeaderProofBuilder::new();
        assert_eq!(hash_tree_root(&header).unwrap(), builder.hash_tree_root(&header).unwrap());
    }

    #[test]
    fn test_field_branches_agree_with_builder() {
        let header = sample_header();
        let builder = HeaderProofBuilder::new();

        for field in HeaderField::ALL {
            let (branch, index) = prove_field(&header, field).unwrap();
            assert_eq!(index as u64, field.generalized_index(), "{}", field.name());

            let ours = builder.build_proof(&header, leaf_proof_index(field)).unwrap();
            assert_eq!(ours, branch, "{}", field.name());
        }
    }

    #[test]
    fn test_oversized_extra_data_rejected() {
        let mut header = sample_header();
        header.extra_data = vec![1u8; 40].into();
        assert!(matches!(
            SszExecutionPayloadHeader::try_from(&header),
            Err(ProofError::EncodingFailure(_))
        ));
    }
}
