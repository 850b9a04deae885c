//! SSZ leaf values for execution payload header fields.

use crate::error::ProofError;
use crate::merkle::{chunk_count, ChunkMerkleizer};
use crate::types::{ExecutionPayloadHeader, HeaderField, MAX_EXTRA_DATA_BYTES};

/// A header field value tagged with its SSZ kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// A 32-byte value that is already its own root.
    Root(&'a [u8; 32]),
    /// A fixed-length byte vector.
    ByteVector(&'a [u8]),
    /// An unsigned 64-bit integer.
    Uint64(u64),
    /// A variable-length byte list bounded by `max_len`.
    ByteList { bytes: &'a [u8], max_len: usize },
}

impl ExecutionPayloadHeader {
    /// Value of `field` with its SSZ kind.
    #[must_use]
    pub fn field_value(&self, field: HeaderField) -> FieldValue<'_> {
        match field {
            HeaderField::ParentHash => FieldValue::Root(&self.parent_hash.0),
            HeaderField::FeeRecipient => FieldValue::ByteVector(self.fee_recipient.as_slice()),
            HeaderField::StateRoot => FieldValue::Root(&self.state_root.0),
            HeaderField::ReceiptsRoot => FieldValue::Root(&self.receipts_root.0),
            HeaderField::LogsBloom => FieldValue::ByteVector(self.logs_bloom.as_slice()),
            HeaderField::PrevRandao => FieldValue::Root(&self.prev_randao.0),
            HeaderField::BlockNumber => FieldValue::Uint64(self.block_number),
            HeaderField::GasLimit => FieldValue::Uint64(self.gas_limit),
            HeaderField::GasUsed => FieldValue::Uint64(self.gas_used),
            HeaderField::Timestamp => FieldValue::Uint64(self.timestamp),
            HeaderField::ExtraData => FieldValue::ByteList {
                bytes: &self.extra_data,
                max_len: MAX_EXTRA_DATA_BYTES,
            },
            HeaderField::BaseFeePerGas => FieldValue::Root(&self.base_fee_per_gas.0),
            HeaderField::BlockHash => FieldValue::Root(&self.block_hash.0),
            HeaderField::TransactionsRoot => FieldValue::Root(&self.transactions_root.0),
            HeaderField::WithdrawalsRoot => FieldValue::Root(&self.withdrawals_root.0),
            HeaderField::BlobGasUsed => FieldValue::Uint64(self.blob_gas_used),
            HeaderField::ExcessBlobGas => FieldValue::Uint64(self.excess_blob_gas),
        }
    }
}

/// Compute the SSZ leaf of a single field value.
///
/// # Errors
/// Returns [`ProofError::EncodingFailure`] if a byte list exceeds its bound.
pub fn hash_field<M: ChunkMerkleizer>(
    merkleizer: &M,
    value: FieldValue<'_>,
) -> Result<[u8; 32], ProofError> {
    match value {
        FieldValue::Root(root) => Ok(*root),
        FieldValue::ByteVector(bytes) => hash_basic_bytes(merkleizer, bytes),
        FieldValue::Uint64(v) => hash_basic_bytes(merkleizer, &v.to_le_bytes()),
        FieldValue::ByteList { bytes, max_len } => hash_byte_list(merkleizer, bytes, max_len),
    }
}

/// Root of a fixed-size value: one padded chunk, or the root of its chunks.
fn hash_basic_bytes<M: ChunkMerkleizer>(merkleizer: &M, bytes: &[u8]) -> Result<[u8; 32], ProofError> {
    merkleizer.pack_and_merkleize(bytes, chunk_count(bytes.len()))
}

/// Root of a `List[byte, max_len]`.
fn hash_byte_list<M: ChunkMerkleizer>(
    merkleizer: &M,
    bytes: &[u8],
    max_len: usize,
) -> Result<[u8; 32], ProofError> {
    if bytes.len() > max_len {
        return Err(ProofError::EncodingFailure(format!(
            "byte list of length {} exceeds its limit of {max_len}",
            bytes.len()
        )));
    }
    let bytes_root = merkleizer.pack_and_merkleize(bytes, chunk_count(max_len))?;
    Ok(merkleizer.mix_in_length(bytes_root, bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::{mix_in_length, Sha256Merkleizer};
    use ssz_rs::prelude::*;

    fn extra_data_root(bytes: &[u8]) -> Result<[u8; 32], ProofError> {
        hash_field(
            &Sha256Merkleizer,
            FieldValue::ByteList { bytes, max_len: MAX_EXTRA_DATA_BYTES },
        )
    }

    #[test]
    fn test_root_passes_through() {
        let root = [0x33u8; 32];
        assert_eq!(hash_field(&Sha256Merkleizer, FieldValue::Root(&root)).unwrap(), root);
    }

    #[test]
    fn test_uint64_is_little_endian_chunk() {
        let leaf = hash_field(&Sha256Merkleizer, FieldValue::Uint64(1000)).unwrap();
        let mut expected = [0u8; 32];
        expected[..8].copy_from_slice(&1000u64.to_le_bytes());
        assert_eq!(leaf, expected);
    }

    #[test]
    fn test_fee_recipient_is_padded() {
        let leaf = hash_field(&Sha256Merkleizer, FieldValue::ByteVector(&[0x02; 20])).unwrap();
        assert_eq!(&leaf[..20], &[0x02; 20]);
        assert_eq!(&leaf[20..], &[0u8; 12]);
    }

    #[test]
    fn test_logs_bloom_matches_ssz_rs() {
        let bloom = vec![0x05u8; 256];
        let expected: [u8; 32] = Vector::<u8, 256>::try_from(bloom.clone())
            .unwrap()
            .hash_tree_root()
            .unwrap()
            .into();
        let leaf = hash_field(&Sha256Merkleizer, FieldValue::ByteVector(&bloom)).unwrap();
        assert_eq!(leaf, expected);
    }

    #[test]
    fn test_extra_data_mix_in_length() {
        for len in [0usize, 1, 16, 32] {
            let value: Vec<u8> = (1..=len as u8).collect();
            let packed = Sha256Merkleizer.pack_and_merkleize(&value, 1).unwrap();
            let expected = mix_in_length(packed, value.len());
            assert_eq!(extra_data_root(&value).unwrap(), expected, "len {len}");
        }
    }

    #[test]
    fn test_extra_data_golden_roots() {
        let cases = [
            (0usize, "f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"),
            (1, "56d8a66fbae0300efba7ec2c531973aaae22e7a2ed6ded081b5b32d07a32780a"),
            (16, "d19fb64b4302bceb859a324b25d4e4ee826ced7375e3ddd01bf6d97ed8c0dd4f"),
            (32, "071e2e4dedf03b7ee8e8e80691d21f12750cd928cc8d5aecf180dd2d7e2727ca"),
        ];
        for (len, expected) in cases {
            let value: Vec<u8> = (1..=len as u8).collect();
            assert_eq!(hex::encode(extra_data_root(&value).unwrap()), expected, "len {len}");
        }
    }

    #[test]
    fn test_extra_data_matches_ssz_rs_list() {
        for len in [0usize, 1, 16, 32] {
            let value: Vec<u8> = (1..=len as u8).collect();
            let expected: [u8; 32] = List::<u8, 32>::try_from(value.clone())
                .unwrap()
                .hash_tree_root()
                .unwrap()
                .into();
            assert_eq!(extra_data_root(&value).unwrap(), expected, "len {len}");
        }
    }

    #[test]
    fn test_extra_data_too_long_is_an_error() {
        let err = extra_data_root(&[0u8; 33]).unwrap_err();
        assert!(matches!(err, ProofError::EncodingFailure(_)));
    }
}
