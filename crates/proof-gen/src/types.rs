//! Proof input and output types.
//!
//! `ExecutionPayloadHeader` (de)serializes from the beacon API JSON form:
//! byte fields are 0x-hex, integers are decimal strings.

use alloy::primitives::{Address, Bloom, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Maximum length of `extra_data` in bytes.
pub const MAX_EXTRA_DATA_BYTES: usize = 32;

/// Number of fields in the Deneb/Electra execution payload header.
pub const EXECUTION_PAYLOAD_HEADER_FIELD_COUNT: usize = 17;

/// Execution payload header as committed in the beacon block body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPayloadHeader {
    pub parent_hash: B256,
    pub fee_recipient: Address,
    pub state_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    pub prev_randao: B256,
    #[serde(with = "quoted_u64")]
    pub block_number: u64,
    #[serde(with = "quoted_u64")]
    pub gas_limit: u64,
    #[serde(with = "quoted_u64")]
    pub gas_used: u64,
    #[serde(with = "quoted_u64")]
    pub timestamp: u64,
    pub extra_data: Bytes,
    /// Little-endian uint256, already in its SSZ leaf form
    #[serde(with = "quoted_u256_le")]
    pub base_fee_per_gas: B256,
    pub block_hash: B256,
    pub transactions_root: B256,
    pub withdrawals_root: B256,
    #[serde(with = "quoted_u64")]
    pub blob_gas_used: u64,
    #[serde(with = "quoted_u64")]
    pub excess_blob_gas: u64,
}

/// Fields of [`ExecutionPayloadHeader`] in SSZ order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    ParentHash,
    FeeRecipient,
    StateRoot,
    ReceiptsRoot,
    LogsBloom,
    PrevRandao,
    BlockNumber,
    GasLimit,
    GasUsed,
    Timestamp,
    ExtraData,
    BaseFeePerGas,
    BlockHash,
    TransactionsRoot,
    WithdrawalsRoot,
    BlobGasUsed,
    ExcessBlobGas,
}

impl HeaderField {
    /// All fields, in leaf order.
    pub const ALL: [HeaderField; EXECUTION_PAYLOAD_HEADER_FIELD_COUNT] = [
        Self::ParentHash,
        Self::FeeRecipient,
        Self::StateRoot,
        Self::ReceiptsRoot,
        Self::LogsBloom,
        Self::PrevRandao,
        Self::BlockNumber,
        Self::GasLimit,
        Self::GasUsed,
        Self::Timestamp,
        Self::ExtraData,
        Self::BaseFeePerGas,
        Self::BlockHash,
        Self::TransactionsRoot,
        Self::WithdrawalsRoot,
        Self::BlobGasUsed,
        Self::ExcessBlobGas,
    ];

    /// Position of the field's leaf (0-indexed).
    #[must_use]
    pub const fn leaf_index(self) -> usize {
        self as usize
    }

    /// Generalized index of the field's leaf within the header tree.
    #[must_use]
    pub const fn generalized_index(self) -> u64 {
        crate::gindex::HEADER_BASE_GINDEX + self as u64
    }

    /// Field name as it appears in the beacon API.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ParentHash => "parent_hash",
            Self::FeeRecipient => "fee_recipient",
            Self::StateRoot => "state_root",
            Self::ReceiptsRoot => "receipts_root",
            Self::LogsBloom => "logs_bloom",
            Self::PrevRandao => "prev_randao",
            Self::BlockNumber => "block_number",
            Self::GasLimit => "gas_limit",
            Self::GasUsed => "gas_used",
            Self::Timestamp => "timestamp",
            Self::ExtraData => "extra_data",
            Self::BaseFeePerGas => "base_fee_per_gas",
            Self::BlockHash => "block_hash",
            Self::TransactionsRoot => "transactions_root",
            Self::WithdrawalsRoot => "withdrawals_root",
            Self::BlobGasUsed => "blob_gas_used",
            Self::ExcessBlobGas => "excess_blob_gas",
        }
    }
}

/// Account proof and storage root of the IBC contract at a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// RLP-encoded list of account trie nodes
    pub account_proof: Bytes,
    /// Storage trie root of the account
    pub account_storage_root: B256,
}

/// RLP-encoded storage proof for a single slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateProof(pub Bytes);

impl StateProof {
    /// Raw RLP bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Checkpoint for finality (JSON-serializable, not SSZ)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityCheckpoints {
    /// Previous justified checkpoint epoch
    pub previous_justified_epoch: u64,
    /// Current justified checkpoint epoch
    pub current_justified_epoch: u64,
    /// Finalized checkpoint epoch
    pub finalized_epoch: u64,
    /// Finalized checkpoint root
    pub finalized_root: B256,
}

/// Decimal-string integers, as the beacon API encodes them
pub(crate) mod quoted_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Decimal-string uint256 stored as 32 little-endian bytes
mod quoted_u256_le {
    use alloy::primitives::{B256, U256};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &B256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&U256::from_le_bytes(value.0).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<B256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value = U256::from_str_radix(&s, 10).map_err(serde::de::Error::custom)?;
        Ok(B256::from(value.to_le_bytes::<32>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_JSON: &str = include_str!("../testdata/execution_payload_header.json");

    #[test]
    fn test_header_from_beacon_api_json() {
        let header: ExecutionPayloadHeader = serde_json::from_str(HEADER_JSON).unwrap();
        assert_eq!(header.parent_hash, B256::repeat_byte(0x01));
        assert_eq!(header.fee_recipient, Address::repeat_byte(0x02));
        assert_eq!(header.block_number, 1000);
        assert_eq!(header.gas_limit, 30_000_000);
        assert_eq!(header.extra_data.as_ref(), &[0x07, 0x08, 0x09, 0x0a]);
        assert_eq!(header.blob_gas_used, 131_072);

        let mut base_fee = [0u8; 32];
        base_fee[0] = 7;
        assert_eq!(header.base_fee_per_gas, B256::from(base_fee));
    }

    #[test]
    fn test_header_json_roundtrip() {
        let header: ExecutionPayloadHeader = serde_json::from_str(HEADER_JSON).unwrap();
        let json = serde_json::to_string(&header).unwrap();
        let decoded: ExecutionPayloadHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, header);
        assert!(json.contains(r#""base_fee_per_gas":"7""#));
    }

    #[test]
    fn test_header_rejects_unquoted_garbage() {
        let bad = HEADER_JSON.replace(r#""block_number": "1000""#, r#""block_number": "ten""#);
        assert!(serde_json::from_str::<ExecutionPayloadHeader>(&bad).is_err());
    }

    #[test]
    fn test_header_field_indices() {
        for (i, field) in HeaderField::ALL.iter().enumerate() {
            assert_eq!(field.leaf_index(), i);
            assert_eq!(field.generalized_index(), 32 + i as u64);
        }
        assert_eq!(HeaderField::StateRoot.generalized_index(), 34);
        assert_eq!(HeaderField::BlockNumber.generalized_index(), 38);
    }
}
