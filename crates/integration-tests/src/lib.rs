//! Shared fixtures for the workspace integration tests.

use alloy::primitives::{Address, Bytes, B256};
use alloy::transports::TransportErrorKind;
use eth_proof_gen::hash::{HashPrimitive, Sha256};
use eth_proof_gen::{AccountProof, ExecutionPayloadHeader, ProofFetchError, ProofFetcher};
use parking_lot::Mutex;

/// Sample header in beacon API JSON form.
pub const SAMPLE_HEADER_JSON: &str =
    include_str!("../../proof-gen/testdata/execution_payload_header.json");

/// Hash tree root of [`SAMPLE_HEADER_JSON`].
pub const SAMPLE_HEADER_ROOT: &str =
    "617a6ba4635dda07cbb173353bc40df76f7e5e97c72cf6ed192a1a87f5614120";

/// The sample execution payload header.
///
/// # Panics
/// Never for the bundled sample.
#[must_use]
pub fn sample_header() -> ExecutionPayloadHeader {
    serde_json::from_str(SAMPLE_HEADER_JSON).expect("bundled sample header is valid")
}

/// Recompute a root from `node` at tree `position` and its sibling branch.
#[must_use]
pub fn fold_branch(node: [u8; 32], position: u64, branch: &[[u8; 32]]) -> [u8; 32] {
    let mut current = node;
    let mut pos = position;
    for sibling in branch {
        let mut preimage = [0u8; 64];
        if pos & 1 == 0 {
            preimage[..32].copy_from_slice(&current);
            preimage[32..].copy_from_slice(sibling);
        } else {
            preimage[..32].copy_from_slice(sibling);
            preimage[32..].copy_from_slice(&current);
        }
        current = Sha256.hash(&preimage);
        pos /= 2;
    }
    current
}

/// A proof query seen by [`RecordingFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofQuery {
    pub address: Address,
    pub storage_keys: Vec<String>,
    pub block_number: u64,
}

/// Fetcher that answers every query from the block number and records it.
///
/// The storage hash is the block number repeated, and each storage key gets
/// a one-node proof holding the key's first byte, so responses can be traced
/// back to their query. Blocks listed in `failing_blocks` fail with a
/// transport error.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    failing_blocks: Vec<u64>,
    queries: Mutex<Vec<ProofQuery>>,
}

impl RecordingFetcher {
    /// Fetcher that fails for the given blocks.
    #[must_use]
    pub fn failing_at(blocks: &[u64]) -> Self {
        Self {
            failing_blocks: blocks.to_vec(),
            queries: Mutex::default(),
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<ProofQuery> {
        self.queries.lock().clone()
    }

    /// Storage hash answered for `block_number`.
    #[must_use]
    pub fn storage_hash_for(block_number: u64) -> B256 {
        B256::left_padding_from(&block_number.to_be_bytes())
    }
}

impl ProofFetcher for RecordingFetcher {
    async fn get_proof(
        &self,
        address: Address,
        storage_keys: Vec<String>,
        block_number: u64,
    ) -> Result<AccountProof, ProofFetchError> {
        self.queries.lock().push(ProofQuery {
            address,
            storage_keys: storage_keys.clone(),
            block_number,
        });

        if self.failing_blocks.contains(&block_number) {
            return Err(TransportErrorKind::custom_str("upstream unavailable").into());
        }

        let storage_proof_rlp = storage_keys
            .iter()
            .map(|key| {
                let first = key
                    .strip_prefix("0x")
                    .and_then(|digits| u8::from_str_radix(digits.get(..2)?, 16).ok())
                    .unwrap_or_default();
                Bytes::from(vec![0xc1, first])
            })
            .collect();

        Ok(AccountProof {
            account_proof_rlp: Bytes::from(block_number.to_be_bytes().to_vec()),
            storage_hash: Self::storage_hash_for(block_number),
            storage_proof_rlp,
        })
    }
}
