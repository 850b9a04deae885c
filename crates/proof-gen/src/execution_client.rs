//! Execution client proof capability.
//!
//! [`ProofFetcher`] is the only seam through which the prover reaches the
//! execution layer. [`AlloyProofFetcher`] implements it with a JSON-RPC
//! `eth_getProof` call and RLP-encodes the returned trie node lists.

use std::future::Future;
use std::str::FromStr;

use alloy::primitives::{Address, Bytes, StorageKey, B256};
use alloy::providers::Provider;
use alloy::rpc::types::EIP1186AccountProofResponse;
use alloy::transports::TransportError;
use thiserror::Error;
use tracing::{debug, instrument};

const RPC_METHOD_GET_PROOF: &str = "eth_getProof";

/// Errors returned by a [`ProofFetcher`].
#[derive(Error, Debug)]
pub enum ProofFetchError {
    #[error("provider error: {0}")]
    Transport(#[from] TransportError),

    #[error("parse error: {0}")]
    ParseError(String),
}

/// Account and storage proofs of one account at one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountProof {
    /// RLP list of the account trie nodes, each node embedded as an RLP byte
    /// string holding its raw encoding (`alloy_rlp::encode(&Vec<Bytes>)`).
    /// Decode as `Vec<Bytes>`, then decode each node on its own.
    pub account_proof_rlp: Bytes,
    /// Storage trie root of the account
    pub storage_hash: B256,
    /// One node list per requested storage key, in request order, encoded
    /// the same way as `account_proof_rlp`
    pub storage_proof_rlp: Vec<Bytes>,
}

/// Capability to fetch `eth_getProof` results.
pub trait ProofFetcher {
    /// Fetch the proof of `address` and `storage_keys` (0x-hex slot keys) at `block_number`.
    fn get_proof(
        &self,
        address: Address,
        storage_keys: Vec<String>,
        block_number: u64,
    ) -> impl Future<Output = Result<AccountProof, ProofFetchError>> + Send;
}

/// [`ProofFetcher`] backed by an alloy provider.
#[derive(Debug, Clone)]
pub struct AlloyProofFetcher<P> {
    provider: P,
}

impl<P: Provider> AlloyProofFetcher<P> {
    /// Wrap `provider`.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: Provider> ProofFetcher for AlloyProofFetcher<P> {
    #[instrument(skip(self, storage_keys), fields(keys = storage_keys.len()))]
    async fn get_proof(
        &self,
        address: Address,
        storage_keys: Vec<String>,
        block_number: u64,
    ) -> Result<AccountProof, ProofFetchError> {
        let storage_keys: Vec<StorageKey> = storage_keys
            .iter()
            .map(|key| StorageKey::from_str(key))
            .collect::<Result<_, _>>()
            .map_err(|e| ProofFetchError::ParseError(e.to_string()))?;
        let block_hex = format!("0x{block_number:x}");

        let response: EIP1186AccountProofResponse = self
            .provider
            .client()
            .request(RPC_METHOD_GET_PROOF, (address, storage_keys, block_hex))
            .await?;

        debug!(
            account_nodes = response.account_proof.len(),
            storage_entries = response.storage_proof.len(),
            "Fetched eth_getProof"
        );

        Ok(AccountProof {
            account_proof_rlp: alloy_rlp::encode(&response.account_proof).into(),
            storage_hash: response.storage_hash,
            storage_proof_rlp: response
                .storage_proof
                .iter()
                .map(|entry| alloy_rlp::encode(&entry.proof).into())
                .collect(),
        })
    }
}
