//! Execution State Proof Provider
//!
//! Turns `eth_getProof` responses for the IBC contract into the account
//! update and storage proofs consumed by the light client. Each call issues
//! exactly one proof query; retries and timeouts belong to the fetcher.

use crate::error::ProofError;
use crate::execution_client::{ProofFetchError, ProofFetcher};
use crate::storage_key::{derive_slot_key, encode_slot_key};
use crate::types::{AccountUpdate, StateProof};
use alloy::primitives::Address;
use tracing::{debug, instrument};

/// Builds account updates and storage proofs for one contract.
#[derive(Debug, Clone)]
pub struct ExecutionStateProver<F> {
    fetcher: F,
    ibc_address: Address,
}

impl<F: ProofFetcher> ExecutionStateProver<F> {
    /// Prover for the IBC contract at `ibc_address`.
    pub const fn new(fetcher: F, ibc_address: Address) -> Self {
        Self {
            fetcher,
            ibc_address,
        }
    }

    /// The proof capability queried by this prover.
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Address of the contract whose state is proven.
    pub const fn ibc_address(&self) -> Address {
        self.ibc_address
    }

    /// Account proof and storage root of the contract at `block_number`.
    ///
    /// # Errors
    /// Returns [`ProofError::RpcFailure`] if the proof query fails.
    #[instrument(skip(self), fields(address = %self.ibc_address))]
    pub async fn build_account_update(&self, block_number: u64) -> Result<AccountUpdate, ProofError> {
        let proof = self
            .fetcher
            .get_proof(self.ibc_address, Vec::new(), block_number)
            .await?;

        debug!(storage_root = %proof.storage_hash, "Built account update");
        Ok(AccountUpdate {
            account_proof: proof.account_proof_rlp,
            account_storage_root: proof.storage_hash,
        })
    }

    /// Storage proof of the commitment stored under `path` at `height`.
    ///
    /// # Errors
    /// - [`ProofError::EncodingFailure`] if the slot key cannot be encoded
    /// - [`ProofError::RpcFailure`] if the query fails or returns no storage proof
    #[instrument(skip(self, path), fields(address = %self.ibc_address, path_len = path.len()))]
    pub async fn build_state_proof(&self, path: &[u8], height: u64) -> Result<StateProof, ProofError> {
        let slot = derive_slot_key(path);
        let key = encode_slot_key(&slot)?;

        let proof = self
            .fetcher
            .get_proof(self.ibc_address, vec![key], height)
            .await?;

        let entry = proof.storage_proof_rlp.into_iter().next().ok_or_else(|| {
            ProofFetchError::ParseError(format!("no storage proof returned for slot {slot}"))
        })?;

        debug!(%slot, proof_len = entry.len(), "Built state proof");
        Ok(StateProof(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution_client::AccountProof;
    use alloy::primitives::{Bytes, B256};
    use alloy::transports::TransportErrorKind;
    use std::sync::Mutex;

    const PATH: &[u8] = b"commitments/ports/transfer/channels/channel-0/sequences/1";

    type Call = (Address, Vec<String>, u64);

    /// Fetcher returning a canned response and recording every query.
    #[derive(Default)]
    struct FakeFetcher {
        response: Option<AccountProof>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeFetcher {
        fn returning(response: AccountProof) -> Self {
            Self {
                response: Some(response),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProofFetcher for FakeFetcher {
        async fn get_proof(
            &self,
            address: Address,
            storage_keys: Vec<String>,
            block_number: u64,
        ) -> Result<AccountProof, ProofFetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((address, storage_keys, block_number));
            self.response
                .clone()
                .ok_or_else(|| TransportErrorKind::custom_str("connection refused").into())
        }
    }

    fn canned_proof() -> AccountProof {
        AccountProof {
            account_proof_rlp: Bytes::from_static(&[0xc2, 0x01, 0x02]),
            storage_hash: B256::repeat_byte(0x55),
            storage_proof_rlp: vec![
                Bytes::from_static(&[0xc1, 0xaa]),
                Bytes::from_static(&[0xc1, 0xbb]),
            ],
        }
    }

    fn ibc_address() -> Address {
        Address::repeat_byte(0x11)
    }

    #[tokio::test]
    async fn test_account_update_single_query_without_keys() {
        let prover = ExecutionStateProver::new(FakeFetcher::returning(canned_proof()), ibc_address());

        let update = prover.build_account_update(1000).await.unwrap();

        assert_eq!(update.account_proof, Bytes::from_static(&[0xc2, 0x01, 0x02]));
        assert_eq!(update.account_storage_root, B256::repeat_byte(0x55));
        assert_eq!(prover.fetcher.calls(), vec![(ibc_address(), Vec::new(), 1000)]);
    }

    #[tokio::test]
    async fn test_state_proof_single_query_with_derived_key() {
        let prover = ExecutionStateProver::new(FakeFetcher::returning(canned_proof()), ibc_address());

        let proof = prover.build_state_proof(PATH, 77).await.unwrap();

        assert_eq!(proof, StateProof(Bytes::from_static(&[0xc1, 0xaa])));
        let expected_key = encode_slot_key(&derive_slot_key(PATH)).unwrap();
        assert_eq!(prover.fetcher.calls(), vec![(ibc_address(), vec![expected_key], 77)]);
    }

    #[tokio::test]
    async fn test_transport_error_is_rpc_failure() {
        let prover = ExecutionStateProver::new(FakeFetcher::default(), ibc_address());

        let err = prover.build_account_update(5).await.unwrap_err();
        assert!(matches!(err, ProofError::RpcFailure(ProofFetchError::Transport(_))));
        assert!(err.to_string().contains("connection refused"));

        let err = prover.build_state_proof(PATH, 5).await.unwrap_err();
        assert!(matches!(err, ProofError::RpcFailure(ProofFetchError::Transport(_))));
        assert_eq!(prover.fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_storage_entry_is_rpc_failure() {
        let response = AccountProof {
            storage_proof_rlp: Vec::new(),
            ..canned_proof()
        };
        let prover = ExecutionStateProver::new(FakeFetcher::returning(response), ibc_address());

        let err = prover.build_state_proof(PATH, 1).await.unwrap_err();
        assert!(matches!(err, ProofError::RpcFailure(ProofFetchError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_empty_path_is_provable() {
        let prover = ExecutionStateProver::new(FakeFetcher::returning(canned_proof()), ibc_address());

        prover.build_state_proof(b"", 1).await.unwrap();
        let calls = prover.fetcher.calls();
        assert_eq!(
            calls[0].1,
            vec!["0x68170bf1a62470defe6e818dab6c626693c096d25179020019d7a7b20114d233".to_string()]
        );
    }
}
