//! Beacon API HTTP Client
//!
//! Fetches finality checkpoints and the execution payload header of a
//! beacon block from a beacon node.

use crate::types::{ExecutionPayloadHeader, FinalityCheckpoints};
use alloy::primitives::B256;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from beacon API operations
#[derive(Debug, Error)]
pub enum BeaconClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Client for interacting with the Beacon API
#[derive(Debug, Clone)]
pub struct BeaconClient {
    client: Client,
    base_url: String,
}

impl BeaconClient {
    /// Create a new beacon client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the beacon node (e.g., `http://localhost:5052`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a beacon client on top of a configured `reqwest` client
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch finality checkpoints of the head state
    ///
    /// # Errors
    /// Returns error if the request fails or the response is malformed
    #[instrument(skip(self))]
    pub async fn get_finality_checkpoints(&self) -> Result<FinalityCheckpoints, BeaconClientError> {
        let url = format!(
            "{}/eth/v1/beacon/states/head/finality_checkpoints",
            self.base_url
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BeaconClientError::InvalidResponse(format!(
                "Unexpected status: {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct CheckpointsResponse {
            data: CheckpointsData,
        }

        #[derive(Deserialize)]
        struct CheckpointsData {
            previous_justified: Checkpoint,
            current_justified: Checkpoint,
            finalized: Checkpoint,
        }

        #[derive(Deserialize)]
        struct Checkpoint {
            epoch: String,
            root: String,
        }

        let resp: CheckpointsResponse = response.json().await?;

        Ok(FinalityCheckpoints {
            previous_justified_epoch: parse_epoch(&resp.data.previous_justified.epoch)?,
            current_justified_epoch: parse_epoch(&resp.data.current_justified.epoch)?,
            finalized_epoch: parse_epoch(&resp.data.finalized.epoch)?,
            finalized_root: B256::from(parse_hex32(&resp.data.finalized.root)?),
        })
    }

    /// Fetch the execution payload header committed in the block `block_root`
    ///
    /// Read from the light client bootstrap of that block, which carries the
    /// header in the beacon API JSON form.
    ///
    /// # Errors
    /// Returns error if the request fails, the node has no bootstrap for the
    /// block, or the header cannot be decoded
    #[instrument(skip(self))]
    pub async fn get_execution_payload_header(
        &self,
        block_root: B256,
    ) -> Result<ExecutionPayloadHeader, BeaconClientError> {
        let url = format!(
            "{}/eth/v1/beacon/light_client/bootstrap/{block_root}",
            self.base_url
        );

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BeaconClientError::NotFound(format!(
                "light client bootstrap for {block_root}"
            )));
        }

        if !response.status().is_success() {
            return Err(BeaconClientError::InvalidResponse(format!(
                "Unexpected status: {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct BootstrapResponse {
            data: BootstrapData,
        }

        #[derive(Deserialize)]
        struct BootstrapData {
            header: LightClientHeader,
        }

        #[derive(Deserialize)]
        struct LightClientHeader {
            execution: ExecutionPayloadHeader,
        }

        let body = response.bytes().await?;
        let resp: BootstrapResponse = serde_json::from_slice(&body)
            .map_err(|e| BeaconClientError::InvalidResponse(format!("Invalid bootstrap: {e}")))?;

        let header = resp.data.header.execution;
        debug!(block_number = header.block_number, "Fetched execution payload header");
        Ok(header)
    }
}

fn parse_epoch(s: &str) -> Result<u64, BeaconClientError> {
    s.parse()
        .map_err(|e| BeaconClientError::InvalidResponse(format!("Invalid epoch: {e}")))
}

fn parse_hex32(s: &str) -> Result<[u8; 32], BeaconClientError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s)
        .map_err(|e| BeaconClientError::InvalidResponse(format!("Invalid hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| BeaconClientError::InvalidResponse("Expected 32 bytes".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HEADER_JSON: &str = include_str!("../testdata/execution_payload_header.json");

    fn bootstrap_body() -> Value {
        let execution: Value = serde_json::from_str(HEADER_JSON).unwrap();
        json!({
            "version": "deneb",
            "data": {
                "header": {
                    "beacon": {
                        "slot": "32",
                        "proposer_index": "1",
                        "parent_root": format!("0x{}", "00".repeat(32)),
                        "state_root": format!("0x{}", "00".repeat(32)),
                        "body_root": format!("0x{}", "00".repeat(32)),
                    },
                    "execution": execution,
                    "execution_branch": [],
                },
                "current_sync_committee_branch": [],
            }
        })
    }

    #[test]
    fn test_parse_hex32() {
        let hex = "0x0102030405060708091011121314151617181920212223242526272829303132";
        let result = parse_hex32(hex).unwrap();
        assert_eq!(result[0], 0x01);
        assert_eq!(result[31], 0x32);
    }

    #[test]
    fn test_parse_hex32_without_prefix() {
        let hex = "0102030405060708091011121314151617181920212223242526272829303132";
        let result = parse_hex32(hex).unwrap();
        assert_eq!(result[0], 0x01);
    }

    #[test]
    fn test_parse_hex32_invalid_length() {
        let hex = "0x0102";
        assert!(parse_hex32(hex).is_err());
    }

    #[tokio::test]
    async fn test_get_execution_payload_header() {
        let server = MockServer::start().await;
        let root = B256::repeat_byte(0xab);
        Mock::given(method("GET"))
            .and(path(format!("/eth/v1/beacon/light_client/bootstrap/{root}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(bootstrap_body()))
            .mount(&server)
            .await;

        let client = BeaconClient::new(server.uri());
        let header = client.get_execution_payload_header(root).await.unwrap();

        let expected: ExecutionPayloadHeader = serde_json::from_str(HEADER_JSON).unwrap();
        assert_eq!(header, expected);
    }

    #[tokio::test]
    async fn test_bootstrap_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = BeaconClient::new(server.uri());
        let err = client
            .get_execution_payload_header(B256::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, BeaconClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bootstrap_with_malformed_header() {
        let server = MockServer::start().await;
        let mut body = bootstrap_body();
        body["data"]["header"]["execution"]["block_number"] = json!("not-a-number");
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = BeaconClient::new(format!("{}/", server.uri()));
        let err = client
            .get_execution_payload_header(B256::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, BeaconClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_get_finality_checkpoints() {
        let server = MockServer::start().await;
        let finalized_root = format!("0x{}", "cd".repeat(32));
        Mock::given(method("GET"))
            .and(path("/eth/v1/beacon/states/head/finality_checkpoints"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "execution_optimistic": false,
                "finalized": true,
                "data": {
                    "previous_justified": { "epoch": "99", "root": format!("0x{}", "01".repeat(32)) },
                    "current_justified": { "epoch": "100", "root": format!("0x{}", "02".repeat(32)) },
                    "finalized": { "epoch": "98", "root": finalized_root },
                }
            })))
            .mount(&server)
            .await;

        let client = BeaconClient::new(server.uri());
        let checkpoints = client.get_finality_checkpoints().await.unwrap();

        assert_eq!(checkpoints.previous_justified_epoch, 99);
        assert_eq!(checkpoints.current_justified_epoch, 100);
        assert_eq!(checkpoints.finalized_epoch, 98);
        assert_eq!(checkpoints.finalized_root, B256::repeat_byte(0xcd));
    }
}
