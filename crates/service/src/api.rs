//! REST API Endpoints
//!
//! Health, status, and proof endpoints.

use crate::state::{AppState, EndpointCounts};
use crate::telemetry::Metrics;
use alloy::primitives::{Bytes, B256};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use eth_proof_gen::{derive_slot_key, ExecutionPayloadHeader, ProofError, ProofFetcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tower_http::trace::TraceLayer;

/// Run the API server
pub async fn run_server<F>(listen: String, state: AppState<F>) -> anyhow::Result<()>
where
    F: ProofFetcher + Send + Sync + 'static,
{
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    tracing::info!(address = %listen, "API server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
pub fn create_router<F>(state: AppState<F>) -> Router
where
    F: ProofFetcher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health::<F>))
        .route("/status", get(status::<F>))
        .route("/account_update/{block_number}", get(account_update::<F>))
        .route("/state_proof/{height}", get(state_proof::<F>))
        .route("/header_proof", post(header_proof::<F>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error body returned by the proof endpoints
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// A failed request with its HTTP status
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<&ProofError> for ApiError {
    fn from(error: &ProofError) -> Self {
        let status = match error {
            ProofError::RpcFailure(_) => StatusCode::BAD_GATEWAY,
            ProofError::InvalidLeafCount(_)
            | ProofError::ProofGenerationFailure(_)
            | ProofError::EncodingFailure(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Count the outcome of a proof request and turn its error into a response
fn track<F, T>(
    state: &AppState<F>,
    endpoint: &'static str,
    result: Result<T, ProofError>,
) -> Result<T, ApiError> {
    match result {
        Ok(value) => {
            state.record_success(endpoint);
            Ok(value)
        }
        Err(e) => {
            tracing::warn!(endpoint, error = %e, "Proof request failed");
            state.record_failure(endpoint, &e);
            Err(ApiError::from(&e))
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    latest_block: u64,
}

/// Health check endpoint
async fn health<F>(State(state): State<AppState<F>>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.is_healthy();
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        latest_block: state.latest_block(),
    };

    (status_code, Json(response))
}

/// Status response
#[derive(Serialize)]
struct StatusResponse {
    ibc_address: String,
    latest_block: u64,
    uptime_secs: u64,
    requests: BTreeMap<String, EndpointCounts>,
    last_error: Option<String>,
}

/// Status endpoint
async fn status<F: ProofFetcher>(State(state): State<AppState<F>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ibc_address: state.state_prover().ibc_address().to_string(),
        latest_block: state.latest_block(),
        uptime_secs: state.uptime_secs(),
        requests: state.endpoint_counts(),
        last_error: state.last_error(),
    })
}

/// Account update response
#[derive(Debug, Serialize, Deserialize)]
struct AccountUpdateResponse {
    account_proof: Bytes,
    account_storage_root: B256,
}

/// Account proof of the IBC contract at a block
async fn account_update<F: ProofFetcher>(
    State(state): State<AppState<F>>,
    Path(block_number): Path<u64>,
) -> Result<Json<AccountUpdateResponse>, ApiError> {
    let result = state.state_prover().build_account_update(block_number).await;
    let update = track(&state, Metrics::ACCOUNT_UPDATE_LABEL, result)?;
    state.observe_block(block_number);

    Ok(Json(AccountUpdateResponse {
        account_proof: update.account_proof,
        account_storage_root: update.account_storage_root,
    }))
}

/// Query of the state proof endpoint
#[derive(Debug, Deserialize)]
struct StateProofQuery {
    /// Commitment path, 0x-hex
    path: String,
}

/// State proof response
#[derive(Debug, Serialize, Deserialize)]
struct StateProofResponse {
    slot: B256,
    proof: Bytes,
}

/// Storage proof of a commitment path at a block
async fn state_proof<F: ProofFetcher>(
    State(state): State<AppState<F>>,
    Path(height): Path<u64>,
    Query(query): Query<StateProofQuery>,
) -> Result<Json<StateProofResponse>, ApiError> {
    let path = query.path.strip_prefix("0x").unwrap_or(&query.path);
    let path = hex::decode(path).map_err(|e| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: format!("invalid commitment path: {e}"),
    })?;

    let result = state.state_prover().build_state_proof(&path, height).await;
    let proof = track(&state, Metrics::STATE_PROOF_LABEL, result)?;
    state.observe_block(height);

    Ok(Json(StateProofResponse {
        slot: derive_slot_key(&path),
        proof: proof.0,
    }))
}

/// Header proof request
#[derive(Debug, Serialize, Deserialize)]
struct HeaderProofRequest {
    header: ExecutionPayloadHeader,
    generalized_index: u64,
}

/// Header proof response
#[derive(Debug, Serialize, Deserialize)]
struct HeaderProofResponse {
    proof: Vec<B256>,
    root: B256,
}

/// Proof of a header node by generalized index
async fn header_proof<F>(
    State(state): State<AppState<F>>,
    Json(request): Json<HeaderProofRequest>,
) -> Result<Json<HeaderProofResponse>, ApiError> {
    let builder = state.header_prover();
    let result = builder
        .build_proof(&request.header, request.generalized_index)
        .and_then(|proof| Ok((proof, builder.hash_tree_root(&request.header)?)));
    let (proof, root) = track(&state, Metrics::HEADER_PROOF_LABEL, result)?;

    Ok(Json(HeaderProofResponse {
        proof: proof.into_iter().map(B256::from).collect(),
        root: B256::from(root),
    }))
}
