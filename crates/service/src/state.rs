//! Shared Application State
//!
//! The provers plus thread-safe request bookkeeping for the status endpoints.

use crate::telemetry::Metrics;
use dashmap::DashMap;
use eth_proof_gen::{ExecutionStateProver, HeaderProofBuilder, ProofError};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Request counts for one endpoint
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndpointCounts {
    pub served: u64,
    pub failed: u64,
}

/// Shared application state
#[derive(Debug)]
pub struct AppState<F> {
    inner: Arc<AppStateInner<F>>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[derive(Debug)]
struct AppStateInner<F> {
    /// Account and storage proofs for the IBC contract
    state_prover: ExecutionStateProver<F>,
    /// Header field proofs
    header_prover: HeaderProofBuilder,
    /// Highest block an account update or state proof was built for
    latest_block: AtomicU64,
    /// False after a proof query failed, until the next one succeeds
    execution_client_ok: AtomicBool,
    /// Request counts by endpoint
    endpoints: DashMap<&'static str, EndpointCounts>,
    /// Service start time
    start_time: std::time::Instant,
    /// Last error message
    last_error: RwLock<Option<String>>,
}

impl<F> AppState<F> {
    /// Create new application state
    #[must_use]
    pub fn new(state_prover: ExecutionStateProver<F>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                state_prover,
                header_prover: HeaderProofBuilder::new(),
                latest_block: AtomicU64::new(0),
                execution_client_ok: AtomicBool::new(true),
                endpoints: DashMap::new(),
                start_time: std::time::Instant::now(),
                last_error: RwLock::new(None),
            }),
        }
    }

    /// Execution state prover
    #[must_use]
    pub fn state_prover(&self) -> &ExecutionStateProver<F> {
        &self.inner.state_prover
    }

    /// Header proof builder
    #[must_use]
    pub fn header_prover(&self) -> &HeaderProofBuilder {
        &self.inner.header_prover
    }

    /// Highest block proven so far
    #[must_use]
    pub fn latest_block(&self) -> u64 {
        self.inner.latest_block.load(Ordering::Relaxed)
    }

    /// Note a block proven against the execution client
    pub fn observe_block(&self, block_number: u64) {
        self.inner.latest_block.fetch_max(block_number, Ordering::Relaxed);
        self.inner.execution_client_ok.store(true, Ordering::Relaxed);
    }

    /// Check if the last proof query reached the execution client
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.inner.execution_client_ok.load(Ordering::Relaxed)
    }

    /// Get uptime in seconds
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.inner.start_time.elapsed().as_secs()
    }

    /// Count a served request
    pub fn record_success(&self, endpoint: &'static str) {
        self.inner.endpoints.entry(endpoint).or_default().served += 1;
        metrics::counter!(Metrics::PROOF_REQUESTS, "endpoint" => endpoint, "outcome" => Metrics::OK_OUTCOME)
            .increment(1);
    }

    /// Count a failed request and keep its error
    pub fn record_failure(&self, endpoint: &'static str, error: &ProofError) {
        self.inner.endpoints.entry(endpoint).or_default().failed += 1;
        metrics::counter!(Metrics::PROOF_REQUESTS, "endpoint" => endpoint, "outcome" => Metrics::ERROR_OUTCOME)
            .increment(1);

        if matches!(error, ProofError::RpcFailure(_)) {
            self.inner.execution_client_ok.store(false, Ordering::Relaxed);
        }
        self.set_error(Some(format!("{endpoint}: {error}")));
    }

    /// Request counts keyed by endpoint
    #[must_use]
    pub fn endpoint_counts(&self) -> BTreeMap<String, EndpointCounts> {
        self.inner
            .endpoints
            .iter()
            .map(|entry| ((*entry.key()).to_string(), *entry.value()))
            .collect()
    }

    /// Set last error
    pub fn set_error(&self, error: Option<String>) {
        *self.inner.last_error.write() = error;
    }

    /// Get last error
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.read().clone()
    }
}
