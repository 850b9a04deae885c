//! Prometheus metrics for proof requests.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::info;

/// Metric identifiers and labels.
pub struct Metrics;

impl Metrics {
    /// Counter of proof requests, labelled by `endpoint` and `outcome`.
    pub const PROOF_REQUESTS: &str = "eth_proof_requests_total";

    /// Account update endpoint label.
    pub const ACCOUNT_UPDATE_LABEL: &str = "account_update";
    /// State proof endpoint label.
    pub const STATE_PROOF_LABEL: &str = "state_proof";
    /// Header proof endpoint label.
    pub const HEADER_PROOF_LABEL: &str = "header_proof";

    /// Successful request outcome.
    pub const OK_OUTCOME: &str = "ok";
    /// Failed request outcome.
    pub const ERROR_OUTCOME: &str = "error";

    /// Describe all metrics.
    pub fn describe() {
        metrics::describe_counter!(Self::PROOF_REQUESTS, "Proof requests served by endpoint and outcome");
    }
}

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    Metrics::describe();
    info!(address = %addr, "Serving metrics");
    Ok(())
}
