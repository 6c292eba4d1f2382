//! Gateway contracts for the two external read paths
//!
//! The orchestrator only ever talks to inventory and metrics through these
//! traits. The AWS-backed implementations live in `src/aws.rs`; integration
//! tests substitute in-memory doubles. Failures are returned tagged with
//! their origin rather than swallowed, so the caller can log the reason
//! before degrading.

use crate::error::Result;
use crate::model::InstanceRecord;
use async_trait::async_trait;

/// Lists the compute instances visible in the configured region.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// One record per instance, flattened across reservations, with
    /// identity, lifecycle state, type, and launch time populated.
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>>;
}

/// Fetches trailing-window average CPU utilization for one instance.
#[async_trait]
pub trait MetricsGateway: Send + Sync {
    /// Arithmetic mean of the per-period average samples, rounded to two
    /// decimals. `Ok(None)` when the provider returned zero datapoints --
    /// the explicit "no data" signal, distinct from zero utilization.
    async fn average_utilization(&self, instance_id: &str) -> Result<Option<f64>>;
}
