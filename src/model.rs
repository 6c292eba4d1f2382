//! Data types shared across the scan pipeline
//!
//! Field names serialize to the same keys the JSON report has always used
//! (`InstanceId`, `State`, ...) so existing report consumers keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One EC2 instance as seen by a single scan.
///
/// Created fresh from inventory output on every run, classified in place,
/// then consumed read-only by the report sink and the notifier. Nothing
/// survives across runs except the written report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,

    /// Lifecycle state as reported by EC2 (running, stopped, pending, ...).
    /// Read-only to the pipeline.
    #[serde(rename = "State")]
    pub state: String,

    #[serde(rename = "Type")]
    pub instance_type: String,

    #[serde(rename = "LaunchTime")]
    pub launch_time: Option<DateTime<Utc>>,

    /// Trailing-window average CPU percentage. `None` means "no datapoints",
    /// which is distinct from zero utilization. Populated by classification.
    #[serde(rename = "AverageCPUUtilization", default)]
    pub average_cpu: Option<f64>,

    #[serde(rename = "Idle", default)]
    pub idle: bool,
}

impl InstanceRecord {
    pub fn new(
        instance_id: impl Into<String>,
        state: impl Into<String>,
        instance_type: impl Into<String>,
        launch_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            state: state.into(),
            instance_type: instance_type.into(),
            launch_time,
            average_cpu: None,
            idle: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// A single averaged CloudWatch datapoint. Only `value` feeds the
/// classification; the timestamp is kept for debugging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl MetricSample {
    pub fn new(value: f64, timestamp: Option<DateTime<Utc>>) -> Self {
        Self { value, timestamp }
    }

    /// Mean of the sample values rounded to two decimals; `None` for an
    /// empty window. Rounds half away from zero (2.125 -> 2.13), not
    /// banker's rounding.
    pub fn average(samples: &[MetricSample]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let mean = samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64;
        Some((mean * 100.0).round() / 100.0)
    }
}
