//! Scan orchestration
//!
//! One run is a single sequential pass: list instances, fetch each
//! instance's trailing average utilization, classify, then hand the full
//! list to the report sink and the notifier. Gateway failures are logged
//! with their reason and degraded in place (empty inventory, missing
//! utilization); the run itself never aborts mid-pipeline.

use crate::classifier::classify;
use crate::config::Config;
use crate::gateway::{InventoryGateway, MetricsGateway};
use crate::model::InstanceRecord;
use crate::notify::WhatsAppNotifier;
use crate::report;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Fetch and classify every instance in the configured region.
///
/// A failed inventory listing degrades to an empty scan. A failed metrics
/// fetch degrades to missing utilization for that instance only; the rest
/// of the scan is unaffected.
pub async fn run_scan(
    config: &Config,
    inventory: &dyn InventoryGateway,
    metrics: &dyn MetricsGateway,
) -> Vec<InstanceRecord> {
    let mut records = match inventory.list_instances().await {
        Ok(records) => records,
        Err(e) => {
            warn!("Inventory listing failed, treating region as empty: {}", e);
            Vec::new()
        }
    };

    if records.is_empty() {
        info!("No EC2 instances found");
        return records;
    }

    for record in &mut records {
        let average_cpu = match metrics.average_utilization(&record.instance_id).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Metrics fetch failed, classifying without data: {}", e);
                None
            }
        };

        classify(record, average_cpu, config.threshold);

        let cpu_display = record
            .average_cpu
            .map(|v| format!("{}%", v))
            .unwrap_or_else(|| "no data".to_string());
        if record.idle {
            info!("Instance {} is idle (CPU: {})", record.instance_id, cpu_display);
        } else if record.is_running() {
            info!(
                "Instance {} is active (CPU: {})",
                record.instance_id, cpu_display
            );
        } else {
            info!(
                "Instance {} is not running (state: {})",
                record.instance_id, record.state
            );
        }
    }

    records
}

/// Full pipeline: scan, then report and notify, each failure logged and
/// non-fatal. Returns the classified list regardless of sink outcomes.
pub async fn run_monitor(
    config: &Config,
    inventory: &dyn InventoryGateway,
    metrics: &dyn MetricsGateway,
    notifier: Option<&WhatsAppNotifier>,
) -> Vec<InstanceRecord> {
    let records = run_scan(config, inventory, metrics).await;

    if config.write_report {
        if let Err(e) = report::write_report(&records, &config.output_dir) {
            warn!("Report write failed: {}", e);
        }
    }

    if config.send_notifications {
        match notifier {
            Some(notifier) => {
                if let Err(e) = notifier.send_idle_alert(&records).await {
                    warn!("Notification dispatch failed: {}", e);
                }
            }
            None => warn!("Notifier unavailable, skipping alert"),
        }
    }

    records
}

/// Scheduler event payload for the event-triggered entry point.
///
/// Both fields fall back to the same defaults as the CLI path (region
/// `eu-central-1`, threshold `5.0`); the two entry points share one
/// configured default on purpose.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanEvent {
    pub region: Option<String>,
    pub threshold: Option<f64>,
}

impl ScanEvent {
    /// Overlay event fields onto the run configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
    }
}

/// Status envelope returned by the event-triggered entry point.
///
/// Always 200: the pipeline absorbs gateway failures as degraded data, so
/// the event path reports best-effort completion rather than an error.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Vec<InstanceRecord>,
}

/// Event-triggered entry point sharing the CLI code path.
pub async fn handle_event(
    config: &Config,
    inventory: &dyn InventoryGateway,
    metrics: &dyn MetricsGateway,
    notifier: Option<&WhatsAppNotifier>,
) -> EventResponse {
    let records = run_monitor(config, inventory, metrics, notifier).await;
    EventResponse {
        status_code: 200,
        body: records,
    }
}
