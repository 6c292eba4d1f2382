//! End-to-end tests for the scan pipeline using in-memory gateway doubles

use async_trait::async_trait;
use idlectl::config::Config;
use idlectl::error::{MonitorError, Result};
use idlectl::gateway::{InventoryGateway, MetricsGateway};
use idlectl::model::{InstanceRecord, MetricSample};
use idlectl::scan::{handle_event, run_monitor, run_scan};
use std::collections::HashMap;

struct StaticInventory {
    records: Vec<InstanceRecord>,
}

#[async_trait]
impl InventoryGateway for StaticInventory {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>> {
        Ok(self.records.clone())
    }
}

struct FailingInventory;

#[async_trait]
impl InventoryGateway for FailingInventory {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>> {
        Err(MonitorError::Inventory {
            region: "eu-central-1".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

/// Metrics double: per-instance sample sets, optional per-instance failures.
/// Instances without an entry report no data, like an empty CloudWatch window.
struct TableMetrics {
    samples: HashMap<String, Vec<MetricSample>>,
    fail_for: Vec<String>,
}

impl TableMetrics {
    fn new() -> Self {
        Self {
            samples: HashMap::new(),
            fail_for: Vec::new(),
        }
    }

    fn with_samples(mut self, instance_id: &str, values: &[f64]) -> Self {
        let samples = values.iter().map(|v| MetricSample::new(*v, None)).collect();
        self.samples.insert(instance_id.to_string(), samples);
        self
    }

    fn failing_for(mut self, instance_id: &str) -> Self {
        self.fail_for.push(instance_id.to_string());
        self
    }
}

#[async_trait]
impl MetricsGateway for TableMetrics {
    async fn average_utilization(&self, instance_id: &str) -> Result<Option<f64>> {
        if self.fail_for.iter().any(|id| id == instance_id) {
            return Err(MonitorError::Metrics {
                instance_id: instance_id.to_string(),
                message: "throttled".to_string(),
            });
        }
        Ok(self
            .samples
            .get(instance_id)
            .and_then(|samples| MetricSample::average(samples)))
    }
}

fn quiet_config() -> Config {
    Config {
        write_report: false,
        send_notifications: false,
        ..Config::default()
    }
}

fn running(id: &str) -> InstanceRecord {
    InstanceRecord::new(id, "running", "t3.medium", None)
}

#[tokio::test]
async fn test_boundary_average_is_not_idle() {
    // Samples [10, 2, 3] average to exactly the 5.0 threshold
    let inventory = StaticInventory {
        records: vec![running("i-1")],
    };
    let metrics = TableMetrics::new().with_samples("i-1", &[10.0, 2.0, 3.0]);

    let records = run_scan(&quiet_config(), &inventory, &metrics).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].average_cpu, Some(5.0));
    assert!(!records[0].idle);
}

#[tokio::test]
async fn test_low_utilization_is_idle() {
    let inventory = StaticInventory {
        records: vec![running("i-2")],
    };
    let metrics = TableMetrics::new().with_samples("i-2", &[1.0, 2.0, 3.0]);

    let records = run_scan(&quiet_config(), &inventory, &metrics).await;
    assert_eq!(records[0].average_cpu, Some(2.0));
    assert!(records[0].idle);
}

#[tokio::test]
async fn test_stopped_instance_is_never_idle() {
    let inventory = StaticInventory {
        records: vec![InstanceRecord::new("i-3", "stopped", "t3.micro", None)],
    };
    let metrics = TableMetrics::new();

    let records = run_scan(&quiet_config(), &inventory, &metrics).await;
    assert!(!records[0].idle);
    assert!(records[0].average_cpu.is_none());
}

#[tokio::test]
async fn test_inventory_failure_degrades_to_empty_scan() {
    let metrics = TableMetrics::new();
    let records = run_scan(&quiet_config(), &FailingInventory, &metrics).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_inventory_failure_still_writes_empty_report() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = Config {
        output_dir: temp_dir.path().to_path_buf(),
        send_notifications: false,
        ..Config::default()
    };
    let metrics = TableMetrics::new();

    let records = run_monitor(&config, &FailingInventory, &metrics, None).await;
    assert!(records.is_empty());

    let reports: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(std::fs::read_to_string(&reports[0]).unwrap().trim(), "[]");
}

#[tokio::test]
async fn test_single_metrics_failure_does_not_abort_scan() {
    let inventory = StaticInventory {
        records: vec![running("i-ok"), running("i-broken"), running("i-busy")],
    };
    let metrics = TableMetrics::new()
        .with_samples("i-ok", &[0.5])
        .with_samples("i-busy", &[70.0])
        .failing_for("i-broken");

    let records = run_scan(&quiet_config(), &inventory, &metrics).await;
    assert_eq!(records.len(), 3);

    let by_id: HashMap<&str, &InstanceRecord> = records
        .iter()
        .map(|r| (r.instance_id.as_str(), r))
        .collect();
    assert!(by_id["i-ok"].idle);
    // Failed fetch classifies without data, never idle
    assert!(!by_id["i-broken"].idle);
    assert!(by_id["i-broken"].average_cpu.is_none());
    assert!(!by_id["i-busy"].idle);
}

#[tokio::test]
async fn test_no_data_on_running_instance_is_not_idle() {
    let inventory = StaticInventory {
        records: vec![running("i-silent")],
    };
    let metrics = TableMetrics::new();

    let records = run_scan(&quiet_config(), &inventory, &metrics).await;
    assert!(!records[0].idle);
    assert!(records[0].average_cpu.is_none());
}

#[tokio::test]
async fn test_event_envelope_is_always_200() {
    let inventory = StaticInventory {
        records: vec![running("i-1"), InstanceRecord::new("i-2", "stopped", "t3.micro", None)],
    };
    let metrics = TableMetrics::new().with_samples("i-1", &[1.0]);

    let response = handle_event(&quiet_config(), &inventory, &metrics, None).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body.len(), 2);

    // Total inventory failure still reports 200, best-effort semantics
    let response = handle_event(&quiet_config(), &FailingInventory, &metrics, None).await;
    assert_eq!(response.status_code, 200);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_report_length_is_independent_of_idle_count() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = Config {
        output_dir: temp_dir.path().to_path_buf(),
        send_notifications: false,
        ..Config::default()
    };
    let inventory = StaticInventory {
        records: vec![running("i-1"), running("i-2"), running("i-3")],
    };
    // Only i-1 is idle; the report still carries all three
    let metrics = TableMetrics::new()
        .with_samples("i-1", &[1.0])
        .with_samples("i-2", &[50.0])
        .with_samples("i-3", &[90.0]);

    run_monitor(&config, &inventory, &metrics, None).await;

    let reports: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    let parsed: Vec<InstanceRecord> =
        serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap();
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed.iter().filter(|r| r.idle).count(), 1);
}
