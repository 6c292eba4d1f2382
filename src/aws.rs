//! AWS-backed gateway implementations
//!
//! `Ec2Inventory` wraps `describe_instances`; `CloudWatchMetrics` wraps
//! `get_metric_statistics` over the AWS/EC2 CPUUtilization metric. Both are
//! constructed once at the entry point from a shared `SdkConfig` and passed
//! into the orchestrator as trait objects.

use crate::error::{MonitorError, Result};
use crate::gateway::{InventoryGateway, MetricsGateway};
use crate::model::{InstanceRecord, MetricSample};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use aws_sdk_ec2::Client as Ec2Client;
use chrono::{Duration, Utc};
use tracing::{debug, info};

/// Load the shared AWS SDK configuration with an explicit region override.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// EC2-backed inventory gateway
pub struct Ec2Inventory {
    client: Ec2Client,
    region: String,
}

impl Ec2Inventory {
    pub fn new(sdk_config: &SdkConfig, region: &str) -> Self {
        Self {
            client: Ec2Client::new(sdk_config),
            region: region.to_string(),
        }
    }
}

#[async_trait]
impl InventoryGateway for Ec2Inventory {
    async fn list_instances(&self) -> Result<Vec<InstanceRecord>> {
        info!("Scanning EC2 instances in region {}", self.region);

        let response = self
            .client
            .describe_instances()
            .send()
            .await
            .map_err(|e| MonitorError::Inventory {
                region: self.region.clone(),
                message: format!("describe_instances failed: {}", e),
            })?;

        let mut instances = Vec::new();
        for reservation in response.reservations() {
            for instance in reservation.instances() {
                let Some(instance_id) = instance.instance_id() else {
                    continue;
                };

                let state = instance
                    .state()
                    .and_then(|s| s.name())
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string());

                let instance_type = instance
                    .instance_type()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string());

                let launch_time = instance
                    .launch_time()
                    .and_then(|lt| chrono::DateTime::from_timestamp(lt.secs(), 0));

                instances.push(InstanceRecord::new(
                    instance_id,
                    state,
                    instance_type,
                    launch_time,
                ));
            }
        }

        info!(
            "Found {} EC2 instances in region {}",
            instances.len(),
            self.region
        );
        Ok(instances)
    }
}

/// CloudWatch-backed metrics gateway
pub struct CloudWatchMetrics {
    client: CloudWatchClient,
    window_days: i64,
    period_seconds: i32,
}

impl CloudWatchMetrics {
    pub fn new(sdk_config: &SdkConfig, window_days: i64, period_seconds: i32) -> Self {
        Self {
            client: CloudWatchClient::new(sdk_config),
            window_days,
            period_seconds,
        }
    }
}

#[async_trait]
impl MetricsGateway for CloudWatchMetrics {
    async fn average_utilization(&self, instance_id: &str) -> Result<Option<f64>> {
        debug!("Fetching CPU utilization for instance {}", instance_id);

        let end = Utc::now();
        let start = end - Duration::days(self.window_days);

        let dimension = Dimension::builder()
            .name("InstanceId")
            .value(instance_id)
            .build();

        let response = self
            .client
            .get_metric_statistics()
            .namespace("AWS/EC2")
            .metric_name("CPUUtilization")
            .dimensions(dimension)
            .start_time(aws_sdk_cloudwatch::primitives::DateTime::from_secs(
                start.timestamp(),
            ))
            .end_time(aws_sdk_cloudwatch::primitives::DateTime::from_secs(
                end.timestamp(),
            ))
            .period(self.period_seconds)
            .statistics(Statistic::Average)
            .send()
            .await
            .map_err(|e| MonitorError::Metrics {
                instance_id: instance_id.to_string(),
                message: format!("get_metric_statistics failed: {}", e),
            })?;

        let samples: Vec<MetricSample> = response
            .datapoints()
            .iter()
            .filter_map(|dp| {
                dp.average().map(|value| {
                    let timestamp = dp
                        .timestamp()
                        .and_then(|ts| chrono::DateTime::from_timestamp(ts.secs(), 0));
                    MetricSample::new(value, timestamp)
                })
            })
            .collect();

        match MetricSample::average(&samples) {
            Some(avg) => Ok(Some(avg)),
            None => {
                debug!("No CPU utilization data found for instance {}", instance_id);
                Ok(None)
            }
        }
    }
}
