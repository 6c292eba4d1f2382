//! Idle classification
//!
//! Pure decision logic, kept free of I/O so the boundary cases are cheap to
//! test. An instance is idle only when it is running, has utilization data,
//! and that utilization is strictly below the threshold.

use crate::model::InstanceRecord;

/// Classify one instance in place.
///
/// `average_cpu` is recorded on the instance unconditionally, including
/// `None`. A non-running instance is never idle in the cost-waste sense.
/// A running instance with no utilization data is classified not-idle:
/// a transient metrics outage must not produce false idle alerts.
/// Utilization exactly equal to the threshold is not idle.
pub fn classify(record: &mut InstanceRecord, average_cpu: Option<f64>, threshold: f64) {
    record.average_cpu = average_cpu;

    if !record.is_running() {
        record.idle = false;
        return;
    }

    record.idle = match average_cpu {
        Some(cpu) => cpu < threshold,
        None => false,
    };
}
