//! idlectl library
//!
//! Core pipeline for the EC2 idle-instance monitor: gateway contracts,
//! classification, orchestration, and the report/notification sinks.

pub mod aws;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod notify;
pub mod report;
pub mod scan;
pub mod secrets;

// Re-export commonly used types
pub use config::Config;
pub use error::{MonitorError, Result};
pub use model::InstanceRecord;
