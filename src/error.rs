//! Error types for idlectl
//!
//! Library code uses `crate::error::Result<T>` which returns `MonitorError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling; the
//! conversion happens at the CLI boundary via `anyhow::Error::from`.
//!
//! Gateway failures carry their origin (region or instance id) so the
//! orchestrator can log them distinctly before degrading to an empty
//! inventory or missing utilization. The orchestrator never propagates a
//! gateway error past classification; a run that parses its arguments
//! always completes.

use thiserror::Error;

/// Main error type for idlectl
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Inventory error in region {region}: {message}")]
    Inventory { region: String, message: String },

    #[error("Metrics error for instance {instance_id}: {message}")]
    Metrics {
        instance_id: String,
        message: String,
    },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MonitorError>;
