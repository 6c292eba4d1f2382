use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scan configuration, constructed once at the entry point and passed by
/// reference through the pipeline. Nothing reads ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// AWS region to scan
    pub region: String,
    /// CPU utilization percentage below which a running instance is idle
    pub threshold: f64,
    /// Trailing metric window in days
    pub window_days: i64,
    /// CloudWatch aggregation period in seconds
    pub period_seconds: i32,
    /// Directory for timestamped JSON reports
    pub output_dir: PathBuf,
    /// Secrets Manager secret holding the Twilio credential bundle
    pub twilio_secret_name: String,
    /// Write the JSON report after classification
    pub write_report: bool,
    /// Send the WhatsApp alert after classification
    pub send_notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: "eu-central-1".to_string(),
            threshold: 5.0,
            window_days: 7,
            period_seconds: 3600,
            output_dir: PathBuf::from("output"),
            twilio_secret_name: "TwilioSecrets".to_string(),
            write_report: true,
            send_notifications: true,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .idlectl.toml in current dir, then ~/.config/idlectl/config.toml
            let local = PathBuf::from(".idlectl.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("idlectl").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".idlectl.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration. Run 'idlectl init' to create a config file.");
            }
            Ok(Config::default())
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::MissingField("region".to_string()));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "threshold".to_string(),
                reason: format!("must be a non-negative number, got {}", self.threshold),
            });
        }
        if self.window_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "window_days".to_string(),
                reason: format!("must be positive, got {}", self.window_days),
            });
        }
        if self.period_seconds < 60 {
            return Err(ConfigError::InvalidValue {
                field: "period_seconds".to_string(),
                reason: format!("must be at least 60, got {}", self.period_seconds),
            });
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
