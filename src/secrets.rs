//! Twilio credential retrieval from AWS Secrets Manager
//!
//! The secret is a JSON document keyed the same way the operations runbook
//! provisions it. A missing secret or a missing key aborts only the
//! notification step; the scan and report still complete.

use crate::error::{MonitorError, Result};
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;

/// Credential bundle for the Twilio WhatsApp channel
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioCredentials {
    #[serde(rename = "TWILIO_ACCOUNT_SID")]
    pub account_sid: String,
    #[serde(rename = "TWILIO_AUTH_TOKEN")]
    pub auth_token: String,
    #[serde(rename = "TWILIO_WHATSAPP_FROM")]
    pub whatsapp_from: String,
    #[serde(rename = "WHATSAPP_TO")]
    pub whatsapp_to: String,
}

impl TwilioCredentials {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            MonitorError::Notification(format!("secret is not a valid credential bundle: {}", e))
        })
    }
}

/// Fetch and decode the Twilio credential bundle.
pub async fn fetch_twilio_credentials(
    sdk_config: &SdkConfig,
    secret_name: &str,
) -> Result<TwilioCredentials> {
    let client = SecretsClient::new(sdk_config);

    let response = client
        .get_secret_value()
        .secret_id(secret_name)
        .send()
        .await
        .map_err(|e| {
            MonitorError::Notification(format!(
                "failed to retrieve secret {}: {}",
                secret_name, e
            ))
        })?;

    let raw = response.secret_string().ok_or_else(|| {
        MonitorError::Notification(format!("secret {} has an empty string payload", secret_name))
    })?;

    TwilioCredentials::from_json(raw)
}
