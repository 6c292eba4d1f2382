//! WhatsApp notifier (Twilio Messages API)
//!
//! Builds one multi-line alert enumerating every idle instance and dispatches
//! it as a single message per run. An empty idle subset is a silent no-op.

use crate::error::{MonitorError, Result};
use crate::model::InstanceRecord;
use crate::secrets::TwilioCredentials;
use tracing::{debug, info};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Sends idle-instance alerts over the Twilio WhatsApp channel.
pub struct WhatsAppNotifier {
    http: reqwest::Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl WhatsAppNotifier {
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self::with_base_url(credentials, TWILIO_API_BASE)
    }

    /// Base URL override for tests against a local mock server.
    pub fn with_base_url(credentials: TwilioCredentials, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: base_url.into(),
        }
    }

    /// Dispatch the idle alert. Returns the message SID, or `None` when no
    /// instance is idle and nothing was sent.
    pub async fn send_idle_alert(&self, records: &[InstanceRecord]) -> Result<Option<String>> {
        let Some(body) = build_alert_message(records) else {
            info!("No idle instances to report");
            return Ok(None);
        };

        debug!("Sending WhatsApp alert:\n{}", body);

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        );
        let params = [
            ("Body", body.as_str()),
            ("From", self.credentials.whatsapp_from.as_str()),
            ("To", self.credentials.whatsapp_to.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MonitorError::Notification(format!(
                "Twilio returned {}: {}",
                status, detail
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        let sid = payload
            .get("sid")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        info!("WhatsApp message sent successfully: {}", sid);
        Ok(Some(sid))
    }
}

/// Build the alert body from the idle subset of a classified list.
/// Returns `None` when nothing is idle.
pub fn build_alert_message(records: &[InstanceRecord]) -> Option<String> {
    let idle: Vec<&InstanceRecord> = records.iter().filter(|r| r.idle).collect();
    if idle.is_empty() {
        return None;
    }

    let mut message = String::from(
        "🚨 *Idle EC2 Instances Detected* 🚨\n\n\
         The following EC2 instances are idle based on the CPU utilization threshold:\n\n",
    );
    for record in &idle {
        let cpu = record
            .average_cpu
            .map(|v| format!("{}%", v))
            .unwrap_or_else(|| "n/a".to_string());
        let launched = record
            .launch_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        message.push_str(&format!(
            "• *Instance ID:* {}\n  *CPU Utilization:* {}\n  *State:* {}\n  *Type:* {}\n  *Launch Time:* {}\n\n",
            record.instance_id, cpu, record.state, record.instance_type, launched
        ));
    }
    message.push_str("Please review these instances to optimize costs. 💡");
    Some(message)
}
