//! Notification provider client
//!
//! Thin adapter over the external messaging gateway used for payment
//! reminders. Every request carries an explicit timeout so one slow
//! provider call cannot stall a whole reminder batch.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;

use crate::error::ServiceError;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
    Sms,
    Email,
    Whatsapp,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "SMS",
            Self::Email => "EMAIL",
            Self::Whatsapp => "WHATSAPP",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SMS" => Some(Self::Sms),
            "EMAIL" => Some(Self::Email),
            "WHATSAPP" => Some(Self::Whatsapp),
            _ => None,
        }
    }
}

/// Outcome of one delivery attempt. HTTP-level rejection is reported here
/// (success = false, raw body kept for audit); transport failures such as
/// timeouts surface as `ServiceError::ExternalService` instead.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub raw_response: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Clone)]
pub struct NotificationService {
    client: Client,
    base_url: String,
    api_key: String,
    sender_id: String,
    default_channel: NotificationChannel,
}

impl NotificationService {
    pub fn new(base_url: String, api_key: String, sender_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            api_key,
            sender_id,
            default_channel: NotificationChannel::Sms,
        }
    }

    pub fn from_env() -> Self {
        let mut service = Self::new(
            env::var("NOTIFY_API_BASE_URL").unwrap_or_default(),
            env::var("NOTIFY_API_KEY").unwrap_or_default(),
            env::var("NOTIFY_SENDER_ID").unwrap_or_else(|_| "FIELDFORCE".to_string()),
        );
        if let Ok(channel) = env::var("NOTIFY_DEFAULT_CHANNEL") {
            match NotificationChannel::parse(&channel) {
                Some(parsed) => service.default_channel = parsed,
                None => tracing::warn!(
                    "Unknown NOTIFY_DEFAULT_CHANNEL {:?}, keeping SMS",
                    channel
                ),
            }
        }
        service
    }

    pub fn default_channel(&self) -> NotificationChannel {
        self.default_channel
    }

    /// A missing credential makes every send a non-retryable failure; the
    /// reminder scan records it per order instead of aborting the batch.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    pub async fn send_message(
        &self,
        destination: &str,
        body: &str,
        channel: NotificationChannel,
    ) -> Result<SendOutcome, ServiceError> {
        if !self.is_configured() {
            return Err(ServiceError::ExternalService(
                "notification provider not configured".to_string(),
            ));
        }

        tracing::debug!(
            channel = channel.as_str(),
            destination = %destination,
            "Sending notification"
        );

        let url = format!("{}/messages", self.base_url);
        let payload = json!({
            "to": destination,
            "body": body,
            "channel": channel.as_str(),
            "sender_id": self.sender_id,
        });

        let response = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("notification send failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::ExternalService(format!("notification send failed: {e}")))?;

        if !status.is_success() {
            return Ok(SendOutcome {
                success: false,
                provider_message_id: None,
                raw_response: format!("HTTP {status}: {text}"),
            });
        }

        let parsed: ProviderResponse = serde_json::from_str(&text).unwrap_or_default();

        Ok(SendOutcome {
            success: true,
            provider_message_id: parsed.message_id.or(parsed.id),
            raw_response: text,
        })
    }
}
