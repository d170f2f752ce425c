//! Outbound webhook delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::payload::SlackPayload;

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Webhook responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Trait for webhook delivery, so the pipeline can run against a recording
/// fake in tests.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn deliver(&self, payload: &SlackPayload) -> Result<(), WebhookError>;
}

/// Delivers payloads to a Slack incoming-webhook URL as JSON POSTs.
pub struct SlackWebhook {
    client: Client,
    url: String,
    timeout: Duration,
}

impl SlackWebhook {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl WebhookSender for SlackWebhook {
    async fn deliver(&self, payload: &SlackPayload) -> Result<(), WebhookError> {
        debug!("Posting notification payload to webhook");

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebhookError::Timeout
                } else {
                    WebhookError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
