//! Best-effort delivery of round-completion events to the evaluation
//! callback.
//!
//! Fire-and-forget from the orchestrator's perspective: delivery outcome
//! never affects the response to the caller. Retries use a fixed backoff
//! sequence; exhausting it is logged, not escalated.

use siteforge_types::EvaluationPayload;
use std::time::Duration;

/// Backoff waits, in base-delay units, applied before each retry attempt.
const RETRY_DELAY_UNITS: [u32; 4] = [1, 2, 4, 8];

/// Error types for callback delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("network error: {0}")]
    Network(String),
    #[error("callback returned status {0}")]
    Status(u16),
    #[error("notification retries exhausted")]
    RetriesExhausted,
}

pub struct NotificationSender {
    client: reqwest::Client,
    base_delay: Duration,
}

impl NotificationSender {
    pub fn new(base_delay: Duration) -> Self {
        NotificationSender {
            client: reqwest::Client::new(),
            base_delay,
        }
    }

    /// Deliver the payload, logging the final outcome. Never escalates.
    pub async fn notify(&self, callback_url: &str, payload: &EvaluationPayload) {
        match self.send_with_retry(callback_url, payload).await {
            Ok(()) => {
                tracing::debug!(url = callback_url, task = %payload.task, "evaluation callback delivered");
            }
            Err(error) => {
                tracing::warn!(
                    url = callback_url,
                    task = %payload.task,
                    %error,
                    "evaluation callback delivery failed, giving up"
                );
            }
        }
    }

    /// Deliver with bounded retry: an initial attempt, then one retry after
    /// each wait in the backoff sequence. The first success-range status
    /// stops retrying.
    pub async fn send_with_retry(
        &self,
        callback_url: &str,
        payload: &EvaluationPayload,
    ) -> Result<(), NotifyError> {
        match self.send_once(callback_url, payload).await {
            Ok(()) => return Ok(()),
            Err(error) => {
                tracing::warn!(url = callback_url, %error, attempt = 1, "evaluation callback attempt failed");
            }
        }

        for (retry, units) in RETRY_DELAY_UNITS.iter().enumerate() {
            tokio::time::sleep(self.base_delay * *units).await;
            match self.send_once(callback_url, payload).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::warn!(
                        url = callback_url,
                        %error,
                        attempt = retry + 2,
                        "evaluation callback attempt failed"
                    );
                }
            }
        }

        Err(NotifyError::RetriesExhausted)
    }

    async fn send_once(
        &self,
        callback_url: &str,
        payload: &EvaluationPayload,
    ) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(callback_url)
            .json(payload)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Status(status.as_u16()))
        }
    }
}
