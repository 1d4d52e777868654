#![allow(clippy::result_large_err)]

//! Pluggable text-completion capability.
//!
//! The synthesizer only depends on the [`CompletionClient`] trait; the
//! production implementation speaks an OpenAI-compatible chat-completions
//! endpoint over HTTPS and retries once on a transient-unavailable signal.

use crate::core::config::CompletionConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

const TRANSIENT_RETRY_DELAY_MS: u64 = 500;

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion call. Errors on hard failure statuses; the caller
    /// decides how to degrade.
    async fn complete(
        &self,
        system_instruction: &str,
        user_instruction: &str,
        max_output_tokens: u32,
    ) -> Result<String, AppError>;
}

pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("siteforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::InternalError,
                    format!("failed to build HTTP client: {}", e),
                )
            })?;
        Ok(HttpCompletionClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn is_transient_status(status: reqwest::StatusCode) -> bool {
        status.as_u16() == 429 || status.is_server_error()
    }

    fn extract_content(value: &Value) -> Option<String> {
        value
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
            .map(str::to_string)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        system_instruction: &str,
        user_instruction: &str,
        max_output_tokens: u32,
    ) -> Result<String, AppError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_instruction},
                {"role": "user", "content": user_instruction},
            ],
            "max_tokens": max_output_tokens,
        });

        // One retry on a transient-unavailable signal, then hard failure.
        for attempt in 0..2u8 {
            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match response {
                Err(e) => {
                    let transient = e.is_timeout() || e.is_connect();
                    if transient && attempt == 0 {
                        tracing::warn!(error = %e, "completion request failed, retrying once");
                        tokio::time::sleep(Duration::from_millis(TRANSIENT_RETRY_DELAY_MS)).await;
                        continue;
                    }
                    return Err(AppError::new(
                        ErrorCategory::CompletionError,
                        format!("completion request failed: {}", e),
                    )
                    .with_code("COMPLETE-001"));
                }
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let value: Value = response.json().await.map_err(|e| {
                            AppError::new(
                                ErrorCategory::CompletionError,
                                format!("completion response was not JSON: {}", e),
                            )
                            .with_code("COMPLETE-002")
                        })?;
                        return Self::extract_content(&value).ok_or_else(|| {
                            AppError::new(
                                ErrorCategory::CompletionError,
                                "completion response carried no message content",
                            )
                            .with_code("COMPLETE-002")
                        });
                    }
                    if Self::is_transient_status(status) && attempt == 0 {
                        tracing::warn!(status = %status, "completion endpoint unavailable, retrying once");
                        tokio::time::sleep(Duration::from_millis(TRANSIENT_RETRY_DELAY_MS)).await;
                        continue;
                    }
                    let detail = response.text().await.unwrap_or_default();
                    return Err(AppError::new(
                        ErrorCategory::CompletionError,
                        format!("completion endpoint returned {}: {}", status, detail),
                    )
                    .with_code("COMPLETE-003"));
                }
            }
        }

        Err(AppError::new(
            ErrorCategory::CompletionError,
            "completion retries exhausted",
        )
        .with_code("COMPLETE-001"))
    }
}
