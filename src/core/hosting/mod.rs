#![allow(clippy::result_large_err)]

//! Repository hosting boundary.
//!
//! The reconciler only depends on [`RepositoryHost`]; the production
//! implementation talks to the GitHub REST API. URL derivation is a pure
//! string template over (user, repository name).

use crate::core::config::GithubConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use async_trait::async_trait;
use serde_json::json;

#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Ensure the remote repository exists. "Already exists" is success, so
    /// repeated round-1 calls stay idempotent at the existence level.
    async fn ensure_repository(&self, name: &str) -> Result<(), AppError>;

    /// Enable static-page hosting. Best-effort from the caller's perspective:
    /// the reconciler downgrades a failure here to a soft failure.
    async fn enable_pages(&self, name: &str) -> Result<(), AppError>;

    /// Authenticated push URL for the repository.
    fn remote_url(&self, name: &str) -> String;

    /// Canonical browse URL for the repository.
    fn repo_url(&self, name: &str) -> String;

    /// Canonical static-page hosting URL for the repository.
    fn pages_url(&self, name: &str) -> String;
}

pub struct GithubHost {
    client: reqwest::Client,
    api_base: String,
    user: String,
    token: String,
}

impl GithubHost {
    pub fn new(config: &GithubConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("siteforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::InternalError,
                    format!("failed to build HTTP client: {}", e),
                )
            })?;
        Ok(GithubHost {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl RepositoryHost for GithubHost {
    async fn ensure_repository(&self, name: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/user/repos", self.api_base))
            .bearer_auth(&self.token)
            .json(&json!({"name": name, "private": false, "auto_init": false}))
            .send()
            .await
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::DeploymentError,
                    format!("repository create request failed: {}", e),
                )
                .with_code("HOST-001")
            })?;

        match response.status().as_u16() {
            201 => Ok(()),
            // 422 is GitHub's "name already exists on this account"
            422 => {
                tracing::debug!(name, "repository already exists, continuing");
                Ok(())
            }
            status => {
                let detail = response.text().await.unwrap_or_default();
                Err(AppError::new(
                    ErrorCategory::DeploymentError,
                    format!("repository create for '{}' returned {}: {}", name, status, detail),
                )
                .with_code("HOST-002"))
            }
        }
    }

    async fn enable_pages(&self, name: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/repos/{}/{}/pages", self.api_base, self.user, name))
            .bearer_auth(&self.token)
            .json(&json!({"source": {"branch": "main", "path": "/"}}))
            .send()
            .await
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::DeploymentError,
                    format!("page hosting request failed: {}", e),
                )
                .with_code("HOST-003")
            })?;

        let status = response.status();
        // 409 means pages were already enabled for the repository
        if status.is_success() || status.as_u16() == 409 {
            return Ok(());
        }
        let detail = response.text().await.unwrap_or_default();
        Err(AppError::new(
            ErrorCategory::DeploymentError,
            format!("page hosting enable for '{}' returned {}: {}", name, status, detail),
        )
        .with_code("HOST-004"))
    }

    fn remote_url(&self, name: &str) -> String {
        format!(
            "https://{}:{}@github.com/{}/{}.git",
            self.user, self.token, self.user, name
        )
    }

    fn repo_url(&self, name: &str) -> String {
        format!("https://github.com/{}/{}", self.user, name)
    }

    fn pages_url(&self, name: &str) -> String {
        format!("https://{}.github.io/{}/", self.user, name)
    }
}
