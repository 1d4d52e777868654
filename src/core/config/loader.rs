#![allow(clippy::result_large_err)]

use super::{SiteforgeConfig, DEFAULT_CONFIG_FILE};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config with deterministic precedence: defaults, config file,
    /// environment overrides.
    ///
    /// Without an explicit path, a missing `siteforge.toml` in the working
    /// directory is fine (defaults + env vars apply). An explicit path that
    /// does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<SiteforgeConfig, AppError> {
        let resolved: PathBuf = match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(AppError::new(
                        ErrorCategory::ConfigError,
                        format!("config file not found: {}", explicit.display()),
                    ));
                }
                explicit.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let mut config = Self::load_from_file(&resolved)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from a specific file path. Returns Ok(None) if the file
    /// doesn't exist.
    pub fn load_from_file(path: &Path) -> Result<Option<SiteforgeConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: SiteforgeConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides. Environment variables take
    /// precedence over config file values.
    fn apply_env_overrides(config: &mut SiteforgeConfig) {
        if let Ok(bind) = env::var("SITEFORGE_BIND") {
            config.server.bind = bind;
        }
        if let Ok(secret) = env::var("SITEFORGE_SECRET") {
            config.server.secret = secret;
        }

        if let Ok(user) = env::var("SITEFORGE_GITHUB_USER") {
            config.github.user = user;
        }
        if let Ok(token) = env::var("GITHUB_TOKEN") {
            config.github.token = token;
        }
        if let Ok(api_base) = env::var("SITEFORGE_GITHUB_API_BASE") {
            config.github.api_base = api_base;
        }

        if let Ok(model) = env::var("SITEFORGE_MODEL") {
            config.completion.model = model;
        }
        if let Ok(base_url) = env::var("SITEFORGE_COMPLETION_BASE_URL") {
            config.completion.base_url = base_url;
        }
        if let Ok(api_key) = env::var("SITEFORGE_COMPLETION_API_KEY") {
            config.completion.api_key = api_key;
        }
        if let Ok(max_tokens) = env::var("SITEFORGE_MAX_OUTPUT_TOKENS") {
            if let Ok(max_tokens) = max_tokens.parse::<u32>() {
                config.completion.max_output_tokens = max_tokens;
            }
        }

        if let Ok(base_delay) = env::var("SITEFORGE_NOTIFY_BASE_DELAY_MS") {
            if let Ok(base_delay) = base_delay.parse::<u64>() {
                config.notifier.base_delay_ms = base_delay;
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "SITEFORGE_BIND - Override server bind address (default: 0.0.0.0:8080)",
            "SITEFORGE_SECRET - Override the shared request secret",
            "SITEFORGE_GITHUB_USER - Override the repository-owning account",
            "GITHUB_TOKEN - Access token for the hosting API and pushes",
            "SITEFORGE_GITHUB_API_BASE - Override the hosting API base URL",
            "SITEFORGE_MODEL - Override the completion model identifier",
            "SITEFORGE_COMPLETION_BASE_URL - Override the completion endpoint base URL",
            "SITEFORGE_COMPLETION_API_KEY - API key for the completion endpoint",
            "SITEFORGE_MAX_OUTPUT_TOKENS - Override the completion output token cap",
            "SITEFORGE_NOTIFY_BASE_DELAY_MS - Override the callback retry base delay",
        ]
    }
}
