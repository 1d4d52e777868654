#![allow(clippy::result_large_err)]

use super::SiteforgeConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::net::SocketAddr;
use url::Url;

/// Validate configuration values common to every command.
pub fn validate_config(config: &SiteforgeConfig) -> Result<(), AppError> {
    config.server.bind.parse::<SocketAddr>().map_err(|e| {
        AppError::new(
            ErrorCategory::ConfigError,
            format!("server.bind '{}' is not a socket address: {}", config.server.bind, e),
        )
    })?;

    if config.github.user.trim().is_empty() {
        return Err(AppError::new(
            ErrorCategory::ConfigError,
            "github.user must be set",
        ));
    }

    Url::parse(&config.github.api_base).map_err(|e| {
        AppError::new(
            ErrorCategory::ConfigError,
            format!("github.api_base is not a valid URL: {}", e),
        )
    })?;

    if config.completion.model.trim().is_empty() {
        return Err(AppError::new(
            ErrorCategory::ConfigError,
            "completion.model must be set",
        ));
    }

    Url::parse(&config.completion.base_url).map_err(|e| {
        AppError::new(
            ErrorCategory::ConfigError,
            format!("completion.base_url is not a valid URL: {}", e),
        )
    })?;

    if config.completion.max_output_tokens == 0 {
        return Err(AppError::new(
            ErrorCategory::ConfigError,
            "completion.max_output_tokens must be greater than zero",
        ));
    }

    Ok(())
}

/// Additional checks for running the HTTP service.
pub fn validate_for_serve(config: &SiteforgeConfig) -> Result<(), AppError> {
    validate_config(config)?;

    if config.server.secret.trim().is_empty() {
        return Err(AppError::new(
            ErrorCategory::ConfigError,
            "server.secret must be set to serve requests",
        ));
    }

    Ok(())
}
