mod loader;
mod validation;

pub use loader::ConfigLoader;
pub use validation::{validate_config, validate_for_serve};

use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "siteforge.toml";

/// Explicit configuration struct constructed at startup and passed into the
/// orchestrator stack. Core logic never reads ambient global state.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteforgeConfig {
    pub server: ServerConfig,
    pub github: GithubConfig,
    pub completion: CompletionConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub bind: String,
    /// Shared secret the caller must present. Required for `serve`.
    pub secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:8080".to_string(),
            secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GithubConfig {
    /// Account that owns the generated repositories.
    pub user: String,
    /// Access token used for the REST API and authenticated pushes.
    pub token: String,
    /// REST API base, overridable for enterprise installs and tests.
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            user: String::new(),
            token: String::new(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub max_output_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        CompletionConfig {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            max_output_tokens: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifierConfig {
    /// Base delay in milliseconds; backoff waits are multiples of it.
    pub base_delay_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        NotifierConfig {
            base_delay_ms: 1000,
        }
    }
}
