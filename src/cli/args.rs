use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Socket address to bind (overrides server.bind from the config file)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Path to custom config file (default: ./siteforge.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Task identifier; the target repository name is derived from it
    #[arg(long, value_name = "ID")]
    pub task: String,

    /// Brief describing the site to generate
    #[arg(long, value_name = "TEXT")]
    pub brief: String,

    /// Round number (1 creates, 2+ regenerates)
    #[arg(long, default_value = "1", value_name = "N")]
    pub round: u32,

    /// Evaluation check hint, repeatable
    #[arg(long = "check", value_name = "TEXT")]
    pub checks: Vec<String>,

    /// Caller email passed through to the evaluation callback
    #[arg(long, value_name = "EMAIL", help_heading = "Callback")]
    pub email: Option<String>,

    /// Evaluation callback URL to notify on completion
    #[arg(long, value_name = "URL", help_heading = "Callback")]
    pub evaluation_url: Option<String>,

    /// Path to custom config file (default: ./siteforge.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}
