mod args;
mod commands;

pub use args::{RunArgs, ServeArgs};

use crate::logging::{self, LoggingConfig};
use crate::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "siteforge",
    version,
    about = "Generate static sites from briefs and publish them to hosted git repositories"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service that accepts task requests
    Serve(ServeArgs),
    /// Execute a single round locally and print the outcome
    Run(RunArgs),
}

fn config_path(command: &Commands) -> Option<PathBuf> {
    match command {
        Commands::Serve(args) => args.config.clone(),
        Commands::Run(args) => args.config.clone(),
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let logging_config = LoggingConfig::load(config_path(&cli.command).as_deref())?;
    let _guard = logging::init(&logging_config)?;

    match cli.command {
        Commands::Serve(args) => commands::serve(args).await,
        Commands::Run(args) => commands::run_round(args).await,
    }
}
