use crate::cli::args::{RunArgs, ServeArgs};
use crate::core::completion::HttpCompletionClient;
use crate::core::config::{validate_config, validate_for_serve, ConfigLoader, SiteforgeConfig};
use crate::core::hosting::GithubHost;
use crate::core::notifier::NotificationSender;
use crate::core::orchestrator::RoundOrchestrator;
use crate::core::reconciler::DeploymentReconciler;
use crate::core::synthesizer::ManifestSynthesizer;
use crate::server::{self, AppState};
use crate::Result;
use siteforge_types::TaskRequest;
use std::sync::Arc;
use std::time::Duration;

fn build_orchestrator(config: &SiteforgeConfig) -> Result<Arc<RoundOrchestrator>> {
    let completion = Arc::new(HttpCompletionClient::new(&config.completion)?);
    let host = Arc::new(GithubHost::new(&config.github)?);
    let synthesizer = ManifestSynthesizer::new(completion, config.completion.max_output_tokens);
    let reconciler = DeploymentReconciler::new(host);
    let notifier = Arc::new(NotificationSender::new(Duration::from_millis(
        config.notifier.base_delay_ms,
    )));
    Ok(Arc::new(RoundOrchestrator::new(
        synthesizer,
        reconciler,
        notifier,
    )))
}

pub async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = ConfigLoader::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    validate_for_serve(&config)?;

    let state = Arc::new(AppState {
        orchestrator: build_orchestrator(&config)?,
        secret: config.server.secret.clone(),
    });
    server::serve(state, &config.server.bind).await?;
    Ok(())
}

pub async fn run_round(args: RunArgs) -> Result<()> {
    let config = ConfigLoader::load(args.config.as_deref())?;
    validate_config(&config)?;

    let orchestrator = build_orchestrator(&config)?;
    let request = TaskRequest {
        secret: String::new(),
        email: args.email.unwrap_or_else(|| "unknown".to_string()),
        task: args.task,
        round: args.round,
        nonce: "none".to_string(),
        brief: args.brief,
        checks: args.checks,
        evaluation_url: args.evaluation_url,
        attachments: Vec::new(),
    };

    let outcome = orchestrator.handle(request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
