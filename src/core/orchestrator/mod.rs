#![allow(clippy::result_large_err)]

//! Round orchestration: one task request in, one round outcome out.
//!
//! Pure composition over the synthesizer, the reconciler, and the notifier.
//! This is the one place upstream failures become visible to the caller.

use crate::core::error::AppError;
use crate::core::notifier::NotificationSender;
use crate::core::reconciler::{derived_target, fallback_target, DeploymentReconciler};
use crate::core::synthesizer::ManifestSynthesizer;
use crate::core::types::Strategy;
use siteforge_types::{EvaluationPayload, RoundOutcome, TaskRequest};
use std::sync::Arc;

pub struct RoundOrchestrator {
    synthesizer: ManifestSynthesizer,
    reconciler: DeploymentReconciler,
    notifier: Arc<NotificationSender>,
}

impl RoundOrchestrator {
    pub fn new(
        synthesizer: ManifestSynthesizer,
        reconciler: DeploymentReconciler,
        notifier: Arc<NotificationSender>,
    ) -> Self {
        RoundOrchestrator {
            synthesizer,
            reconciler,
            notifier,
        }
    }

    /// Run one round: synthesize, reconcile, notify, respond.
    pub async fn handle(&self, request: TaskRequest) -> Result<RoundOutcome, AppError> {
        tracing::info!(task = %request.task, round = request.round, "handling round");

        let manifest = self
            .synthesizer
            .synthesize(&request.brief, request.round, &request.checks)
            .await;

        let target = derived_target(&request.task);
        let strategy = if request.round <= 1 {
            Strategy::CreateFresh
        } else {
            Strategy::ReplaceInPlace
        };

        let outcome = match self
            .reconciler
            .reconcile(&target, &manifest, &request.attachments, strategy)
            .await
        {
            Ok(outcome) => outcome,
            Err(error) if request.round >= 2 => {
                // Replacement against the derived name failed (the round-1
                // repository may never have existed, or the push was
                // rejected). Retry once against a fresh target with round-1
                // semantics.
                let retry_target = fallback_target(&request.task, request.round);
                tracing::warn!(
                    task = %request.task,
                    round = request.round,
                    %error,
                    retry_target = %retry_target,
                    "replacement failed, retrying with a fresh target"
                );
                self.reconciler
                    .reconcile(
                        &retry_target,
                        &manifest,
                        &request.attachments,
                        Strategy::CreateFresh,
                    )
                    .await?
            }
            Err(error) => return Err(error),
        };

        for soft_failure in &outcome.soft_failures {
            tracing::warn!(repository = %outcome.target, %soft_failure, "best-effort step failed");
        }

        if let Some(callback_url) = request.evaluation_url.clone() {
            let payload = EvaluationPayload {
                email: request.email.clone(),
                task: request.task.clone(),
                round: request.round,
                nonce: request.nonce.clone(),
                repo_url: outcome.repo_url.clone(),
                commit_sha: outcome.revision.clone(),
                pages_url: outcome.pages_url.clone(),
            };
            let notifier = Arc::clone(&self.notifier);
            tokio::spawn(async move {
                notifier.notify(&callback_url, &payload).await;
            });
        }

        tracing::info!(
            task = %request.task,
            round = request.round,
            repository = %outcome.target,
            revision = %outcome.revision,
            "round complete"
        );

        Ok(RoundOutcome {
            status: "ok".to_string(),
            task: request.task,
            round: request.round,
            repo_url: outcome.repo_url,
            pages_url: outcome.pages_url,
        })
    }
}
