#![allow(clippy::result_large_err)]

//! Deployment reconciliation: bring a remote repository's working tree to
//! match a manifest.
//!
//! Every attempt runs in its own scratch workspace, removed on exit whatever
//! the outcome. Command and network failures are fatal to the attempt;
//! page-hosting enablement and individual attachment decoding are best-effort
//! and surface as typed [`SoftFailure`] values instead.

use crate::core::error::AppError;
use crate::core::git::GitManager;
use crate::core::hosting::RepositoryHost;
use crate::core::manifest::Manifest;
use crate::core::types::{ErrorCategory, Strategy};
use crate::utils::files;
use base64::Engine as _;
use rand::Rng;
use siteforge_types::Attachment;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_BRANCH: &str = "main";
const COMMITTER_NAME: &str = "siteforge";
const COMMITTER_EMAIL: &str = "siteforge@users.noreply.github.com";

/// Derived repository name for a task.
pub fn derived_target(task: &str) -> String {
    format!("{}-auto", task)
}

/// Fresh, round-and-randomness-suffixed target name used when a round >= 2
/// reconciliation fails against the derived name.
pub fn fallback_target(task: &str, round: u32) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{}-auto-r{}-{}", task, round, suffix)
}

/// Best-effort step that failed without failing the deployment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SoftFailure {
    #[error("attachment '{name}' skipped: {reason}")]
    AttachmentSkipped { name: String, reason: String },
    #[error("page hosting enable failed: {reason}")]
    PagesEnableFailed { reason: String },
}

/// Result of one successful reconciliation.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub target: String,
    pub repo_url: String,
    pub pages_url: String,
    pub revision: String,
    pub soft_failures: Vec<SoftFailure>,
}

pub struct DeploymentReconciler {
    host: Arc<dyn RepositoryHost>,
}

impl DeploymentReconciler {
    pub fn new(host: Arc<dyn RepositoryHost>) -> Self {
        DeploymentReconciler { host }
    }

    /// Bring the remote named `target` in line with the manifest.
    ///
    /// The scratch workspace is created per attempt and removed on return,
    /// success or failure.
    pub async fn reconcile(
        &self,
        target: &str,
        manifest: &Manifest,
        attachments: &[Attachment],
        strategy: Strategy,
    ) -> Result<DeployOutcome, AppError> {
        let scratch = tempfile::tempdir().map_err(|e| {
            AppError::new(
                ErrorCategory::DeploymentError,
                format!("failed to create scratch workspace: {}", e),
            )
            .with_code("DEPLOY-001")
        })?;

        tracing::info!(repository = target, ?strategy, workspace = %scratch.path().display(), "reconciling");

        match strategy {
            Strategy::CreateFresh => {
                self.create_fresh(scratch.path(), target, manifest, attachments)
                    .await
            }
            Strategy::ReplaceInPlace => {
                self.replace_in_place(scratch.path(), target, manifest, attachments)
                    .await
            }
        }
    }

    async fn create_fresh(
        &self,
        workspace: &Path,
        target: &str,
        manifest: &Manifest,
        attachments: &[Attachment],
    ) -> Result<DeployOutcome, AppError> {
        let mut soft_failures = Vec::new();
        materialize(workspace, manifest, attachments, &mut soft_failures)?;

        self.host.ensure_repository(target).await?;

        let git = GitManager::new(workspace);
        git.init(DEFAULT_BRANCH)?;
        git.configure_identity(COMMITTER_NAME, COMMITTER_EMAIL)?;
        git.set_remote("origin", &self.host.remote_url(target))?;

        let commits = git.commit_manager();
        commits.commit_all("Publish generated site")?;
        // Overwrite push: this path treats the workspace as the sole source
        // of truth for a fresh repository.
        commits.force_push(DEFAULT_BRANCH)?;

        if let Err(error) = self.host.enable_pages(target).await {
            soft_failures.push(SoftFailure::PagesEnableFailed {
                reason: error.to_string(),
            });
        }

        let revision = git.head_revision()?;
        Ok(DeployOutcome {
            target: target.to_string(),
            repo_url: self.host.repo_url(target),
            pages_url: self.host.pages_url(target),
            revision,
            soft_failures,
        })
    }

    async fn replace_in_place(
        &self,
        workspace: &Path,
        target: &str,
        manifest: &Manifest,
        attachments: &[Attachment],
    ) -> Result<DeployOutcome, AppError> {
        let git = GitManager::clone_remote(&self.host.remote_url(target), workspace)?;
        git.configure_identity(COMMITTER_NAME, COMMITTER_EMAIL)?;

        // Full regeneration: a later round replaces everything, never patches.
        wipe_worktree(workspace)?;

        let mut soft_failures = Vec::new();
        materialize(workspace, manifest, attachments, &mut soft_failures)?;

        let commits = git.commit_manager();
        if commits.has_changes()? {
            commits.commit_all("Regenerate site")?;
            commits.push("HEAD")?;
        } else {
            // Content-identical regeneration must not create an empty
            // revision or fail with "nothing to commit".
            tracing::info!(repository = target, "working tree unchanged, skipping commit and push");
        }

        let revision = git.head_revision()?;
        Ok(DeployOutcome {
            target: target.to_string(),
            repo_url: self.host.repo_url(target),
            pages_url: self.host.pages_url(target),
            revision,
            soft_failures,
        })
    }
}

/// Write every manifest entry and every decodable attachment into the
/// workspace. Attachment problems are soft failures; manifest write problems
/// are fatal.
fn materialize(
    workspace: &Path,
    manifest: &Manifest,
    attachments: &[Attachment],
    soft_failures: &mut Vec<SoftFailure>,
) -> Result<(), AppError> {
    for (name, content) in manifest.iter() {
        files::write_text(workspace, name, content)?;
    }

    for attachment in attachments {
        match decode_payload(&attachment.payload) {
            Ok(bytes) => {
                if let Err(error) = files::write_bytes(workspace, &attachment.name, &bytes) {
                    tracing::warn!(name = %attachment.name, %error, "failed to write attachment");
                    soft_failures.push(SoftFailure::AttachmentSkipped {
                        name: attachment.name.clone(),
                        reason: error.message,
                    });
                }
            }
            Err(reason) => {
                tracing::warn!(name = %attachment.name, %reason, "failed to decode attachment");
                soft_failures.push(SoftFailure::AttachmentSkipped {
                    name: attachment.name.clone(),
                    reason,
                });
            }
        }
    }

    Ok(())
}

/// Decode a base64 data URI (or bare base64 text) into bytes.
fn decode_payload(payload: &str) -> Result<Vec<u8>, String> {
    let encoded = match payload.find("base64,") {
        Some(index) => &payload[index + "base64,".len()..],
        None => payload,
    };
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("invalid base64 payload: {}", e))
}

/// Remove every entry of the working tree except the version-control
/// metadata directory.
fn wipe_worktree(workspace: &Path) -> Result<(), AppError> {
    for entry in fs::read_dir(workspace)? {
        let entry = entry?;
        if entry.file_name().to_str() == Some(".git") {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
