#![allow(clippy::result_large_err)]

mod commit;

pub use commit::CommitManager;

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git operations manager - facade for version-control operations against a
/// scratch workspace.
pub struct GitManager {
    workspace_path: PathBuf,
}

pub(crate) fn run_git(workspace: &Path, args: &[&str], action: &str) -> Result<Output, AppError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(workspace)
        .output()
        .map_err(|e| {
            AppError::new(
                ErrorCategory::DeploymentError,
                format!("failed to spawn git while {}: {}", action, e),
            )
            .with_code("GIT-001")
        })?;

    if !output.status.success() {
        return Err(AppError::new(
            ErrorCategory::DeploymentError,
            format!(
                "git {} failed: {}",
                action,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        )
        .with_code("GIT-002"));
    }

    Ok(output)
}

impl GitManager {
    /// Create a new GitManager for the given workspace
    pub fn new(workspace_path: &Path) -> Self {
        Self {
            workspace_path: workspace_path.to_path_buf(),
        }
    }

    /// Initialize a fresh repository on the given branch (`git init -b`).
    pub fn init(&self, branch: &str) -> Result<(), AppError> {
        run_git(&self.workspace_path, &["init", "-b", branch], "init")?;
        Ok(())
    }

    /// Clone a remote into the given (existing, empty) workspace directory.
    pub fn clone_remote(remote: &str, workspace_path: &Path) -> Result<Self, AppError> {
        run_git(workspace_path, &["clone", remote, "."], "clone")?;
        Ok(Self::new(workspace_path))
    }

    /// Check if the workspace is a git repository
    pub fn is_git_repo(&self) -> bool {
        self.workspace_path.join(".git").exists()
    }

    /// Set the committer identity in the repository-local config.
    pub fn configure_identity(&self, name: &str, email: &str) -> Result<(), AppError> {
        run_git(
            &self.workspace_path,
            &["config", "user.name", name],
            "config user.name",
        )?;
        run_git(
            &self.workspace_path,
            &["config", "user.email", email],
            "config user.email",
        )?;
        Ok(())
    }

    /// Point a named remote at a URL, replacing any previous value.
    pub fn set_remote(&self, name: &str, url: &str) -> Result<(), AppError> {
        let existing = Command::new("git")
            .args(["remote", "get-url", name])
            .current_dir(&self.workspace_path)
            .output();
        let args: [&str; 4] = match existing {
            Ok(output) if output.status.success() => ["remote", "set-url", name, url],
            _ => ["remote", "add", name, url],
        };
        run_git(&self.workspace_path, &args, "remote")?;
        Ok(())
    }

    /// Get the current revision id (`git rev-parse HEAD`).
    pub fn head_revision(&self) -> Result<String, AppError> {
        let output = run_git(&self.workspace_path, &["rev-parse", "HEAD"], "rev-parse")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Get a CommitManager instance
    pub fn commit_manager(&self) -> CommitManager {
        CommitManager::new(&self.workspace_path)
    }
}
