#![allow(clippy::result_large_err)]

use super::run_git;
use crate::core::error::AppError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Manages git staging, commit, and push operations
pub struct CommitManager {
    workspace_path: PathBuf,
}

impl CommitManager {
    pub fn new(workspace_path: &Path) -> Self {
        Self {
            workspace_path: workspace_path.to_path_buf(),
        }
    }

    /// Check if the working tree differs from HEAD (`git status --porcelain`)
    pub fn has_changes(&self) -> Result<bool, AppError> {
        let output = run_git(
            &self.workspace_path,
            &["status", "--porcelain"],
            "status",
        )?;
        Ok(!output.stdout.is_empty())
    }

    /// Commit all changes (git add -A && git commit)
    pub fn commit_all(&self, message: &str) -> Result<(), AppError> {
        // No changes, nothing to commit - this is not an error
        if !self.has_changes()? {
            return Ok(());
        }

        run_git(&self.workspace_path, &["add", "-A"], "add")?;
        run_git(&self.workspace_path, &["commit", "-m", message], "commit")?;
        Ok(())
    }

    /// Push a refspec to origin (git push origin <refspec>)
    pub fn push(&self, refspec: &str) -> Result<(), AppError> {
        run_git(&self.workspace_path, &["push", "origin", refspec], "push")?;
        Ok(())
    }

    /// Force-set the remote branch to the local one, tracking it
    /// (git push --force --set-upstream origin <branch>)
    pub fn force_push(&self, branch: &str) -> Result<(), AppError> {
        run_git(
            &self.workspace_path,
            &["push", "--force", "--set-upstream", "origin", branch],
            "force push",
        )?;
        Ok(())
    }
}
