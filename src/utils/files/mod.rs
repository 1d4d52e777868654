#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolve a relative manifest path under a workspace root.
///
/// Absolute paths and `..` components are rejected so a manifest entry can
/// never escape the scratch workspace.
pub fn resolve_relative(root: &Path, relative: &str) -> Result<PathBuf, AppError> {
    let candidate = Path::new(relative);
    if candidate.components().any(|component| {
        !matches!(
            component,
            Component::Normal(_) | Component::CurDir
        )
    }) {
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("file path '{}' escapes the workspace", relative),
        )
        .with_code("FILES-001"));
    }
    Ok(root.join(candidate))
}

pub fn write_text(root: &Path, relative: &str, content: &str) -> Result<PathBuf, AppError> {
    write_bytes(root, relative, content.as_bytes())
}

pub fn write_bytes(root: &Path, relative: &str, content: &[u8]) -> Result<PathBuf, AppError> {
    let path = resolve_relative(root, relative)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content).map_err(|e| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to write {}: {}", path.display(), e),
        )
    })?;
    Ok(path)
}
