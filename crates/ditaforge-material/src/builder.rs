//! Target root preparation.
//!
//! The builder answers one question: "can we write to the target
//! location?" It prepares the place; it does not decide whether the run
//! is safe. Safety is the orchestrator's job.

use crate::error::MaterializationError;
use std::fs;
use std::path::{Path, PathBuf};

/// Prepares the filesystem destination for materialization output.
pub trait TargetBuilder {
    /// Ensure the target is ready. Idempotent; no content mutation.
    fn build(&self) -> Result<(), MaterializationError>;
}

/// Default builder: ensures the target root exists, is a directory, and
/// is writable.
#[derive(Debug, Clone)]
pub struct TargetRootBuilder {
    target_root: PathBuf,
}

impl TargetRootBuilder {
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
        }
    }
}

impl TargetBuilder for TargetRootBuilder {
    fn build(&self) -> Result<(), MaterializationError> {
        let root = &self.target_root;
        tracing::info!(target_root = %root.display(), "Preparing materialization target root");

        fs::create_dir_all(root).map_err(|e| MaterializationError::TargetRoot {
            path: root.clone(),
            reason: format!("unable to create directory: {e}"),
        })?;

        if !root.is_dir() {
            return Err(MaterializationError::TargetRoot {
                path: root.clone(),
                reason: "exists but is not a directory".into(),
            });
        }

        probe_writable(root)?;

        tracing::info!(target_root = %root.display(), "Target root prepared");
        Ok(())
    }
}

/// Deterministic writability probe: create and delete a tiny sentinel
/// file. Avoids platform-specific permission guessing.
fn probe_writable(root: &Path) -> Result<(), MaterializationError> {
    let sentinel = root.join(".materialization_write_probe");

    fs::write(&sentinel, b"probe").map_err(|e| MaterializationError::TargetRoot {
        path: root.to_path_buf(),
        reason: format!("not writable: {e}"),
    })?;
    let _ = fs::remove_file(&sentinel);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_target_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("package/out");

        TargetRootBuilder::new(&root).build().unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_build_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let builder = TargetRootBuilder::new(dir.path());
        builder.build().unwrap();
        builder.build().unwrap();
    }

    #[test]
    fn test_file_at_target_root_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("occupied");
        std::fs::write(&root, "x").unwrap();

        let err = TargetRootBuilder::new(&root).build().unwrap_err();
        assert!(matches!(err, MaterializationError::TargetRoot { .. }));
    }
}
