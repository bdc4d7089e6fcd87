//! Filesystem mutation policy.
//!
//! Answers one question: "given a resolved target path, may this write
//! proceed?" The policy never mutates anything; it only authorizes or
//! rejects. Every write path in the execution layer must call
//! [`MutationPolicy::validate_target`] first and convert a violation
//! into a failed result with `failure_type = policy_violation`.

use crate::error::PolicyViolation;
use ditaforge_core::OverwriteMode;
use std::path::Path;

/// Mutation policy evaluator for one overwrite mode.
#[derive(Debug, Clone, Copy)]
pub struct MutationPolicy {
    overwrite: OverwriteMode,
}

impl MutationPolicy {
    pub fn new(overwrite: OverwriteMode) -> Self {
        tracing::debug!(%overwrite, "MutationPolicy initialized");
        Self { overwrite }
    }

    /// The configured overwrite mode.
    pub fn overwrite(&self) -> OverwriteMode {
        self.overwrite
    }

    /// Decide whether a target path may be written.
    ///
    /// Creation of a nonexistent target is always allowed. For existing
    /// targets the mode decides: `deny` and `skip` both raise a policy
    /// violation with distinct messages, `replace` allows the write.
    pub fn validate_target(&self, target: &Path) -> Result<(), PolicyViolation> {
        let exists = target.exists();

        tracing::debug!(
            target = %target.display(),
            exists,
            mode = %self.overwrite,
            "Validating mutation target"
        );

        if !exists {
            return Ok(());
        }

        match self.overwrite {
            OverwriteMode::Replace => Ok(()),
            OverwriteMode::Deny => {
                tracing::warn!(target = %target.display(), "Overwrite denied by policy");
                Err(PolicyViolation::new(
                    format!("overwrite denied for existing path: {}", target.display()),
                    target,
                ))
            }
            OverwriteMode::Skip => {
                tracing::info!(target = %target.display(), "Write skipped by policy");
                Err(PolicyViolation::new(
                    format!("write skipped for existing path: {}", target.display()),
                    target,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_nonexistent_target_always_allowed() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("new.dita");

        for mode in [OverwriteMode::Deny, OverwriteMode::Replace, OverwriteMode::Skip] {
            assert!(MutationPolicy::new(mode).validate_target(&target).is_ok());
        }
    }

    #[test]
    fn test_deny_blocks_existing_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("existing.dita");
        fs::write(&target, "x").unwrap();

        let err = MutationPolicy::new(OverwriteMode::Deny)
            .validate_target(&target)
            .unwrap_err();
        assert!(err.message.contains("denied"));
        assert_eq!(err.target, target);
    }

    #[test]
    fn test_skip_blocks_existing_target_with_distinct_message() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("existing.dita");
        fs::write(&target, "x").unwrap();

        let err = MutationPolicy::new(OverwriteMode::Skip)
            .validate_target(&target)
            .unwrap_err();
        assert!(err.message.contains("skipped"));
    }

    #[test]
    fn test_replace_allows_existing_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("existing.dita");
        fs::write(&target, "x").unwrap();

        assert!(MutationPolicy::new(OverwriteMode::Replace)
            .validate_target(&target)
            .is_ok());
    }
}
