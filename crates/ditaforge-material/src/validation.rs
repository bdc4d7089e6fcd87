//! Preflight validation.
//!
//! Pure validation of preconditions for safe materialization. Nothing
//! here creates directories or touches execution reports; validators
//! exist to fail loudly before irreversible work begins.

use crate::error::MaterializationError;
use ditaforge_core::Plan;
use std::path::{Path, PathBuf};

/// Semantic preflight validator, injected into the orchestrator.
pub trait PreflightValidator {
    fn validate_preflight(&self, plan: &Plan) -> Result<(), MaterializationError>;
}

/// Default validator: accepts everything.
///
/// Exists so the orchestrator can be wired before real validators are
/// needed; replace as the safety surface grows.
#[derive(Debug, Clone, Default)]
pub struct NoOpValidator;

impl PreflightValidator for NoOpValidator {
    fn validate_preflight(&self, _plan: &Plan) -> Result<(), MaterializationError> {
        Ok(())
    }
}

/// Structural validator: the plan must be actionable and the target
/// root must not be occupied by a non-directory.
#[derive(Debug, Clone)]
pub struct PlanValidator {
    target_root: PathBuf,
}

impl PlanValidator {
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
        }
    }

    fn validate_target_root(&self, root: &Path) -> Result<(), MaterializationError> {
        if root.exists() && !root.is_dir() {
            return Err(MaterializationError::Validation(format!(
                "target root exists but is not a directory: {}",
                root.display()
            )));
        }
        Ok(())
    }
}

impl PreflightValidator for PlanValidator {
    fn validate_preflight(&self, plan: &Plan) -> Result<(), MaterializationError> {
        tracing::debug!(actions = plan.len(), "Validating materialization preconditions");

        if plan.is_empty() {
            return Err(MaterializationError::Validation(
                "plan contains no actions; materialization is meaningless".into(),
            ));
        }

        self.validate_target_root(&self.target_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditaforge_core::Action;
    use tempfile::TempDir;

    fn one_action_plan() -> Plan {
        Plan::new(vec![Action {
            id: "a1".into(),
            action_type: "copy_topic".into(),
            target: "content/a.dita".into(),
            reason: "test".into(),
            parameters: Default::default(),
            dry_run: false,
        }])
    }

    #[test]
    fn test_empty_plan_rejected() {
        let dir = TempDir::new().unwrap();
        let validator = PlanValidator::new(dir.path());
        let err = validator.validate_preflight(&Plan::new(vec![])).unwrap_err();
        assert!(matches!(err, MaterializationError::Validation(_)));
    }

    #[test]
    fn test_file_at_target_root_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("occupied");
        std::fs::write(&root, "x").unwrap();

        let validator = PlanValidator::new(&root);
        assert!(validator.validate_preflight(&one_action_plan()).is_err());
    }

    #[test]
    fn test_missing_target_root_is_fine() {
        let dir = TempDir::new().unwrap();
        let validator = PlanValidator::new(dir.path().join("not-yet"));
        validator.validate_preflight(&one_action_plan()).unwrap();
    }

    #[test]
    fn test_noop_validator_accepts_anything() {
        NoOpValidator.validate_preflight(&Plan::new(vec![])).unwrap();
    }
}
