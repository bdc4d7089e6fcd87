//! `delete_file` handler.
//!
//! Deletes `sandbox / target_path`. Idempotent: a missing target is a
//! skipped no-op, not a failure. Only files are deleted; directories are
//! rejected.

use crate::handlers::{handler_failure, policy_failure};
use crate::registry::{ActionHandler, HandlerContext};
use crate::HandlerError;
use ditaforge_core::{Action, ExecutionActionResult};
use std::fs;

pub struct DeleteFileHandler;

impl ActionHandler for DeleteFileHandler {
    fn action_type(&self) -> &str {
        "delete_file"
    }

    fn name(&self) -> &str {
        "DeleteFileHandler"
    }

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError> {
        let rel_target = match action.str_param("target_path") {
            Some(t) => t,
            None => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "missing required parameter: target_path",
                    "missing parameter",
                ))
            }
        };

        let target = ctx.sandbox.resolve(rel_target)?;

        tracing::info!(
            action_id = %action.id,
            dry_run = action.dry_run,
            target = %target.display(),
            "delete_file"
        );

        if action.dry_run {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                true,
                format!("dry-run: would delete file if present: {}", target.display()),
            ));
        }

        if !target.exists() {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                false,
                format!("file not present: {}", target.display()),
            ));
        }

        if !target.is_file() {
            return Ok(handler_failure(
                action,
                self.name(),
                format!("target is not a file: {}", target.display()),
                "not a file",
            ));
        }

        if let Err(violation) = ctx.policy.validate_target(&target) {
            return Ok(policy_failure(action, self.name(), violation));
        }

        if let Err(e) = fs::remove_file(&target) {
            tracing::error!(action_id = %action.id, error = %e, "Delete failed");
            return Ok(handler_failure(
                action,
                self.name(),
                format!("failed to delete {}", target.display()),
                e.to_string(),
            ));
        }

        tracing::info!(action_id = %action.id, target = %target.display(), "File deleted");
        Ok(ExecutionActionResult::success(
            &action.id,
            self.name(),
            false,
            format!("deleted {}", target.display()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditaforge_core::{ExecutionStatus, OverwriteMode};
    use ditaforge_safety::{MutationPolicy, Sandbox};
    use serde_json::json;
    use tempfile::TempDir;

    fn context(sandbox: &TempDir) -> HandlerContext {
        HandlerContext::new(
            sandbox.path(),
            Sandbox::new(sandbox.path()).unwrap(),
            MutationPolicy::new(OverwriteMode::Replace),
        )
    }

    fn delete_action(target: &str, dry_run: bool) -> Action {
        serde_json::from_value(json!({
            "id": "a1",
            "type": "delete_file",
            "target": target,
            "dry_run": dry_run,
            "parameters": { "target_path": target }
        }))
        .unwrap()
    }

    #[test]
    fn test_deletes_existing_file() {
        let sandbox = TempDir::new().unwrap();
        std::fs::write(sandbox.path().join("old.dita"), "x").unwrap();

        let result = DeleteFileHandler
            .execute(&context(&sandbox), &delete_action("old.dita", false))
            .unwrap();
        assert_eq!(result.status, ExecutionStatus::Success);
        assert!(!sandbox.path().join("old.dita").exists());
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let sandbox = TempDir::new().unwrap();
        let result = DeleteFileHandler
            .execute(&context(&sandbox), &delete_action("absent.dita", false))
            .unwrap();
        assert_eq!(result.status, ExecutionStatus::Skipped);
    }

    #[test]
    fn test_directory_target_fails() {
        let sandbox = TempDir::new().unwrap();
        std::fs::create_dir(sandbox.path().join("topics")).unwrap();

        let result = DeleteFileHandler
            .execute(&context(&sandbox), &delete_action("topics", false))
            .unwrap();
        assert_eq!(result.status, ExecutionStatus::Failed);
    }

    #[test]
    fn test_dry_run_leaves_file_in_place() {
        let sandbox = TempDir::new().unwrap();
        std::fs::write(sandbox.path().join("old.dita"), "x").unwrap();

        let result = DeleteFileHandler
            .execute(&context(&sandbox), &delete_action("old.dita", true))
            .unwrap();
        assert_eq!(result.status, ExecutionStatus::Skipped);
        assert!(sandbox.path().join("old.dita").exists());
    }
}
