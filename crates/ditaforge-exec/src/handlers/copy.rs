//! File transport handlers.
//!
//! `copy_map`, `copy_topic`, `copy_media`, and `copy_file` share one
//! transport: a literal, byte-for-byte copy of
//! `source_root / source_path` into `sandbox / target_path`. No XML is
//! interpreted and no semantic logic runs here.

use crate::handlers::{handler_failure, policy_failure};
use crate::registry::{ActionHandler, HandlerContext};
use crate::HandlerError;
use ditaforge_core::{Action, ExecutionActionResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Pure-transport copy handler, parameterized by action type.
pub struct CopyHandler {
    action_type: &'static str,
    handler_name: &'static str,
    noun: &'static str,
}

impl CopyHandler {
    pub fn copy_map() -> Self {
        Self {
            action_type: "copy_map",
            handler_name: "CopyMapHandler",
            noun: "map",
        }
    }

    pub fn copy_topic() -> Self {
        Self {
            action_type: "copy_topic",
            handler_name: "CopyTopicHandler",
            noun: "topic",
        }
    }

    pub fn copy_media() -> Self {
        Self {
            action_type: "copy_media",
            handler_name: "CopyMediaHandler",
            noun: "media file",
        }
    }

    pub fn copy_file() -> Self {
        Self {
            action_type: "copy_file",
            handler_name: "CopyFileHandler",
            noun: "file",
        }
    }
}

impl ActionHandler for CopyHandler {
    fn action_type(&self) -> &str {
        self.action_type
    }

    fn name(&self) -> &str {
        self.handler_name
    }

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError> {
        let (rel_source, rel_target) = match (
            action.str_param("source_path"),
            action.str_param("target_path"),
        ) {
            (Some(s), Some(t)) => (PathBuf::from(s), PathBuf::from(t)),
            _ => {
                return Ok(handler_failure(
                    action,
                    self.handler_name,
                    "missing required parameters: source_path, target_path",
                    "missing parameter",
                ))
            }
        };

        let source = match resolve_source(&ctx.source_root, &rel_source) {
            Ok(source) => source,
            Err(reason) => {
                return Ok(handler_failure(
                    action,
                    self.handler_name,
                    reason.clone(),
                    reason,
                ))
            }
        };

        let target = ctx.sandbox.resolve(&rel_target)?;

        tracing::info!(
            action_id = %action.id,
            dry_run = action.dry_run,
            source = %source.display(),
            target = %target.display(),
            "{} copy", self.action_type
        );

        if action.dry_run {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.handler_name,
                true,
                format!("dry-run: would copy {} to {}", self.noun, target.display()),
            ));
        }

        if !source.is_file() {
            return Ok(handler_failure(
                action,
                self.handler_name,
                format!(
                    "source {} does not exist or is not a file: {}",
                    self.noun,
                    source.display()
                ),
                "invalid source",
            ));
        }

        if let Err(violation) = ctx.policy.validate_target(&target) {
            return Ok(policy_failure(action, self.handler_name, violation));
        }

        if let Err(e) = copy_bytes(&source, &target) {
            tracing::error!(action_id = %action.id, error = %e, "Copy failed");
            return Ok(handler_failure(
                action,
                self.handler_name,
                format!("{} copy failed", self.action_type),
                e,
            ));
        }

        tracing::info!(
            action_id = %action.id,
            target = %target.display(),
            "Copy succeeded"
        );
        Ok(ExecutionActionResult::success(
            &action.id,
            self.handler_name,
            false,
            format!("copied {} to {}", self.noun, target.display()),
        ))
    }
}

/// Resolve a relative source path and prove it stays inside the source
/// root. Canonicalization covers both existence and symlink escapes.
fn resolve_source(source_root: &Path, rel: &Path) -> Result<PathBuf, String> {
    if rel.is_absolute() {
        return Err(format!("source_path must be relative: {}", rel.display()));
    }

    let candidate = source_root.join(rel);
    match candidate.canonicalize() {
        Ok(resolved) if resolved.starts_with(source_root) => Ok(resolved),
        Ok(resolved) => Err(format!(
            "source_path escapes source_root: {}",
            resolved.display()
        )),
        Err(e) => Err(format!(
            "source does not exist: {}: {e}",
            candidate.display()
        )),
    }
}

fn copy_bytes(source: &Path, target: &Path) -> Result<(), String> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::copy(source, target).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditaforge_core::{ExecutionStatus, FailureType, OverwriteMode};
    use ditaforge_safety::{MutationPolicy, Sandbox};
    use serde_json::json;
    use tempfile::TempDir;

    fn context(source: &TempDir, sandbox: &TempDir, mode: OverwriteMode) -> HandlerContext {
        HandlerContext::new(
            source.path(),
            Sandbox::new(sandbox.path()).unwrap(),
            MutationPolicy::new(mode),
        )
    }

    fn copy_action(dry_run: bool) -> Action {
        serde_json::from_value(json!({
            "id": "a1",
            "type": "copy_topic",
            "target": "topics/a.dita",
            "dry_run": dry_run,
            "parameters": {
                "source_path": "content/a.dita",
                "target_path": "topics/a.dita"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_copy_creates_byte_identical_target() {
        let source = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("content")).unwrap();
        std::fs::write(source.path().join("content/a.dita"), "<concept/>").unwrap();

        let ctx = context(&source, &sandbox, OverwriteMode::Deny);
        let result = CopyHandler::copy_topic()
            .execute(&ctx, &copy_action(false))
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        let copied = std::fs::read(sandbox.path().join("topics/a.dita")).unwrap();
        assert_eq!(copied, b"<concept/>");
    }

    #[test]
    fn test_dry_run_copies_nothing() {
        let source = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("content")).unwrap();
        std::fs::write(source.path().join("content/a.dita"), "<concept/>").unwrap();

        let ctx = context(&source, &sandbox, OverwriteMode::Deny);
        let result = CopyHandler::copy_topic()
            .execute(&ctx, &copy_action(true))
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Skipped);
        assert!(result.dry_run);
        assert!(!sandbox.path().join("topics/a.dita").exists());
    }

    #[test]
    fn test_replace_overwrites_existing_target() {
        let source = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("content")).unwrap();
        std::fs::write(source.path().join("content/a.dita"), "new contents").unwrap();
        std::fs::create_dir_all(sandbox.path().join("topics")).unwrap();
        std::fs::write(sandbox.path().join("topics/a.dita"), "old").unwrap();

        let ctx = context(&source, &sandbox, OverwriteMode::Replace);
        let result = CopyHandler::copy_topic()
            .execute(&ctx, &copy_action(false))
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Success);
        let copied = std::fs::read(sandbox.path().join("topics/a.dita")).unwrap();
        assert_eq!(copied, b"new contents");
    }

    #[test]
    fn test_deny_reports_policy_violation() {
        let source = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("content")).unwrap();
        std::fs::write(source.path().join("content/a.dita"), "new").unwrap();
        std::fs::create_dir_all(sandbox.path().join("topics")).unwrap();
        std::fs::write(sandbox.path().join("topics/a.dita"), "old").unwrap();

        let ctx = context(&source, &sandbox, OverwriteMode::Deny);
        let result = CopyHandler::copy_topic()
            .execute(&ctx, &copy_action(false))
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.failure_type, Some(FailureType::PolicyViolation));
        // The blocked target is untouched.
        assert_eq!(
            std::fs::read(sandbox.path().join("topics/a.dita")).unwrap(),
            b"old"
        );
    }

    #[test]
    fn test_missing_source_fails_without_crash() {
        let source = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();

        let ctx = context(&source, &sandbox, OverwriteMode::Deny);
        let result = CopyHandler::copy_topic()
            .execute(&ctx, &copy_action(false))
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.failure_type, Some(FailureType::HandlerError));
    }

    #[test]
    fn test_target_escape_crashes_the_action() {
        let source = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("content")).unwrap();
        std::fs::write(source.path().join("content/a.dita"), "x").unwrap();

        let action: Action = serde_json::from_value(json!({
            "id": "a1",
            "type": "copy_topic",
            "target": "../outside.dita",
            "parameters": {
                "source_path": "content/a.dita",
                "target_path": "../outside.dita"
            }
        }))
        .unwrap();

        let ctx = context(&source, &sandbox, OverwriteMode::Deny);
        let err = CopyHandler::copy_topic().execute(&ctx, &action).unwrap_err();
        assert!(matches!(err, HandlerError::Sandbox(_)));
    }

    #[test]
    fn test_missing_parameters_fail() {
        let source = TempDir::new().unwrap();
        let sandbox = TempDir::new().unwrap();
        let action: Action = serde_json::from_value(json!({
            "id": "a1",
            "type": "copy_map",
            "target": "root.ditamap"
        }))
        .unwrap();

        let ctx = context(&source, &sandbox, OverwriteMode::Deny);
        let result = CopyHandler::copy_map().execute(&ctx, &action).unwrap();
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.message.contains("source_path"));
    }
}
