//! Concrete action handlers.
//!
//! One handler per action type, all obeying the same universal rules:
//! every writable path comes from `Sandbox::resolve`, dry-run produces a
//! skipped result with no I/O, `MutationPolicy::validate_target` runs
//! before every write to an existing path, and idempotent no-ops report
//! `skipped` rather than success or failure. Read-only handlers never
//! touch sandbox or policy.

pub mod copy;
pub mod delete;
pub mod glossary;
pub mod topicref;
pub mod wrap_map;
mod xml;

pub use copy::CopyHandler;
pub use delete::DeleteFileHandler;
pub use glossary::{ExtractGlossaryHandler, InjectGlossaryHandler};
pub use topicref::{InjectTopicrefHandler, InjectTopicrefsHandler};
pub use wrap_map::WrapMapHandler;

use crate::error::RegistryError;
use crate::registry::HandlerRegistry;
use ditaforge_core::{Action, ExecutionActionResult, FailureType};
use ditaforge_safety::PolicyViolation;

/// Registry preloaded with every concrete handler.
pub fn default_registry() -> Result<HandlerRegistry, RegistryError> {
    let mut registry = HandlerRegistry::new();

    registry.register(Box::new(CopyHandler::copy_map()))?;
    registry.register(Box::new(CopyHandler::copy_topic()))?;
    registry.register(Box::new(CopyHandler::copy_media()))?;
    registry.register(Box::new(CopyHandler::copy_file()))?;
    registry.register(Box::new(DeleteFileHandler))?;
    registry.register(Box::new(WrapMapHandler))?;
    registry.register(Box::new(InjectTopicrefHandler))?;
    registry.register(Box::new(InjectTopicrefsHandler))?;
    registry.register(Box::new(InjectGlossaryHandler))?;
    registry.register(Box::new(ExtractGlossaryHandler))?;

    Ok(registry)
}

/// Failed result for a failure local to the handler.
pub(crate) fn handler_failure(
    action: &Action,
    handler: &str,
    message: impl Into<String>,
    error: impl Into<String>,
) -> ExecutionActionResult {
    ExecutionActionResult::failed(
        &action.id,
        handler,
        action.dry_run,
        message,
        error,
        FailureType::HandlerError,
    )
}

/// Failed result for a write blocked by the mutation policy.
///
/// Policy violations are fatal to the action only; the run continues.
pub(crate) fn policy_failure(
    action: &Action,
    handler: &str,
    violation: PolicyViolation,
) -> ExecutionActionResult {
    ExecutionActionResult::failed(
        &action.id,
        handler,
        action.dry_run,
        violation.message.clone(),
        violation.message,
        FailureType::PolicyViolation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_all_action_types() {
        let registry = default_registry().unwrap();
        assert_eq!(
            registry.registered_action_types(),
            vec![
                "copy_file",
                "copy_map",
                "copy_media",
                "copy_topic",
                "delete_file",
                "extract_glossary",
                "inject_glossary",
                "inject_topicref",
                "inject_topicrefs",
                "wrap_map",
            ]
        );
    }
}
