//! Executor strategies.
//!
//! Two interchangeable implementations of the executor contract:
//! [`DryRunExecutor`] simulates a plan without resolving a single
//! handler, and [`FilesystemExecutor`] performs real mutation through
//! the registry. Both drive a full plan through their own dispatcher
//! via `run()`.

use crate::dispatcher::{ActionExecutor, ExecutionDispatcher};
use crate::error::{DispatchError, HandlerError};
use crate::registry::{HandlerContext, HandlerRegistry};
use ditaforge_core::{Action, ExecutionActionResult, ExecutionReport, Plan};
use ditaforge_safety::{MutationPolicy, Sandbox, SandboxViolation};
use std::path::Path;

/// Executor that answers every action with a skipped, no-mutation
/// result. It never resolves handlers: dry-run must not depend on which
/// handlers exist.
#[derive(Debug, Clone, Default)]
pub struct DryRunExecutor;

impl DryRunExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute a full plan in dry-run mode.
    pub fn run(&self, execution_id: &str, plan: &Plan) -> Result<ExecutionReport, DispatchError> {
        tracing::info!(execution_id, "Starting dry-run execution");
        ExecutionDispatcher::new(self).dispatch(execution_id, plan, true)
    }
}

impl ActionExecutor for DryRunExecutor {
    fn name(&self) -> &str {
        "DryRunExecutor"
    }

    fn execute(&self, action: &Action) -> Result<ExecutionActionResult, HandlerError> {
        tracing::info!(
            action_id = %action.id,
            action_type = %action.action_type,
            "Dry-run simulate action"
        );
        Ok(ExecutionActionResult::skipped(
            &action.id,
            self.name(),
            true,
            format!(
                "dry-run: would execute action type '{}'; no changes applied",
                action.action_type
            ),
        ))
    }
}

/// Executor that performs real filesystem mutation.
///
/// Owns the safety pipeline: source_root → sandbox → policy → handler.
/// Handlers receive all filesystem context from here and never guess
/// paths on their own.
pub struct FilesystemExecutor {
    context: HandlerContext,
    registry: HandlerRegistry,
}

impl FilesystemExecutor {
    /// Build an executor over a source root, a sandbox root (possibly
    /// distinct), a mutation policy, and an immutable handler registry.
    pub fn new(
        source_root: impl AsRef<Path>,
        sandbox_root: impl AsRef<Path>,
        policy: MutationPolicy,
        registry: HandlerRegistry,
    ) -> Result<Self, SandboxViolation> {
        let sandbox = Sandbox::new(sandbox_root)?;
        let context = HandlerContext::new(source_root.as_ref(), sandbox, policy);

        tracing::debug!(
            source_root = %context.source_root.display(),
            sandbox_root = %context.sandbox.root().display(),
            handlers = registry.registered_action_types().len(),
            "FilesystemExecutor initialized"
        );

        Ok(Self { context, registry })
    }

    /// Execute a full plan for real.
    pub fn run(&self, execution_id: &str, plan: &Plan) -> Result<ExecutionReport, DispatchError> {
        tracing::info!(
            execution_id,
            source_root = %self.context.source_root.display(),
            sandbox_root = %self.context.sandbox.root().display(),
            "Starting filesystem execution"
        );
        ExecutionDispatcher::new(self).dispatch(execution_id, plan, false)
    }
}

impl ActionExecutor for FilesystemExecutor {
    fn name(&self) -> &str {
        "FilesystemExecutor"
    }

    /// Resolve the handler and delegate, with the full safety context.
    ///
    /// An unregistered action type propagates as a crash: the
    /// dispatcher folds it into the handler-error halt path.
    fn execute(&self, action: &Action) -> Result<ExecutionActionResult, HandlerError> {
        let handler = self.registry.get(&action.action_type)?;

        tracing::debug!(
            action_id = %action.id,
            action_type = %action.action_type,
            handler = handler.name(),
            "Executing action"
        );
        handler.execute(&self.context, action)
    }
}
