//! Handler registry and the handler contract.
//!
//! The registry is the only legal mechanism for dispatching actions to
//! handlers: a closed, explicit map from action type to implementation.
//! There is no dynamic discovery and no reflection. A registry is
//! constructed once, then injected into the executor as an immutable
//! value; there is no process-wide global.

use crate::error::{HandlerError, RegistryError};
use ditaforge_core::{Action, ExecutionActionResult};
use ditaforge_safety::{MutationPolicy, Sandbox};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Wildcard key answering every action type; reserved for dry-run.
pub const WILDCARD: &str = "*";

/// Filesystem context assembled by the executor and passed to every
/// handler invocation.
///
/// Handlers obtain every writable path through `sandbox` and must check
/// `policy` before touching an existing path. `source_root` is where
/// relative source artifacts are read from; read-only handlers never
/// use the sandbox or policy.
pub struct HandlerContext {
    pub source_root: PathBuf,
    pub sandbox: Sandbox,
    pub policy: MutationPolicy,
}

impl HandlerContext {
    pub fn new(
        source_root: impl Into<PathBuf>,
        sandbox: Sandbox,
        policy: MutationPolicy,
    ) -> Self {
        let source_root = source_root.into();
        // Canonicalize so source containment checks compare like with
        // like; a nonexistent source root fails later, per action.
        let source_root = source_root.canonicalize().unwrap_or(source_root);
        Self {
            source_root,
            sandbox,
            policy,
        }
    }
}

/// One action type's execution unit.
///
/// `execute` returns `Ok` with a result for every normal outcome,
/// including failures local to the action (bad parameters, missing
/// source, policy violation). `Err` means the handler crashed and the
/// run must halt.
pub trait ActionHandler: Send + Sync {
    /// Registry key this handler answers.
    fn action_type(&self) -> &str;

    /// Implementation name recorded in every result it produces.
    fn name(&self) -> &str;

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError>;
}

/// Closed-world map from action type to handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Box<dyn ActionHandler>>,
    wildcard: Option<Box<dyn ActionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its action type.
    ///
    /// Registering `"*"` installs the wildcard fallback. Duplicates of
    /// either kind fail immediately.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) -> Result<(), RegistryError> {
        let action_type = handler.action_type().trim().to_string();

        if action_type.is_empty() {
            return Err(RegistryError::EmptyActionType);
        }

        if action_type == WILDCARD {
            if self.wildcard.is_some() {
                return Err(RegistryError::WildcardAlreadyRegistered);
            }
            tracing::info!(handler = handler.name(), "Registered wildcard handler");
            self.wildcard = Some(handler);
            return Ok(());
        }

        if self.handlers.contains_key(&action_type) {
            return Err(RegistryError::Duplicate(action_type));
        }

        tracing::info!(
            handler = handler.name(),
            action_type = %action_type,
            "Registered handler"
        );
        self.handlers.insert(action_type, handler);
        Ok(())
    }

    /// Resolve a handler: exact match first, wildcard second, failure
    /// third.
    pub fn get(&self, action_type: &str) -> Result<&dyn ActionHandler, RegistryError> {
        if let Some(handler) = self.handlers.get(action_type) {
            return Ok(handler.as_ref());
        }
        if let Some(handler) = &self.wildcard {
            tracing::debug!(action_type, "Resolved wildcard handler");
            return Ok(handler.as_ref());
        }
        Err(RegistryError::NotRegistered(action_type.to_string()))
    }

    /// Registered concrete action types, wildcard excluded.
    pub fn registered_action_types(&self) -> Vec<&str> {
        self.handlers.keys().map(|k| k.as_str()).collect()
    }
}
