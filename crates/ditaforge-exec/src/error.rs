//! Error types for the execution layer.
//!
//! Every error here is a tagged value a call site must handle or
//! forward. Handler-local failures (bad parameters, missing sources,
//! invalid XML) are not errors at all: handlers report them as failed
//! action results and the run continues. Only the types below cross
//! component boundaries.

use ditaforge_safety::SandboxViolation;
use std::path::PathBuf;
use thiserror::Error;

/// Structural misconfiguration of the handler registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Handlers must carry a non-empty action type key.
    #[error("handler registered with an empty action type")]
    EmptyActionType,

    /// Each action type maps to exactly one handler.
    #[error("handler already registered for action type '{0}'")]
    Duplicate(String),

    /// At most one wildcard handler may exist.
    #[error("wildcard handler already registered")]
    WildcardAlreadyRegistered,

    /// No exact match and no wildcard.
    #[error("no handler registered for action type '{0}'")]
    NotRegistered(String),
}

/// Plan-shape failure detected before any action executes.
///
/// These abort dispatch outright: no report exists for a structurally
/// invalid plan.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every action must carry a non-empty type.
    #[error("action '{action_id}' carries an empty action type")]
    MissingActionType { action_id: String },
}

/// An executor or handler crashed while attempting an action.
///
/// Unlike a failed action result, a crash halts the run: the dispatcher
/// records one failed `handler_error` result for the crashing action
/// and stops dispatching.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A path escaped the sandbox inside a handler.
    #[error(transparent)]
    Sandbox(#[from] SandboxViolation),

    /// Handler lookup failed with no wildcard to fall back on.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The handler raised unexpectedly.
    #[error("handler crashed: {0}")]
    Crash(String),
}

/// The execution report could not be persisted.
#[derive(Debug, Error)]
pub enum ReportWriteError {
    #[error("failed to serialize execution report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write execution report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
