//! Error types for sandbox and policy enforcement.
//!
//! Both errors are tagged values that every call site must handle or
//! forward explicitly. The execution layer converts them into failed
//! action results; they never escape a run uncaught.

use std::path::PathBuf;
use thiserror::Error;

/// A path escaped, or could not be proven inside, the sandbox root.
#[derive(Debug, Error)]
pub enum SandboxViolation {
    /// Sandbox root does not exist at construction.
    #[error("sandbox root does not exist: {0}")]
    RootMissing(PathBuf),

    /// Sandbox root exists but is not a directory.
    #[error("sandbox root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    /// A resolved path is not a descendant of the sandbox root.
    #[error("path escapes sandbox root: {0}")]
    Escape(PathBuf),

    /// The filesystem refused to resolve a path.
    #[error("failed to resolve path {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A mutation policy decision blocked one write.
///
/// This error is intentionally semantic: it represents a policy-level
/// safety event, not a generic failure. The execution layer translates
/// it into `status = failed`, `failure_type = policy_violation`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PolicyViolation {
    /// Human-readable decision, distinct per overwrite mode.
    pub message: String,
    /// The blocked target path.
    pub target: PathBuf,
}

impl PolicyViolation {
    pub fn new(message: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            message: message.into(),
            target: target.into(),
        }
    }
}
