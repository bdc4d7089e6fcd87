//! Error types for the materialization layer.

use std::path::PathBuf;
use thiserror::Error;

/// An input path cannot be mapped safely into the target layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Empty paths carry no mapping information.
    #[error("empty path cannot be mapped")]
    EmptyPath,

    /// Layout mapping operates on artifact-relative paths only.
    #[error("absolute paths are not allowed: {0}")]
    AbsolutePath(PathBuf),

    /// Parent-directory segments would undermine layout determinism.
    #[error("path traversal is not allowed: {0}")]
    Traversal(PathBuf),
}

/// One duplicate target location and every action contributing to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub path: PathBuf,
    pub action_ids: Vec<String>,
}

/// Two or more planned outputs resolve to the same target location.
///
/// All collisions for a plan are aggregated into one error so a single
/// preflight run surfaces every conflict.
#[derive(Debug, Error)]
pub struct CollisionError {
    pub collisions: Vec<Collision>,
}

impl std::fmt::Display for CollisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "materialization collision(s) detected:")?;
        for c in &self.collisions {
            writeln!(
                f,
                "  duplicate target path: {} (from actions {})",
                c.path.display(),
                c.action_ids.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Any failure inside the materialization gate.
///
/// Preflight failures mean execution must not start; finalize failures
/// mean the outcome could not be recorded.
#[derive(Debug, Error)]
pub enum MaterializationError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// A manifest invariant (absolute, contained, unique) was violated
    /// at construction.
    #[error("manifest invariant violated: {0}")]
    Manifest(String),

    /// The target root cannot be prepared as a writable directory.
    #[error("target root {path} cannot be prepared: {reason}")]
    TargetRoot { path: PathBuf, reason: String },

    /// Semantic preflight validation rejected the run.
    #[error("preflight validation failed: {0}")]
    Validation(String),

    /// Manifest emission failed.
    #[error("manifest write failed: {0}")]
    ManifestWrite(String),
}
