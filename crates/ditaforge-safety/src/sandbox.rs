//! Filesystem sandbox enforcement.
//!
//! A sandbox defines a single root directory inside which all
//! filesystem mutation must remain. [`Sandbox::resolve`] is the only
//! legal way for a handler or executor to obtain a writable path; it is
//! the system's entire path-traversal defense.

use crate::error::SandboxViolation;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Filesystem sandbox rooted at one canonicalized directory.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox.
    ///
    /// The root must already exist and be a directory; anything else is
    /// a configuration error, not a runtime condition.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxViolation> {
        let root = root.as_ref();

        if !root.exists() {
            return Err(SandboxViolation::RootMissing(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(SandboxViolation::RootNotDirectory(root.to_path_buf()));
        }

        let root = root
            .canonicalize()
            .map_err(|source| SandboxViolation::Resolve {
                path: root.to_path_buf(),
                source,
            })?;

        tracing::debug!(root = %root.display(), "Sandbox initialized");
        Ok(Self { root })
    }

    /// Canonicalized sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path inside the sandbox.
    ///
    /// Relative inputs resolve against the root; absolute inputs are
    /// taken as given. After `..` and symlink normalization the result
    /// must be a contained descendant of the root, or the call fails
    /// with a violation. The target itself does not have to exist yet.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, SandboxViolation> {
        let path = path.as_ref();

        let candidate = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let resolved = soft_canonicalize(&normalize_lexically(&candidate));

        if !resolved.starts_with(&self.root) {
            tracing::error!(
                input = %path.display(),
                resolved = %resolved.display(),
                root = %self.root.display(),
                "Sandbox violation"
            );
            return Err(SandboxViolation::Escape(resolved));
        }

        tracing::debug!(
            input = %path.display(),
            resolved = %resolved.display(),
            "Sandbox path resolved"
        );
        Ok(resolved)
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
///
/// A `..` at the start of an absolute path stays at the root, matching
/// kernel semantics.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    // Above the filesystem root there is nothing to pop.
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the deepest existing ancestor and reattach the
/// nonexistent tail, so symlinks are resolved even for paths that do
/// not exist yet.
fn soft_canonicalize(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut tail: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(base) => {
                let mut out = base;
                for segment in tail.iter().rev() {
                    out.push(segment);
                }
                return out;
            }
            Err(_) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name.to_os_string());
                    existing = parent.to_path_buf();
                }
                _ => return path.to_path_buf(),
            },
        }
    }
}
