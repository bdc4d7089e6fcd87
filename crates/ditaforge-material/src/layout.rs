//! Materialization layout rules.
//!
//! Deterministic mapping from artifact-relative paths to their canonical
//! location under a target root, independent of the source directory
//! shape. The mapping is deliberately lossy to guarantee a predictable,
//! collision-resistant layout:
//!
//! - `.ditamap` files flatten to the target root by filename
//! - `.dita` files go under `topics/` (preserved if already rooted
//!   there, flattened otherwise)
//! - everything else is media: preserved if already under `media/`,
//!   nested under `media/images/` if originally under `images/`,
//!   otherwise flattened under `media/`
//!
//! Pure mapping only. No copying, no filesystem access.

use crate::error::LayoutError;
use std::path::{Component, Path, PathBuf};

/// Strategy interface for layout policies.
///
/// Implementations must be deterministic and must not touch the
/// filesystem.
pub trait LayoutPolicy: Send + Sync {
    /// Map a relative artifact path into a normalized relative target
    /// path.
    fn map_relative_path(&self, rel_path: &Path) -> Result<PathBuf, LayoutError>;
}

/// Default deterministic layout policy for DITA-like packages.
#[derive(Debug, Clone, Default)]
pub struct DitaLayoutPolicy;

const TOPICS_DIR: &str = "topics";
const MEDIA_DIR: &str = "media";

impl LayoutPolicy for DitaLayoutPolicy {
    fn map_relative_path(&self, rel_path: &Path) -> Result<PathBuf, LayoutError> {
        validate_relative_path(rel_path)?;

        let extension = rel_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        let first = first_component(rel_path);
        let file_name = rel_path
            .file_name()
            .map(PathBuf::from)
            .ok_or(LayoutError::EmptyPath)?;

        let mapped = match extension.as_deref() {
            // Maps flatten to the target root.
            Some("ditamap") => file_name,

            // Topics keep their subtree only when already rooted there.
            Some("dita") => {
                if first.as_deref() == Some(TOPICS_DIR) {
                    rel_path.to_path_buf()
                } else {
                    Path::new(TOPICS_DIR).join(file_name)
                }
            }

            // Everything else is media.
            _ => match first.as_deref() {
                Some(MEDIA_DIR) => rel_path.to_path_buf(),
                Some(f) if f.eq_ignore_ascii_case("images") => {
                    let rest: PathBuf = rel_path.components().skip(1).collect();
                    Path::new(MEDIA_DIR).join("images").join(rest)
                }
                _ => Path::new(MEDIA_DIR).join(file_name),
            },
        };

        tracing::debug!(
            input = %rel_path.display(),
            mapped = %mapped.display(),
            "Layout mapping"
        );
        Ok(mapped)
    }
}

/// Resolves artifact-relative paths to concrete paths under a target
/// root, using a pluggable policy.
pub struct TargetLayout {
    target_root: PathBuf,
    policy: Box<dyn LayoutPolicy>,
}

impl TargetLayout {
    /// Target layout with the default DITA policy.
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self::with_policy(target_root, Box::new(DitaLayoutPolicy))
    }

    /// Target layout with a custom policy.
    pub fn with_policy(target_root: impl Into<PathBuf>, policy: Box<dyn LayoutPolicy>) -> Self {
        Self {
            target_root: target_root.into(),
            policy,
        }
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Resolve a relative artifact path to its concrete location under
    /// the target root.
    pub fn resolve(&self, rel_path: &Path) -> Result<PathBuf, LayoutError> {
        validate_relative_path(rel_path)?;
        let mapped = self.policy.map_relative_path(rel_path)?;
        validate_relative_path(&mapped)?;
        Ok(self.target_root.join(mapped))
    }
}

/// Reject absolute, empty, and traversing paths.
fn validate_relative_path(rel_path: &Path) -> Result<(), LayoutError> {
    if rel_path.as_os_str().is_empty() {
        return Err(LayoutError::EmptyPath);
    }
    if rel_path.is_absolute() {
        return Err(LayoutError::AbsolutePath(rel_path.to_path_buf()));
    }
    if rel_path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(LayoutError::Traversal(rel_path.to_path_buf()));
    }
    Ok(())
}

fn first_component(path: &Path) -> Option<String> {
    path.components().next().and_then(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(input: &str) -> PathBuf {
        DitaLayoutPolicy.map_relative_path(Path::new(input)).unwrap()
    }

    #[test]
    fn test_maps_flatten_to_root() {
        assert_eq!(map("deep/nested/root.ditamap"), PathBuf::from("root.ditamap"));
        assert_eq!(map("root.ditamap"), PathBuf::from("root.ditamap"));
    }

    #[test]
    fn test_topics_flatten_unless_already_rooted() {
        assert_eq!(map("content/a.dita"), PathBuf::from("topics/a.dita"));
        assert_eq!(
            map("topics/ch1/intro.dita"),
            PathBuf::from("topics/ch1/intro.dita")
        );
        assert_eq!(map("a.dita"), PathBuf::from("topics/a.dita"));
    }

    #[test]
    fn test_media_rules() {
        assert_eq!(map("media/logo.png"), PathBuf::from("media/logo.png"));
        assert_eq!(
            map("images/diagrams/arch.png"),
            PathBuf::from("media/images/diagrams/arch.png")
        );
        assert_eq!(map("assets/icon.svg"), PathBuf::from("media/icon.svg"));
    }

    #[test]
    fn test_rejects_unsafe_inputs() {
        let policy = DitaLayoutPolicy;
        assert!(matches!(
            policy.map_relative_path(Path::new("/abs/a.dita")),
            Err(LayoutError::AbsolutePath(_))
        ));
        assert!(matches!(
            policy.map_relative_path(Path::new("../a.dita")),
            Err(LayoutError::Traversal(_))
        ));
        assert!(matches!(
            policy.map_relative_path(Path::new("")),
            Err(LayoutError::EmptyPath)
        ));
    }

    #[test]
    fn test_target_layout_joins_root() {
        let layout = TargetLayout::new("/pkg/out");
        assert_eq!(
            layout.resolve(Path::new("content/a.dita")).unwrap(),
            PathBuf::from("/pkg/out/topics/a.dita")
        );
    }
}
