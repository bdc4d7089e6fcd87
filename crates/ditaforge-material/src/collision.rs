//! Target collision detection.
//!
//! Detects filesystem conflicts before execution occurs: no two planned
//! outputs may resolve to the same target location. Runs when target
//! artifacts are derived and again during preflight, and never mutates
//! the filesystem.

use crate::error::{Collision, CollisionError};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// A single resolved output artifact, used only for collision
/// detection. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetArtifact {
    /// Resolved, absolute target path.
    pub path: PathBuf,
    /// ID of the plan action producing this artifact.
    pub source_action_id: String,
}

impl TargetArtifact {
    pub fn new(path: impl Into<PathBuf>, source_action_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_action_id: source_action_id.into(),
        }
    }
}

/// Fail if any two artifacts normalize to the same path.
///
/// Every duplicate path is enumerated in one aggregated error, naming
/// all contributing action ids, so a single preflight surfaces every
/// conflict at once.
pub fn detect_collisions(artifacts: &[TargetArtifact]) -> Result<(), CollisionError> {
    tracing::info!(count = artifacts.len(), "Detecting materialization collisions");

    let mut by_path: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for artifact in artifacts {
        by_path
            .entry(normalize(&artifact.path))
            .or_default()
            .push(artifact.source_action_id.clone());
    }

    let collisions: Vec<Collision> = by_path
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(path, action_ids)| Collision { path, action_ids })
        .collect();

    if collisions.is_empty() {
        tracing::info!("No materialization collisions detected");
        return Ok(());
    }

    for c in &collisions {
        tracing::error!(
            path = %c.path.display(),
            actions = %c.action_ids.join(", "),
            "Duplicate target path"
        );
    }
    Err(CollisionError { collisions })
}

/// Deterministic normalization: resolve symlinks where the path exists,
/// otherwise collapse `.` and `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_paths_pass() {
        let artifacts = vec![
            TargetArtifact::new("/out/topics/a.dita", "a1"),
            TargetArtifact::new("/out/topics/b.dita", "a2"),
        ];
        assert!(detect_collisions(&artifacts).is_ok());
    }

    #[test]
    fn test_duplicate_paths_name_all_contributing_actions() {
        let artifacts = vec![
            TargetArtifact::new("/out/topics/a.dita", "a1"),
            TargetArtifact::new("/out/topics/b.dita", "a2"),
            TargetArtifact::new("/out/topics/a.dita", "a3"),
        ];

        let err = detect_collisions(&artifacts).unwrap_err();
        assert_eq!(err.collisions.len(), 1);
        assert_eq!(err.collisions[0].path, PathBuf::from("/out/topics/a.dita"));
        assert_eq!(err.collisions[0].action_ids, vec!["a1", "a3"]);

        let rendered = err.to_string();
        assert!(rendered.contains("a1"));
        assert!(rendered.contains("a3"));
    }

    #[test]
    fn test_lexically_equal_paths_collide() {
        let artifacts = vec![
            TargetArtifact::new("/out/topics/a.dita", "a1"),
            TargetArtifact::new("/out/topics/./sub/../a.dita", "a2"),
        ];
        let err = detect_collisions(&artifacts).unwrap_err();
        assert_eq!(err.collisions[0].action_ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_multiple_collisions_aggregate_into_one_error() {
        let artifacts = vec![
            TargetArtifact::new("/out/a", "a1"),
            TargetArtifact::new("/out/a", "a2"),
            TargetArtifact::new("/out/b", "a3"),
            TargetArtifact::new("/out/b", "a4"),
        ];
        let err = detect_collisions(&artifacts).unwrap_err();
        assert_eq!(err.collisions.len(), 2);
    }
}
