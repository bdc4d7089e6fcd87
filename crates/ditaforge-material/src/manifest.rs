//! Materialization manifest.
//!
//! The manifest is the declarative record of the intended final shape
//! of a materialized package: resolved target paths, traceable to the
//! actions that produce them, guaranteed collision-free. Its invariants
//! are enforced at construction; an invalid manifest cannot exist.

use crate::error::MaterializationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Declarative record of a single materialized file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializedFile {
    /// Absolute path of the file in the target package.
    pub path: PathBuf,

    /// ID of the plan action that produces this file.
    pub source_action_id: Option<String>,

    /// Semantic role ("map", "topic", "media") when known.
    pub role: Option<String>,
}

impl MaterializedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source_action_id: None,
            role: None,
        }
    }

    pub fn with_source_action(mut self, action_id: impl Into<String>) -> Self {
        self.source_action_id = Some(action_id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Declarative manifest describing a fully materialized target package.
///
/// Invariants, enforced at construction:
/// - every file path is absolute
/// - every file path is a descendant of `target_root`
/// - no duplicate file paths exist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializationManifest {
    target_root: PathBuf,
    files: Vec<MaterializedFile>,
    metadata: BTreeMap<String, String>,
}

impl MaterializationManifest {
    /// Build a manifest, failing immediately on any invariant
    /// violation.
    pub fn new(
        target_root: impl Into<PathBuf>,
        files: Vec<MaterializedFile>,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self, MaterializationError> {
        let target_root = target_root.into();

        let mut seen: BTreeSet<&Path> = BTreeSet::new();
        for file in &files {
            if !file.path.is_absolute() {
                return Err(MaterializationError::Manifest(format!(
                    "file path must be absolute: {}",
                    file.path.display()
                )));
            }
            if !file.path.starts_with(&target_root) || file.path == target_root {
                return Err(MaterializationError::Manifest(format!(
                    "file path {} is not under target root {}",
                    file.path.display(),
                    target_root.display()
                )));
            }
            if !seen.insert(file.path.as_path()) {
                return Err(MaterializationError::Manifest(format!(
                    "duplicate materialized target path: {}",
                    file.path.display()
                )));
            }
        }

        tracing::debug!(
            target_root = %target_root.display(),
            files = files.len(),
            "Materialization manifest validated"
        );

        Ok(Self {
            target_root,
            files,
            metadata,
        })
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn files(&self) -> &[MaterializedFile] {
        &self.files
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
