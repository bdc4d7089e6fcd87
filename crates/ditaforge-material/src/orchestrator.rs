//! Materialization orchestration.
//!
//! Materialization is a first-class phase that MUST gate execution:
//! `preflight()` has to succeed before any action runs, and
//! `finalize()` records the outcome afterwards. There are no implicit
//! transitions between the two phases.
//!
//! The orchestrator is a strict coordinator. Mapping logic, collision
//! semantics, and target preparation live in collaborators, all
//! dependency-injected behind narrow traits with no-op defaults.

use crate::builder::{TargetBuilder, TargetRootBuilder};
use crate::collision::{detect_collisions, TargetArtifact};
use crate::error::MaterializationError;
use crate::layout::TargetLayout;
use crate::manifest::{MaterializationManifest, MaterializedFile};
use crate::validation::{NoOpValidator, PreflightValidator};
use ditaforge_core::{ExecutionReport, Plan};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional manifest emission hooks around a run.
pub trait ManifestWriter {
    /// Called at the end of a successful preflight.
    fn write_preflight(
        &self,
        manifest: &MaterializationManifest,
    ) -> Result<(), MaterializationError>;

    /// Called by `finalize()` once execution has a report.
    fn write_final(
        &self,
        manifest: &MaterializationManifest,
        report: &ExecutionReport,
    ) -> Result<(), MaterializationError>;
}

/// Default manifest writer: performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct NoOpManifestWriter;

impl ManifestWriter for NoOpManifestWriter {
    fn write_preflight(&self, _: &MaterializationManifest) -> Result<(), MaterializationError> {
        Ok(())
    }

    fn write_final(
        &self,
        _: &MaterializationManifest,
        _: &ExecutionReport,
    ) -> Result<(), MaterializationError> {
        Ok(())
    }
}

/// Manifest writer that emits deterministic JSON files into a
/// directory: `manifest.preflight.json` during preflight and
/// `manifest.final.json` during finalize.
#[derive(Debug, Clone)]
pub struct JsonManifestWriter {
    directory: PathBuf,
}

impl JsonManifestWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn write_json(&self, name: &str, value: &serde_json::Value) -> Result<(), MaterializationError> {
        fs::create_dir_all(&self.directory)
            .map_err(|e| MaterializationError::ManifestWrite(e.to_string()))?;

        let path = self.directory.join(name);
        let mut serialized = serde_json::to_string_pretty(value)
            .map_err(|e| MaterializationError::ManifestWrite(e.to_string()))?;
        serialized.push('\n');

        fs::write(&path, serialized)
            .map_err(|e| MaterializationError::ManifestWrite(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Manifest written");
        Ok(())
    }
}

impl ManifestWriter for JsonManifestWriter {
    fn write_preflight(
        &self,
        manifest: &MaterializationManifest,
    ) -> Result<(), MaterializationError> {
        let value = serde_json::to_value(manifest)
            .map_err(|e| MaterializationError::ManifestWrite(e.to_string()))?;
        self.write_json("manifest.preflight.json", &value)
    }

    fn write_final(
        &self,
        manifest: &MaterializationManifest,
        report: &ExecutionReport,
    ) -> Result<(), MaterializationError> {
        let value = serde_json::json!({
            "target_root": manifest.target_root(),
            "files": manifest.files(),
            "execution_id": report.execution_id,
            "dry_run": report.dry_run,
            "summary": report.summary,
        });
        self.write_json("manifest.final.json", &value)
    }
}

/// Two-phase coordinator for the materialization gate.
pub struct MaterializationOrchestrator {
    plan: Plan,
    target_root: PathBuf,
    artifacts: Vec<TargetArtifact>,
    manifest: MaterializationManifest,
    builder: Box<dyn TargetBuilder>,
    validator: Box<dyn PreflightValidator>,
    manifest_writer: Box<dyn ManifestWriter>,
}

impl std::fmt::Debug for MaterializationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializationOrchestrator")
            .field("plan", &self.plan)
            .field("target_root", &self.target_root)
            .field("artifacts", &self.artifacts)
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

impl MaterializationOrchestrator {
    /// Build an orchestrator for a plan and target root.
    ///
    /// Target artifacts are derived exactly once, deterministically:
    /// absolute action targets are used as-is, relative targets resolve
    /// through the default layout. Collision detection runs on the
    /// derived artifacts before the manifest is built, so duplicate
    /// targets surface as one aggregated
    /// [`CollisionError`](crate::error::CollisionError) naming
    /// every conflicting path and its contributing action ids; the
    /// manifest's own uniqueness invariant is then unreachable for
    /// plain duplicates and only guards absolute/contained violations.
    pub fn new(plan: Plan, target_root: impl Into<PathBuf>) -> Result<Self, MaterializationError> {
        let target_root = target_root.into();
        let artifacts = derive_target_artifacts(&plan, &target_root)?;
        detect_collisions(&artifacts)?;
        let manifest = build_manifest(&target_root, &artifacts)?;

        tracing::debug!(
            target_root = %target_root.display(),
            actions = plan.len(),
            artifacts = artifacts.len(),
            "Materialization orchestrator initialized"
        );

        Ok(Self {
            plan,
            builder: Box::new(TargetRootBuilder::new(&target_root)),
            validator: Box::new(NoOpValidator),
            manifest_writer: Box::new(NoOpManifestWriter),
            target_root,
            artifacts,
            manifest,
        })
    }

    /// Replace the target builder.
    pub fn with_builder(mut self, builder: Box<dyn TargetBuilder>) -> Self {
        self.builder = builder;
        self
    }

    /// Replace the preflight validator.
    pub fn with_validator(mut self, validator: Box<dyn PreflightValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the manifest writer.
    pub fn with_manifest_writer(mut self, writer: Box<dyn ManifestWriter>) -> Self {
        self.manifest_writer = writer;
        self
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn manifest(&self) -> &MaterializationManifest {
        &self.manifest
    }

    /// Execute the pre-execution safety gate.
    ///
    /// Runs, in order: target root preparation, semantic validation,
    /// collision detection, optional manifest emission. If this fails,
    /// execution must not run.
    pub fn preflight(&self) -> Result<(), MaterializationError> {
        tracing::info!(
            target_root = %self.target_root.display(),
            actions = self.plan.len(),
            artifacts = self.artifacts.len(),
            "Materialization preflight start"
        );

        self.builder.build()?;
        self.validator.validate_preflight(&self.plan)?;
        detect_collisions(&self.artifacts)?;
        self.manifest_writer.write_preflight(&self.manifest)?;

        tracing::info!("Materialization preflight complete");
        Ok(())
    }

    /// Finalize materialization after execution completes.
    pub fn finalize(&self, report: &ExecutionReport) -> Result<(), MaterializationError> {
        tracing::info!(
            execution_id = %report.execution_id,
            results = report.results.len(),
            "Materialization finalize start"
        );

        self.manifest_writer.write_final(&self.manifest, report)?;

        tracing::info!("Materialization finalize complete");
        Ok(())
    }
}

/// Derive resolved target artifacts from explicit plan action targets.
fn derive_target_artifacts(
    plan: &Plan,
    target_root: &Path,
) -> Result<Vec<TargetArtifact>, MaterializationError> {
    let layout = TargetLayout::new(target_root);

    let mut artifacts = Vec::with_capacity(plan.len());
    for action in &plan.actions {
        let raw = Path::new(&action.target);
        let resolved = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            layout.resolve(raw)?
        };
        artifacts.push(TargetArtifact::new(resolved, &action.id));
    }
    Ok(artifacts)
}

/// Build the manifest from derived artifacts, inferring semantic roles
/// from file extensions.
fn build_manifest(
    target_root: &Path,
    artifacts: &[TargetArtifact],
) -> Result<MaterializationManifest, MaterializationError> {
    let files = artifacts
        .iter()
        .map(|a| {
            MaterializedFile::new(&a.path)
                .with_source_action(&a.source_action_id)
                .with_role(role_for(&a.path))
        })
        .collect();

    MaterializationManifest::new(target_root, files, BTreeMap::new())
}

fn role_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ditamap") => "map",
        Some("dita") => "topic",
        _ => "media",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditaforge_core::Action;
    use tempfile::TempDir;

    fn action(id: &str, target: &str) -> Action {
        Action {
            id: id.into(),
            action_type: "copy_topic".into(),
            target: target.into(),
            reason: "test".into(),
            parameters: Default::default(),
            dry_run: false,
        }
    }

    #[test]
    fn test_preflight_prepares_root_and_passes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");

        let plan = Plan::new(vec![
            action("a1", "content/a.dita"),
            action("a2", "content/b.dita"),
        ]);

        let orchestrator = MaterializationOrchestrator::new(plan, &root).unwrap();
        orchestrator.preflight().unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_colliding_targets_fail_with_aggregated_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");

        // Distinct source shapes flatten to the same topic path.
        let plan = Plan::new(vec![
            action("a1", "content/a.dita"),
            action("a2", "other/a.dita"),
        ]);

        let err = MaterializationOrchestrator::new(plan, &root).unwrap_err();
        match &err {
            MaterializationError::Collision(collision) => {
                assert_eq!(collision.collisions.len(), 1);
                assert_eq!(collision.collisions[0].action_ids, vec!["a1", "a2"]);
            }
            other => panic!("expected collision error, got: {other}"),
        }

        // The rendered error names every contributing action.
        let rendered = err.to_string();
        assert!(rendered.contains("a1"));
        assert!(rendered.contains("a2"));
        assert!(rendered.contains("a.dita"));
    }

    #[test]
    fn test_every_collision_appears_in_one_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");

        let plan = Plan::new(vec![
            action("a1", "content/a.dita"),
            action("a2", "other/a.dita"),
            action("a3", "media/logo.png"),
            action("a4", "assets/media/logo.png"),
        ]);

        let err = MaterializationOrchestrator::new(plan, &root).unwrap_err();
        match err {
            MaterializationError::Collision(collision) => {
                assert_eq!(collision.collisions.len(), 2);
            }
            other => panic!("expected collision error, got: {other}"),
        }
    }

    #[test]
    fn test_collision_detection_names_both_actions() {
        let artifacts = vec![
            TargetArtifact::new("/out/topics/a.dita", "a1"),
            TargetArtifact::new("/out/topics/a.dita", "a2"),
        ];
        let err = detect_collisions(&artifacts).unwrap_err();
        assert_eq!(err.collisions[0].action_ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_finalize_emits_final_manifest() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");
        let manifest_dir = dir.path().join("reports");

        let plan = Plan::new(vec![action("a1", "content/a.dita")]);
        let orchestrator = MaterializationOrchestrator::new(plan, &root)
            .unwrap()
            .with_manifest_writer(Box::new(JsonManifestWriter::new(&manifest_dir)));

        orchestrator.preflight().unwrap();
        let report = ExecutionReport::create("exec-1", false, vec![]);
        orchestrator.finalize(&report).unwrap();

        assert!(manifest_dir.join("manifest.preflight.json").is_file());
        assert!(manifest_dir.join("manifest.final.json").is_file());
    }

    #[test]
    fn test_absolute_target_outside_root_fails_manifest() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");

        let plan = Plan::new(vec![action("a1", "/elsewhere/a.dita")]);
        assert!(MaterializationOrchestrator::new(plan, &root).is_err());
    }
}
