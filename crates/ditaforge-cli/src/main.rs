use anyhow::Context;
use clap::{Parser, Subcommand};
use ditaforge_core::{OverwriteMode, Plan, RunConfig};
use ditaforge_exec::{default_registry, DryRunExecutor, FilesystemExecutor, ReportWriter};
use ditaforge_material::{JsonManifestWriter, MaterializationOrchestrator, PlanValidator};
use ditaforge_safety::MutationPolicy;

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ditaforge", version, about = "Ditaforge plan execution CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a plan against the target root (real filesystem mutation).
    Execute {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Simulate a plan without touching the filesystem.
    DryRun {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Run the materialization preflight only (no execution).
    Preflight {
        /// Path to the JSON execution plan.
        plan: PathBuf,

        /// Target root for materialization.
        #[arg(long, env = "DITAFORGE_TARGET_ROOT")]
        target_root: PathBuf,

        /// Directory to receive the preflight manifest.
        #[arg(long)]
        manifest_dir: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Path to the JSON execution plan.
    plan: PathBuf,

    /// Optional TOML run configuration file. CLI flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory containing source artifacts.
    #[arg(long, env = "DITAFORGE_SOURCE_ROOT")]
    source_root: Option<PathBuf>,

    /// Target root: sandbox boundary and materialization destination.
    #[arg(long, env = "DITAFORGE_TARGET_ROOT")]
    target_root: Option<PathBuf>,

    /// Overwrite behavior for existing targets (deny, replace, skip).
    #[arg(long, value_parser = parse_overwrite)]
    overwrite: Option<OverwriteMode>,

    /// Where to write the execution report. Without this, the report is
    /// printed to stdout only.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Directory to receive preflight and final manifests.
    #[arg(long)]
    manifest_dir: Option<PathBuf>,

    /// Execution id for the report. Generated when omitted.
    #[arg(long)]
    execution_id: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Execute { args } => run(&args, false),
        Command::DryRun { args } => run(&args, true),
        Command::Preflight {
            plan,
            target_root,
            manifest_dir,
        } => run_preflight(&plan, &target_root, manifest_dir.as_deref()),
    }
}

// -----------------------------
// execute / dry-run
// -----------------------------

fn run(args: &RunArgs, force_dry_run: bool) -> anyhow::Result<()> {
    let plan = load_plan(&args.plan)?;
    let config = resolve_run_config(args, force_dry_run)?;

    tracing::info!(
        plan = %args.plan.display(),
        actions = plan.len(),
        source_root = %config.source_root.display(),
        target_root = %config.target_root.display(),
        overwrite = %config.overwrite,
        dry_run = config.dry_run,
        "Run configured"
    );

    let mut orchestrator = MaterializationOrchestrator::new(plan.clone(), &config.target_root)?
        .with_validator(Box::new(PlanValidator::new(&config.target_root)));
    if let Some(dir) = &args.manifest_dir {
        orchestrator = orchestrator.with_manifest_writer(Box::new(JsonManifestWriter::new(dir)));
    }

    orchestrator.preflight()?;

    let execution_id = args
        .execution_id
        .clone()
        .unwrap_or_else(|| format!("exec-{}", Uuid::new_v4()));

    let report = if config.dry_run {
        DryRunExecutor::new().run(&execution_id, &plan)?
    } else {
        let executor = FilesystemExecutor::new(
            &config.source_root,
            &config.target_root,
            MutationPolicy::new(config.overwrite),
            default_registry()?,
        )?;
        executor.run(&execution_id, &plan)?
    };

    orchestrator.finalize(&report)?;

    match &config.report_path {
        Some(path) => {
            ReportWriter::new().write(&report, path)?;
            println!("Wrote execution report: {}", path.display());
        }
        None => {
            let value = serde_json::to_value(&report)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    println!(
        "Execution {}: {} total, {} success, {} skipped, {} failed",
        report.execution_id,
        report.summary.total,
        report.summary.success,
        report.summary.skipped,
        report.summary.failed
    );

    if report.is_clean() {
        println!("✔ Execution completed without failures.");
        Ok(())
    } else {
        println!("✖ Execution completed with failures (see report).");
        Err(anyhow::anyhow!(
            "execution completed with {} failed action(s)",
            report.summary.failed
        ))
    }
}

// -----------------------------
// preflight
// -----------------------------

fn run_preflight(
    plan_path: &Path,
    target_root: &Path,
    manifest_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let plan = load_plan(plan_path)?;

    let mut orchestrator = MaterializationOrchestrator::new(plan, target_root)?
        .with_validator(Box::new(PlanValidator::new(target_root)));
    if let Some(dir) = manifest_dir {
        orchestrator = orchestrator.with_manifest_writer(Box::new(JsonManifestWriter::new(dir)));
    }

    orchestrator.preflight()?;

    println!("✔ Preflight passed.");
    println!("  - target root: {}", orchestrator.target_root().display());
    println!(
        "  - planned files: {}",
        orchestrator.manifest().files().len()
    );
    if let Some(dir) = manifest_dir {
        println!(
            "  - manifest: {}",
            dir.join("manifest.preflight.json").display()
        );
    }
    Ok(())
}

// -----------------------------
// plan + config loading
// -----------------------------

fn load_plan(path: &Path) -> anyhow::Result<Plan> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read plan file: {}", path.display()))?;
    let plan: Plan = serde_json::from_slice(&bytes)
        .with_context(|| format!("invalid plan JSON: {}", path.display()))?;
    Ok(plan)
}

/// Build the effective run configuration.
///
/// Precedence, lowest to highest: TOML config file, then CLI flags.
/// The dry-run subcommand forces `dry_run` regardless of either.
fn resolve_run_config(args: &RunArgs, force_dry_run: bool) -> anyhow::Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            toml::from_str::<RunConfig>(&contents)
                .with_context(|| format!("invalid run config: {}", path.display()))?
        }
        None => {
            let source_root = args.source_root.clone().ok_or_else(|| {
                anyhow::anyhow!("--source-root is required when no --config file is given")
            })?;
            let target_root = args.target_root.clone().ok_or_else(|| {
                anyhow::anyhow!("--target-root is required when no --config file is given")
            })?;
            RunConfig {
                source_root,
                target_root,
                overwrite: OverwriteMode::default(),
                dry_run: false,
                report_path: None,
            }
        }
    };

    if let Some(root) = &args.source_root {
        config.source_root = root.clone();
    }
    if let Some(root) = &args.target_root {
        config.target_root = root.clone();
    }
    if let Some(mode) = args.overwrite {
        config.overwrite = mode;
    }
    if let Some(path) = &args.report {
        config.report_path = Some(path.clone());
    }
    if force_dry_run {
        config.dry_run = true;
    }

    Ok(config)
}

fn parse_overwrite(value: &str) -> Result<OverwriteMode, String> {
    match value {
        "deny" => Ok(OverwriteMode::Deny),
        "replace" => Ok(OverwriteMode::Replace),
        "skip" => Ok(OverwriteMode::Skip),
        other => Err(format!(
            "invalid overwrite mode '{}' (expected deny, replace, or skip)",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_args(config: Option<PathBuf>) -> RunArgs {
        RunArgs {
            plan: PathBuf::from("plan.json"),
            config,
            source_root: None,
            target_root: None,
            overwrite: None,
            report: None,
            manifest_dir: None,
            execution_id: None,
        }
    }

    #[test]
    fn test_parse_overwrite_modes() {
        assert_eq!(parse_overwrite("deny").unwrap(), OverwriteMode::Deny);
        assert_eq!(parse_overwrite("replace").unwrap(), OverwriteMode::Replace);
        assert_eq!(parse_overwrite("skip").unwrap(), OverwriteMode::Skip);
        assert!(parse_overwrite("clobber").is_err());
    }

    #[test]
    fn test_flags_required_without_config_file() {
        let err = resolve_run_config(&run_args(None), false).unwrap_err();
        assert!(err.to_string().contains("--source-root"));
    }

    #[test]
    fn test_config_file_loads_and_flags_override() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("run.toml");
        fs::write(
            &config_path,
            r#"
source_root = "/src"
target_root = "/out"
overwrite = "skip"
"#,
        )
        .unwrap();

        let mut args = run_args(Some(config_path));
        args.target_root = Some(PathBuf::from("/elsewhere"));
        args.overwrite = Some(OverwriteMode::Replace);

        let config = resolve_run_config(&args, false).unwrap();
        assert_eq!(config.source_root, PathBuf::from("/src"));
        assert_eq!(config.target_root, PathBuf::from("/elsewhere"));
        assert_eq!(config.overwrite, OverwriteMode::Replace);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_dry_run_subcommand_forces_dry_run() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("run.toml");
        fs::write(&config_path, "source_root = \"/src\"\ntarget_root = \"/out\"\n").unwrap();

        let config = resolve_run_config(&run_args(Some(config_path)), true).unwrap();
        assert!(config.dry_run);
    }

    #[test]
    fn test_load_plan_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(
            &path,
            r#"{
  "plan_version": 1,
  "actions": [
    {
      "id": "a1",
      "type": "copy_topic",
      "target": "topics/a.dita",
      "reason": "test",
      "parameters": { "source_path": "a.dita", "target_path": "topics/a.dita" }
    }
  ]
}"#,
        )
        .unwrap();

        let plan = load_plan(&path).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.actions[0].action_type, "copy_topic");
    }
}
