//! Run configuration.
//!
//! Configuration for one execution run. Values can come from a TOML
//! file, environment, or CLI flags; merging happens at the CLI boundary,
//! this module only defines the types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overwrite behavior for existing target paths.
///
/// These are global invariants for filesystem mutation: one mode per
/// run, applied by the mutation policy to every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteMode {
    /// Refuse to overwrite any existing path.
    #[default]
    Deny,
    /// Overwrite existing paths.
    Replace,
    /// Leave existing paths untouched.
    Skip,
}

impl std::fmt::Display for OverwriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deny => write!(f, "deny"),
            Self::Replace => write!(f, "replace"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Configuration for a single execution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Root directory containing source artifacts.
    pub source_root: PathBuf,

    /// Target root: both the sandbox boundary and the materialization
    /// destination.
    pub target_root: PathBuf,

    /// Overwrite behavior for existing targets.
    #[serde(default)]
    pub overwrite: OverwriteMode,

    /// Simulate only; no filesystem mutation.
    #[serde(default)]
    pub dry_run: bool,

    /// Where to write the execution report, if anywhere.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_mode_wire_names() {
        let mode: OverwriteMode = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(mode, OverwriteMode::Replace);
        assert_eq!(OverwriteMode::Deny.to_string(), "deny");
    }

    #[test]
    fn test_run_config_defaults() {
        let config: RunConfig = serde_json::from_str(
            r#"{"source_root": "/src", "target_root": "/out"}"#,
        )
        .unwrap();
        assert_eq!(config.overwrite, OverwriteMode::Deny);
        assert!(!config.dry_run);
        assert!(config.report_path.is_none());
    }
}
