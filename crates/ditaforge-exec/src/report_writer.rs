//! Deterministic execution report writer.
//!
//! The final serialization boundary of the execution layer. Identical
//! reports must produce byte-identical files: keys sorted, two-space
//! indentation, UTF-8, trailing newline. Required for reproducible
//! audits and fixtures.

use crate::error::ReportWriteError;
use ditaforge_core::ExecutionReport;
use std::fs;
use std::path::Path;

/// Writes [`ExecutionReport`]s to disk deterministically.
///
/// Determinism comes from serializing through `serde_json::Value`,
/// whose object representation keeps keys sorted.
#[derive(Debug, Clone, Default)]
pub struct ReportWriter;

impl ReportWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, report: &ExecutionReport, path: &Path) -> Result<(), ReportWriteError> {
        tracing::info!(
            execution_id = %report.execution_id,
            path = %path.display(),
            "Writing execution report"
        );

        let value = serde_json::to_value(report)?;
        let mut serialized = serde_json::to_string_pretty(&value)?;
        serialized.push('\n');

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ReportWriteError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, &serialized).map_err(|source| ReportWriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            bytes = serialized.len(),
            path = %path.display(),
            "Execution report written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditaforge_core::ExecutionActionResult;
    use tempfile::TempDir;

    fn sample_report() -> ExecutionReport {
        ExecutionReport::create(
            "exec-1",
            false,
            vec![ExecutionActionResult::success(
                "a1",
                "CopyTopicHandler",
                false,
                "copied",
            )],
        )
    }

    #[test]
    fn test_identical_reports_write_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let report = sample_report();
        let writer = ReportWriter::new();

        let first = dir.path().join("one.json");
        let second = dir.path().join("two.json");
        writer.write(&report, &first).unwrap();
        writer.write(&report, &second).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/nested/report.json");
        ReportWriter::new().write(&sample_report(), &path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_output_ends_with_newline_and_sorted_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        ReportWriter::new().write(&sample_report(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));

        // Top-level keys appear in sorted order.
        let dry = text.find("\"dry_run\"").unwrap();
        let exec = text.find("\"execution_id\"").unwrap();
        let generated = text.find("\"generated_at\"").unwrap();
        assert!(dry < exec && exec < generated);
    }
}
