//! Execution models.
//!
//! These models describe what *actually happened* during execution. They
//! are forensic records, not intentions: each is created exactly once
//! per attempted action and never edited afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a single attempted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// The handler performed its effect.
    Success,
    /// The action failed; see `failure_type`.
    Failed,
    /// Nothing to do: dry-run, idempotent no-op, or policy skip.
    Skipped,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Structured classification of why a failure occurred.
///
/// Only meaningful when status is `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    /// The handler raised unexpectedly; fatal to the run.
    HandlerError,
    /// A mutation policy decision blocked one write; fatal to that
    /// action only.
    PolicyViolation,
    /// Structural misconfiguration detected outside normal handler
    /// execution.
    ExecutorError,
}

/// Result of executing a single planned action.
///
/// Serializes to exactly the keys `{action_id, status, handler, dry_run,
/// message, error, failure_type, metadata}`. `error` and `failure_type`
/// serialize as JSON null when absent; renaming or adding keys is a
/// breaking change to the run contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionActionResult {
    /// ID of the action from the plan.
    pub action_id: String,

    /// Outcome status.
    pub status: ExecutionStatus,

    /// Name of the handler (or executor) that produced this result.
    pub handler: String,

    /// Whether execution was a dry-run.
    pub dry_run: bool,

    /// Human-readable description of the outcome.
    pub message: String,

    /// Error message if a failure occurred.
    pub error: Option<String>,

    /// Failure classification; only set when status is `Failed`.
    pub failure_type: Option<FailureType>,

    /// Optional structured execution metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ExecutionActionResult {
    /// Successful action outcome.
    pub fn success(
        action_id: impl Into<String>,
        handler: impl Into<String>,
        dry_run: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            status: ExecutionStatus::Success,
            handler: handler.into(),
            dry_run,
            message: message.into(),
            error: None,
            failure_type: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Skipped action outcome (dry-run or idempotent no-op).
    pub fn skipped(
        action_id: impl Into<String>,
        handler: impl Into<String>,
        dry_run: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            status: ExecutionStatus::Skipped,
            handler: handler.into(),
            dry_run,
            message: message.into(),
            error: None,
            failure_type: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Failed action outcome with a failure classification.
    pub fn failed(
        action_id: impl Into<String>,
        handler: impl Into<String>,
        dry_run: bool,
        message: impl Into<String>,
        error: impl Into<String>,
        failure_type: FailureType,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            status: ExecutionStatus::Failed,
            handler: handler.into(),
            dry_run,
            message: message.into(),
            error: Some(error.into()),
            failure_type: Some(failure_type),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach structured metadata to this result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Aggregated per-status counts for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
}

impl ExecutionSummary {
    /// Count of results with a given status.
    pub fn count(&self, status: ExecutionStatus) -> usize {
        match status {
            ExecutionStatus::Success => self.success,
            ExecutionStatus::Failed => self.failed,
            ExecutionStatus::Skipped => self.skipped,
        }
    }
}

/// Root execution report: the complete forensic record of one run.
///
/// Invariant: `summary.total` equals the result count, and each
/// per-status count equals the number of results with that status. The
/// invariant holds because reports are only assembled through
/// [`ExecutionReport::create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Unique identifier for this execution run.
    pub execution_id: String,

    /// When the report was created.
    pub generated_at: DateTime<Utc>,

    /// Whether execution was simulated.
    pub dry_run: bool,

    /// Per-action results, in plan order.
    pub results: Vec<ExecutionActionResult>,

    /// Aggregated statistics for quick inspection.
    pub summary: ExecutionSummary,
}

impl ExecutionReport {
    /// Assemble a report, computing the summary from the results.
    pub fn create(
        execution_id: impl Into<String>,
        dry_run: bool,
        results: Vec<ExecutionActionResult>,
    ) -> Self {
        let execution_id = execution_id.into();

        let mut summary = ExecutionSummary {
            success: 0,
            failed: 0,
            skipped: 0,
            total: results.len(),
        };

        for r in &results {
            match r.status {
                ExecutionStatus::Success => summary.success += 1,
                ExecutionStatus::Failed => summary.failed += 1,
                ExecutionStatus::Skipped => summary.skipped += 1,
            }
        }

        tracing::info!(
            execution_id = %execution_id,
            dry_run,
            total = summary.total,
            success = summary.success,
            failed = summary.failed,
            skipped = summary.skipped,
            "Execution report assembled"
        );

        Self {
            execution_id,
            generated_at: Utc::now(),
            dry_run,
            results,
            summary,
        }
    }

    /// Whether the run completed without any failed action.
    pub fn is_clean(&self) -> bool {
        self.summary.failed == 0
    }
}
