//! # ditaforge-core
//!
//! Shared domain types for the Ditaforge execution core.
//!
//! This crate provides:
//! - The plan model (`Plan`, `Action`) consumed from upstream planning
//! - The execution models (`ExecutionActionResult`, `ExecutionReport`)
//!   that record what actually happened during a run
//! - Run configuration (`RunConfig`, `OverwriteMode`)
//!
//! Plans describe intent. Execution models describe effects. The two are
//! deliberately separate: execution records are forensic, immutable once
//! created, and are never fed back into planning.

pub mod config;
pub mod execution;
pub mod plan;

pub use config::{OverwriteMode, RunConfig};
pub use execution::{
    ExecutionActionResult, ExecutionReport, ExecutionStatus, ExecutionSummary, FailureType,
};
pub use plan::{Action, Plan};
