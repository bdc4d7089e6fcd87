//! Execution dispatcher.
//!
//! The dispatcher is a deterministic action sequencer. It receives a
//! validated plan, drives the injected executor through it strictly in
//! plan order, collects results, and assembles the report. It performs
//! no planning, no handler resolution, no filesystem logic. It is
//! intentionally dumb.

use crate::error::{DispatchError, HandlerError};
use ditaforge_core::{
    Action, ExecutionActionResult, ExecutionReport, FailureType, Plan,
};

/// The contract the dispatcher drives.
///
/// `execute` returns `Ok` with a result for every normal outcome and
/// `Err` only when the attempt crashed. Implementations must never
/// mutate the plan and must fail the whole run only through the `Err`
/// path.
pub trait ActionExecutor {
    /// Executor name recorded on crash results.
    fn name(&self) -> &str;

    fn execute(&self, action: &Action) -> Result<ExecutionActionResult, HandlerError>;
}

/// Deterministic action sequencer over one executor.
pub struct ExecutionDispatcher<'a> {
    executor: &'a dyn ActionExecutor,
}

impl<'a> ExecutionDispatcher<'a> {
    pub fn new(executor: &'a dyn ActionExecutor) -> Self {
        tracing::debug!(executor = executor.name(), "ExecutionDispatcher initialized");
        Self { executor }
    }

    /// Execute all actions sequentially and assemble the report.
    ///
    /// Plan shape is validated first; a structurally invalid plan fails
    /// fast, before any execution, with no report. If the executor
    /// crashes mid-run, exactly one failed `handler_error` result is
    /// recorded for the crashing action and dispatch stops, still
    /// returning a valid report of everything attempted so far.
    pub fn dispatch(
        &self,
        execution_id: &str,
        plan: &Plan,
        dry_run: bool,
    ) -> Result<ExecutionReport, DispatchError> {
        tracing::info!(
            execution_id,
            dry_run,
            actions = plan.len(),
            "Starting execution dispatch"
        );

        self.validate_shape(plan)?;

        let mut results: Vec<ExecutionActionResult> = Vec::with_capacity(plan.len());

        for action in &plan.actions {
            tracing::info!(
                action_id = %action.id,
                action_type = %action.action_type,
                "Dispatching action"
            );

            // The run mode, not the plan author, decides dry-run.
            let mut action = action.clone();
            action.dry_run = dry_run;

            match self.executor.execute(&action) {
                Ok(result) => results.push(result),
                Err(err) => {
                    tracing::error!(
                        action_id = %action.id,
                        error = %err,
                        "Executor crashed; halting dispatch"
                    );
                    results.push(ExecutionActionResult::failed(
                        &action.id,
                        self.executor.name(),
                        dry_run,
                        "executor crashed",
                        err.to_string(),
                        FailureType::HandlerError,
                    ));
                    break;
                }
            }
        }

        let report = ExecutionReport::create(execution_id, dry_run, results);

        tracing::info!(
            execution_id,
            attempted = report.results.len(),
            "Execution dispatch complete"
        );
        Ok(report)
    }

    fn validate_shape(&self, plan: &Plan) -> Result<(), DispatchError> {
        for action in &plan.actions {
            if action.action_type.trim().is_empty() {
                return Err(DispatchError::MissingActionType {
                    action_id: action.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditaforge_core::ExecutionStatus;
    use serde_json::json;

    fn action(id: &str, action_type: &str) -> Action {
        serde_json::from_value(json!({
            "id": id,
            "type": action_type,
            "target": "x",
        }))
        .unwrap()
    }

    /// Executor that crashes on a designated action id.
    struct CrashingExecutor {
        crash_on: &'static str,
    }

    impl ActionExecutor for CrashingExecutor {
        fn name(&self) -> &str {
            "CrashingExecutor"
        }

        fn execute(&self, action: &Action) -> Result<ExecutionActionResult, HandlerError> {
            if action.id == self.crash_on {
                return Err(HandlerError::Crash("boom".into()));
            }
            Ok(ExecutionActionResult::success(
                &action.id,
                self.name(),
                action.dry_run,
                "ok",
            ))
        }
    }

    #[test]
    fn test_crash_halts_and_preserves_prior_results() {
        let executor = CrashingExecutor { crash_on: "a2" };
        let plan = Plan::new(vec![
            action("a1", "noop"),
            action("a2", "noop"),
            action("a3", "noop"),
        ]);

        let report = ExecutionDispatcher::new(&executor)
            .dispatch("exec-1", &plan, false)
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].action_id, "a1");
        assert_eq!(report.results[0].status, ExecutionStatus::Success);
        assert_eq!(report.results[1].action_id, "a2");
        assert_eq!(report.results[1].status, ExecutionStatus::Failed);
        assert_eq!(
            report.results[1].failure_type,
            Some(FailureType::HandlerError)
        );
        assert!(report.results[1].error.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn test_empty_action_type_fails_before_execution() {
        let executor = CrashingExecutor { crash_on: "never" };
        let plan = Plan::new(vec![action("a1", "noop"), action("a2", "  ")]);

        let err = ExecutionDispatcher::new(&executor)
            .dispatch("exec-1", &plan, false)
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::MissingActionType { ref action_id } if action_id == "a2"
        ));
    }

    #[test]
    fn test_dry_run_flag_is_forced_by_run_mode() {
        let executor = CrashingExecutor { crash_on: "never" };
        let plan = Plan::new(vec![action("a1", "noop")]);

        let report = ExecutionDispatcher::new(&executor)
            .dispatch("exec-1", &plan, true)
            .unwrap();
        assert!(report.dry_run);
        assert!(report.results[0].dry_run);
    }

    #[test]
    fn test_empty_plan_yields_empty_report() {
        let executor = CrashingExecutor { crash_on: "never" };
        let report = ExecutionDispatcher::new(&executor)
            .dispatch("exec-1", &Plan::new(vec![]), false)
            .unwrap();
        assert_eq!(report.summary.total, 0);
    }
}
