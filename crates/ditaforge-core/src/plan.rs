//! Plan model.
//!
//! A plan is a declarative, externally produced description of intended
//! filesystem changes. It is read-only input to the execution core: this
//! crate never constructs plans from discovery data and never mutates
//! them. A plan does not know whether it has been executed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single executable action in a plan.
///
/// This is a declarative description, not an execution record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier of the action within the plan.
    pub id: String,

    /// Action type; key into the handler registry.
    #[serde(rename = "type")]
    pub action_type: String,

    /// Handler-specific target path string.
    pub target: String,

    /// Why the planner emitted this action.
    #[serde(default)]
    pub reason: String,

    /// Handler-specific parameters (JSON-compatible values).
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,

    /// Whether the action is executed in dry-run mode.
    ///
    /// Set by the run mode at execution time, never by the plan author.
    #[serde(default)]
    pub dry_run: bool,
}

impl Action {
    /// Fetch a required string parameter.
    ///
    /// Returns `None` when the parameter is missing, not a string, or
    /// empty after trimming.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Immutable execution plan produced by upstream planning.
///
/// Action order is significant: execution applies actions strictly in
/// the order they appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Plan schema version.
    #[serde(default = "default_plan_version")]
    pub plan_version: u32,

    /// Ordered actions to apply.
    pub actions: Vec<Action>,
}

fn default_plan_version() -> u32 {
    1
}

impl Plan {
    /// Create a plan from a list of actions.
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            plan_version: default_plan_version(),
            actions,
        }
    }

    /// Number of actions in the plan.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the plan carries no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
