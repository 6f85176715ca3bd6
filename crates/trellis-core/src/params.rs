//! Parameter structures for orchestrator operations.
//!
//! These structures are shared by every interface (CLI, MCP) and carry only
//! serde derives, plus `schemars::JsonSchema` behind the `schema` feature.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Interface layers wrap these types (`#[serde(transparent)]` on the MCP side,
//! `From` conversions from clap structs on the CLI side) and hand them to the
//! [`crate::Orchestrator`].

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OrchestratorError, Result},
    lifecycle::CheckpointAction,
    models::{Component, FileChange, StepOutcome},
};

/// Parameters for operations that only name a project.
///
/// Used by resume_build, show_build and show_architecture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ProjectRef {
    /// Name of the project
    pub project: String,
}

/// Parameters for replacing a project's architecture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DefineArchitecture {
    /// Name of the project
    pub project: String,
    /// Components in declaration order; replaces any previous list
    pub components: Vec<Component>,
}

/// Parameters for planning a build from the stored architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PlanBuild {
    /// Name of the project whose architecture is planned
    pub project: String,
    /// What the build should achieve
    #[serde(default)]
    pub description: String,
    /// Whether every phase needs an explicit approval before the next one
    /// starts (default true)
    #[serde(default = "default_checkpoints")]
    pub checkpoints: bool,
    /// Supersede an existing active plan instead of failing
    #[serde(default)]
    pub replace: bool,
}

fn default_checkpoints() -> bool {
    true
}

impl Default for PlanBuild {
    fn default() -> Self {
        Self {
            project: String::new(),
            description: String::new(),
            checkpoints: default_checkpoints(),
            replace: false,
        }
    }
}

/// Parameters for reporting the outcome of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ExecuteStep {
    /// Name of the project
    pub project: String,
    /// Task identifier such as `p1t2`
    pub task_id: String,
    /// `completed` or `failed`
    pub outcome: StepOutcome,
    /// Files the task created, modified or deleted. Include
    /// `previous_content` for modified and deleted files so the change can be
    /// rolled back.
    #[serde(default)]
    pub file_changes: Vec<FileChange>,
    /// What went wrong, for failed tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Session returned by plan_build or resume_build; rejected if stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ExecuteStep {
    /// Checks the report before it touches the plan.
    ///
    /// # Errors
    ///
    /// * `OrchestratorError::InvalidInput` - When a file change has an empty
    ///   path or the same path is reported twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for change in &self.file_changes {
            if change.path.trim().is_empty() {
                return Err(OrchestratorError::invalid_input("file_changes")
                    .with_reason("file change paths cannot be empty"));
            }
            if !seen.insert(change.path.as_str()) {
                return Err(OrchestratorError::invalid_input("file_changes")
                    .with_reason(format!("'{}' is reported more than once", change.path)));
            }
        }
        Ok(())
    }
}

/// Parameters for operations on a single task (start_step, retry_step).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TaskRef {
    /// Name of the project
    pub project: String,
    /// Task identifier such as `p1t2`
    pub task_id: String,
    /// Session returned by plan_build or resume_build; rejected if stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Parameters for the checkpoint gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReviewCheckpoint {
    /// Name of the project
    pub project: String,
    /// `review` (read-only), `approve` (next phase) or `reject` (pause)
    #[serde(default)]
    pub action: CheckpointAction,
    /// Why the phase was rejected; echoed back, not stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Session returned by plan_build or resume_build; approve and reject are
    /// rejected if it is stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Parameters for rolling back a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RollbackStep {
    /// Name of the project
    pub project: String,
    /// Task to roll back; defaults to the last completed or failed task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Code root the ledger paths are relative to. Without it the task status
    /// is still rolled back but no file is touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root_path: Option<String>,
    /// Session returned by plan_build or resume_build; rejected if stale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Parameters for listing build plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListBuilds {
    /// Whether to include completed builds
    #[serde(default)]
    pub include_completed: bool,
}
