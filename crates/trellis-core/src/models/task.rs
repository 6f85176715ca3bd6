//! Task model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{FileChange, TaskStatus};

/// One unit of build work, usually covering one architecture component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Stable identifier of the form `p<phase>t<task>`
    pub id: String,

    /// Short name, the component name for planned tasks
    pub name: String,

    /// What the task is expected to produce
    pub description: String,

    /// Architecture component this task builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Task ids that must be completed first; always from earlier phases
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// File globs inherited from the component
    #[serde(default)]
    pub expected_files: Vec<String>,

    /// Current lifecycle status
    #[serde(default)]
    pub status: TaskStatus,

    /// Ledger of file effects reported for this task
    #[serde(default)]
    pub file_changes: Vec<FileChange>,

    /// When work on the task started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<Timestamp>,

    /// When the task was reported completed or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<Timestamp>,

    /// Failure message reported by the agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Builds the deterministic task id for a 1-based phase and task number.
    pub fn task_id(phase_number: usize, task_number: usize) -> String {
        format!("p{phase_number}t{task_number}")
    }
}
