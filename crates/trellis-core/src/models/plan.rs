//! Build plan model definition and read-only queries over its task graph.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{FileChange, Phase, PlanStatus, Progress, Task, TaskStatus};

/// The single active build plan of a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildPlan {
    /// Unique identifier for the plan
    pub id: u64,

    /// Project the plan belongs to
    pub project: String,

    /// What the build is meant to achieve
    pub description: String,

    /// Lifecycle status of the whole plan
    #[serde(default)]
    pub status: PlanStatus,

    /// 0-based index into `phases`
    pub current_phase: usize,

    /// Ordered phases, each embedding its tasks
    pub phases: Vec<Phase>,

    /// Token of the working session currently attached to the plan
    pub session_id: String,

    /// Write counter used for compare-and-swap updates
    pub version: u64,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,
}

/// A file change together with the task that recorded it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub task_id: String,
    #[serde(flatten)]
    pub change: FileChange,
}

impl BuildPlan {
    /// Iterates all tasks in phase order, then task order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.phases.iter().flat_map(|phase| phase.tasks.iter())
    }

    /// Looks up a task by id.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks().find(|task| task.id == task_id)
    }

    pub(crate) fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.phases
            .iter_mut()
            .flat_map(|phase| phase.tasks.iter_mut())
            .find(|task| task.id == task_id)
    }

    /// Index of the phase holding the given task.
    pub fn phase_index_of(&self, task_id: &str) -> Option<usize> {
        self.phases
            .iter()
            .position(|phase| phase.tasks.iter().any(|task| task.id == task_id))
    }

    /// Refreshes every phase's derived status from its tasks.
    pub fn recompute_phase_statuses(&mut self) {
        for phase in &mut self.phases {
            phase.status = phase.derived_status();
        }
    }

    /// Whether the plan still accepts work.
    pub fn is_active(&self) -> bool {
        self.status != PlanStatus::Completed
    }

    pub fn all_tasks_completed(&self) -> bool {
        self.tasks().all(|task| task.status == TaskStatus::Completed)
    }

    /// Dependencies of `task` that are not completed yet.
    pub fn unmet_dependencies(&self, task: &Task) -> Vec<String> {
        task.depends_on
            .iter()
            .filter(|dep| {
                self.task(dep)
                    .map_or(true, |dep_task| dep_task.status != TaskStatus::Completed)
            })
            .cloned()
            .collect()
    }

    /// First pending task, in phase then task order, whose dependencies are
    /// all completed.
    pub fn next_actionable_task(&self) -> Option<&Task> {
        self.tasks().find(|task| {
            task.status == TaskStatus::Pending && self.unmet_dependencies(task).is_empty()
        })
    }

    pub fn failed_tasks(&self) -> Vec<&Task> {
        self.tasks()
            .filter(|task| task.status == TaskStatus::Failed)
            .collect()
    }

    /// Whether the current phase is completed and waits for approval.
    pub fn at_checkpoint(&self) -> bool {
        self.phases
            .get(self.current_phase)
            .is_some_and(|phase| phase.checkpoint && phase.derived_status().is_completed())
    }

    pub fn is_last_phase(&self) -> bool {
        self.current_phase + 1 >= self.phases.len()
    }

    /// Counts tasks by status.
    pub fn progress(&self) -> Progress {
        Progress::from_tasks(self.tasks())
    }

    /// Every recorded file change across all tasks, in task order.
    pub fn file_ledger(&self) -> Vec<LedgerEntry> {
        self.tasks()
            .flat_map(|task| {
                task.file_changes.iter().map(|change| LedgerEntry {
                    task_id: task.id.clone(),
                    change: change.clone(),
                })
            })
            .collect()
    }
}
