//! Phase model and its derived status projection.

use serde::{Deserialize, Serialize};

use super::{PhaseStatus, Task, TaskStatus};

/// An ordered group of tasks whose dependencies all sit in earlier phases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    /// 1-based phase number
    pub id: u32,

    pub name: String,

    pub description: String,

    pub tasks: Vec<Task>,

    /// Projection of the task statuses; refreshed by
    /// [`crate::models::BuildPlan::recompute_phase_statuses`]
    #[serde(default)]
    pub status: PhaseStatus,

    /// Whether finishing this phase needs an explicit approval
    #[serde(default)]
    pub checkpoint: bool,
}

impl Phase {
    /// Computes the phase status from its tasks.
    ///
    /// All completed gives completed. Otherwise any in-progress or completed
    /// task makes the phase in progress, even next to a failed one; failed
    /// tasks only mark the phase failed when nothing else has moved. Pending
    /// and rolled-back tasks alone leave the phase pending. An empty phase
    /// counts as completed.
    pub fn derived_status(&self) -> PhaseStatus {
        let all_completed = self
            .tasks
            .iter()
            .all(|task| task.status == TaskStatus::Completed);
        let any = |status: TaskStatus| self.tasks.iter().any(|task| task.status == status);

        if all_completed {
            PhaseStatus::Completed
        } else if any(TaskStatus::InProgress) || any(TaskStatus::Completed) {
            PhaseStatus::InProgress
        } else if any(TaskStatus::Failed) {
            PhaseStatus::Failed
        } else {
            PhaseStatus::Pending
        }
    }
}
