//! Progress counters and plan summary projections.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{BuildPlan, PlanStatus, Task, TaskStatus};

/// Task counts by status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub failed: u32,
    pub rolled_back: u32,
}

impl Progress {
    /// Tallies the given tasks.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut acc, task| {
            acc.total += 1;
            match task.status {
                TaskStatus::Pending => acc.pending += 1,
                TaskStatus::InProgress => acc.in_progress += 1,
                TaskStatus::Completed => acc.completed += 1,
                TaskStatus::Failed => acc.failed += 1,
                TaskStatus::RolledBack => acc.rolled_back += 1,
            }
            acc
        })
    }

    /// Tasks that still need work, whatever the reason.
    pub fn remaining(&self) -> u32 {
        self.total - self.completed
    }
}

/// Summary information about a build plan for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Plan ID
    pub id: u64,
    /// Project the plan belongs to
    pub project: String,
    /// What the build is meant to achieve
    pub description: String,
    /// Plan status
    pub status: PlanStatus,
    /// 0-based current phase
    pub current_phase: usize,
    /// Number of phases
    pub total_phases: u32,
    /// Number of phases whose tasks are all completed
    pub completed_phases: u32,
    /// Task status breakdown
    pub progress: Progress,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
}

impl From<&BuildPlan> for PlanSummary {
    fn from(plan: &BuildPlan) -> Self {
        let completed_phases = plan
            .phases
            .iter()
            .filter(|phase| phase.derived_status().is_completed())
            .count() as u32;

        Self {
            id: plan.id,
            project: plan.project.clone(),
            description: plan.description.clone(),
            status: plan.status,
            current_phase: plan.current_phase,
            total_phases: plan.phases.len() as u32,
            completed_phases,
            progress: plan.progress(),
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}
