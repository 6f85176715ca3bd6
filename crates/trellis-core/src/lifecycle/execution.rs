//! Execution gateway transitions: report, start and retry a task.

use jiff::Timestamp;
use log::info;
use serde::{Deserialize, Serialize};

use super::ensure_transition;
use crate::{
    error::{OrchestratorError, Result},
    models::{BuildPlan, FileChange, PlanStatus, StepOutcome, TaskStatus},
};

/// What an accepted step report changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    pub task_id: String,
    pub status: TaskStatus,
    /// 0-based phase holding the task
    pub phase_index: usize,
    pub phase_completed: bool,
    /// New 0-based current phase when the plan moved past non-checkpoint phases
    pub advanced_to: Option<usize>,
    /// Current phase is completed and waits for an approval
    pub awaiting_approval: bool,
    pub plan_status: PlanStatus,
    /// Changes without `previous_content` that rollback could not undo
    pub irreversible_changes: Vec<String>,
}

impl BuildPlan {
    /// Applies an agent's report for one task.
    ///
    /// The task must be pending (or claimed through [`BuildPlan::start_task`])
    /// and every dependency must be completed. Otherwise nothing changes.
    pub fn record_outcome(
        &mut self,
        task_id: &str,
        outcome: StepOutcome,
        file_changes: Vec<FileChange>,
        error: Option<String>,
        now: Timestamp,
    ) -> Result<ExecutionResult> {
        let target = TaskStatus::from(outcome);
        let task = self.existing_task(task_id)?;
        ensure_transition(task, target)?;
        self.ensure_dependencies_completed(task_id)?;

        let irreversible_changes = file_changes
            .iter()
            .filter(|change| !change.is_reversible())
            .map(|change| change.path.clone())
            .collect();

        if let Some(task) = self.task_mut(task_id) {
            task.status = target;
            task.file_changes = file_changes;
            task.started = task.started.or(Some(now));
            task.completed = Some(now);
            task.error = error;
        }
        self.recompute_phase_statuses();

        if self.all_tasks_completed() {
            self.status = PlanStatus::Completed;
        } else if self.status == PlanStatus::Planning {
            self.status = PlanStatus::InProgress;
        }

        let advanced_to = self.advance_past_open_phases();
        let phase_index = self.phase_index_of(task_id).unwrap_or_default();
        let phase_completed = self.phases[phase_index].status.is_completed();

        info!(
            "Task {task_id} reported {} (phase {} {})",
            target.as_str(),
            phase_index + 1,
            self.phases[phase_index].status.as_str()
        );

        Ok(ExecutionResult {
            task_id: task_id.to_string(),
            status: target,
            phase_index,
            phase_completed,
            advanced_to,
            awaiting_approval: self.at_checkpoint() && self.status != PlanStatus::Completed,
            plan_status: self.status,
            irreversible_changes,
        })
    }

    /// Claims a pending task whose dependencies are completed.
    pub fn start_task(&mut self, task_id: &str, now: Timestamp) -> Result<()> {
        let task = self.existing_task(task_id)?;
        ensure_transition(task, TaskStatus::InProgress)?;
        self.ensure_dependencies_completed(task_id)?;

        if let Some(task) = self.task_mut(task_id) {
            task.status = TaskStatus::InProgress;
            task.started = Some(now);
        }
        if self.status == PlanStatus::Planning {
            self.status = PlanStatus::InProgress;
        }
        self.recompute_phase_statuses();
        Ok(())
    }

    /// Returns a failed or rolled-back task to `pending`.
    ///
    /// A failed task that recorded file changes must be rolled back first so
    /// its ledger is not lost.
    pub fn retry_task(&mut self, task_id: &str) -> Result<()> {
        let task = self.existing_task(task_id)?;
        ensure_transition(task, TaskStatus::Pending)?;
        if task.status == TaskStatus::InProgress {
            return Err(OrchestratorError::InvalidTransition {
                task_id: task_id.to_string(),
                from: task.status,
                to: TaskStatus::Pending,
            });
        }
        if !task.file_changes.is_empty() {
            return Err(OrchestratorError::invalid_input("task_id").with_reason(format!(
                "task '{task_id}' recorded {} file change(s); roll it back before retrying",
                task.file_changes.len()
            )));
        }

        if let Some(task) = self.task_mut(task_id) {
            task.status = TaskStatus::Pending;
            task.started = None;
            task.completed = None;
            task.error = None;
        }
        self.recompute_phase_statuses();
        Ok(())
    }

    fn ensure_dependencies_completed(&self, task_id: &str) -> Result<()> {
        let task = self.existing_task(task_id)?;
        let blocked_by = self.unmet_dependencies(task);
        if blocked_by.is_empty() {
            Ok(())
        } else {
            Err(OrchestratorError::DependenciesIncomplete {
                task_id: task_id.to_string(),
                blocked_by,
            })
        }
    }

    /// Moves `current_phase` past completed phases that need no approval.
    fn advance_past_open_phases(&mut self) -> Option<usize> {
        let start = self.current_phase;
        while !self.is_last_phase() {
            let phase = &self.phases[self.current_phase];
            if phase.checkpoint || !phase.status.is_completed() {
                break;
            }
            self.current_phase += 1;
        }
        (self.current_phase != start).then_some(self.current_phase)
    }
}
