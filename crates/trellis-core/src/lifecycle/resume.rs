//! Attaching a new session to a stalled or paused plan.

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OrchestratorError, Result},
    models::{BuildPlan, PlanStatus, Progress},
};

/// A failed task and what it reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailedTask {
    pub task_id: String,
    pub name: String,
    pub error: Option<String>,
}

/// What the agent should do next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextStep {
    /// A pending task with all dependencies completed
    Task {
        task_id: String,
        name: String,
        description: String,
        expected_files: Vec<String>,
    },
    /// Nothing is ready but a failed task needs attention
    RetryFailed { task_id: String, name: String },
    /// Remaining tasks are in progress or blocked
    Waiting,
    /// Every task is completed
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeReport {
    pub plan_id: u64,
    pub project: String,
    pub session_id: String,
    pub previous_session_id: String,
    pub previous_status: PlanStatus,
    pub plan_status: PlanStatus,
    pub current_phase: usize,
    pub total_phases: usize,
    pub progress: Progress,
    pub failed_tasks: Vec<FailedTask>,
    /// Current phase is completed and waits for an approval
    pub at_checkpoint: bool,
    pub next_step: NextStep,
}

impl BuildPlan {
    /// Replaces the attached session and unpauses the plan.
    ///
    /// Returns the status the plan had before.
    pub fn attach_session(&mut self, session_id: String) -> Result<PlanStatus> {
        if !self.is_active() {
            return Err(OrchestratorError::NoActivePlan {
                project: self.project.clone(),
            });
        }
        let previous = self.status;
        if previous == PlanStatus::Paused {
            self.status = PlanStatus::InProgress;
        }
        info!(
            "Attached session {session_id} to plan {} (was {})",
            self.id, self.session_id
        );
        self.session_id = session_id;
        Ok(previous)
    }

    /// Next pending task whose dependencies are done, else the first failed
    /// task.
    pub fn next_step(&self) -> NextStep {
        if let Some(task) = self.next_actionable_task() {
            return NextStep::Task {
                task_id: task.id.clone(),
                name: task.name.clone(),
                description: task.description.clone(),
                expected_files: task.expected_files.clone(),
            };
        }
        if let Some(task) = self.failed_tasks().first() {
            return NextStep::RetryFailed {
                task_id: task.id.clone(),
                name: task.name.clone(),
            };
        }
        if self.all_tasks_completed() {
            NextStep::Done
        } else {
            NextStep::Waiting
        }
    }

    /// Builds the resume response after a session was attached.
    pub fn resume_report(&self, previous_session_id: String, previous_status: PlanStatus) -> ResumeReport {
        ResumeReport {
            plan_id: self.id,
            project: self.project.clone(),
            session_id: self.session_id.clone(),
            previous_session_id,
            previous_status,
            plan_status: self.status,
            current_phase: self.current_phase,
            total_phases: self.phases.len(),
            progress: self.progress(),
            failed_tasks: self
                .failed_tasks()
                .into_iter()
                .map(|task| FailedTask {
                    task_id: task.id.clone(),
                    name: task.name.clone(),
                    error: task.error.clone(),
                })
                .collect(),
            at_checkpoint: self.at_checkpoint(),
            next_step: self.next_step(),
        }
    }
}
