//! Task operations: the execution gateway plus start and retry.

use jiff::Timestamp;
use log::{debug, warn};

use super::{load_active, Orchestrator};
use crate::{
    display::UpdateResult,
    error::{OrchestratorError, Result},
    lifecycle::ExecutionResult,
    models::Task,
    params::{ExecuteStep, TaskRef},
};

impl Orchestrator {
    /// Records an agent's report for one task.
    ///
    /// # Errors
    ///
    /// * `OrchestratorError::DependenciesIncomplete` - A dependency is not
    ///   completed yet
    /// * `OrchestratorError::InvalidTransition` - The task is not pending or in
    ///   progress
    /// * `OrchestratorError::VersionConflict` - The plan changed concurrently
    pub async fn execute_step(&self, params: &ExecuteStep) -> Result<ExecutionResult> {
        debug!(
            "execute_step: project={}, task_id={}, outcome={:?}, file_changes={}",
            params.project,
            params.task_id,
            params.outcome,
            params.file_changes.len()
        );
        params.validate()?;
        let params = params.clone();

        self.with_database(move |db| {
            let mut plan = load_active(db, &params.project)?;
            plan.check_session(params.session_id.as_deref())?;

            let result = plan.record_outcome(
                &params.task_id,
                params.outcome,
                params.file_changes,
                params.error,
                Timestamp::now(),
            )?;
            db.update_plan(&plan)?;

            if !result.irreversible_changes.is_empty() {
                warn!(
                    "Task {} recorded changes that cannot be rolled back: {}",
                    result.task_id,
                    result.irreversible_changes.join(", ")
                );
            }
            Ok(result)
        })
        .await
    }

    /// Marks a ready task as in progress.
    pub async fn start_step(&self, params: &TaskRef) -> Result<UpdateResult<Task>> {
        debug!(
            "start_step: project={}, task_id={}",
            params.project, params.task_id
        );
        let params = params.clone();

        self.with_database(move |db| {
            let mut plan = load_active(db, &params.project)?;
            plan.check_session(params.session_id.as_deref())?;
            plan.start_task(&params.task_id, Timestamp::now())?;
            let plan = db.update_plan(&plan)?;

            let task = stored_task(&plan, &params.task_id)?;
            Ok(UpdateResult::with_changes(
                task,
                vec!["Status: pending -> in_progress".to_string()],
            ))
        })
        .await
    }

    /// Returns a failed or rolled-back task to pending.
    pub async fn retry_step(&self, params: &TaskRef) -> Result<UpdateResult<Task>> {
        debug!(
            "retry_step: project={}, task_id={}",
            params.project, params.task_id
        );
        let params = params.clone();

        self.with_database(move |db| {
            let mut plan = load_active(db, &params.project)?;
            plan.check_session(params.session_id.as_deref())?;
            let previous = plan
                .task(&params.task_id)
                .map(|task| task.status)
                .unwrap_or_default();
            plan.retry_task(&params.task_id)?;
            let plan = db.update_plan(&plan)?;

            let task = stored_task(&plan, &params.task_id)?;
            Ok(UpdateResult::with_changes(
                task,
                vec![format!("Status: {previous} -> pending")],
            ))
        })
        .await
    }
}

fn stored_task(plan: &crate::models::BuildPlan, task_id: &str) -> Result<Task> {
    plan.task(task_id)
        .cloned()
        .ok_or_else(|| OrchestratorError::TaskNotFound {
            task_id: task_id.to_string(),
        })
}
