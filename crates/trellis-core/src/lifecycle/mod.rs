//! Pure state transitions of a build plan.
//!
//! Every operation here works on an in-memory [`BuildPlan`] and either applies
//! its whole effect or returns an error without touching the plan. Persistence
//! and filesystem access are layered on top by [`crate::orchestrator`].
//!
//! - [`execution`]: reporting, starting and retrying tasks
//! - [`checkpoint`]: review, approve and reject at phase boundaries
//! - [`rollback`]: reversing a task and cascading to in-flight dependents
//! - [`resume`]: attaching a new session and finding the next step

pub mod checkpoint;
pub mod execution;
pub mod resume;
pub mod rollback;

pub use checkpoint::{CheckpointAction, CheckpointDecision, CheckpointReview};
pub use execution::ExecutionResult;
pub use resume::{FailedTask, NextStep, ResumeReport};
pub use rollback::{
    revert_file_changes, FileRevertOutcome, RevertResult, RollbackEffects, RollbackReport,
};

use crate::{
    error::{OrchestratorError, Result},
    models::{BuildPlan, Task, TaskStatus},
};

impl BuildPlan {
    /// Rejects callers whose session is no longer attached to the plan.
    ///
    /// `None` skips the check.
    pub fn check_session(&self, session_id: Option<&str>) -> Result<()> {
        match session_id {
            Some(given) if given != self.session_id => Err(OrchestratorError::SessionMismatch {
                given: given.to_string(),
                current: self.session_id.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn existing_task(&self, task_id: &str) -> Result<&Task> {
        self.task(task_id)
            .ok_or_else(|| OrchestratorError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }
}

fn ensure_transition(task: &Task, to: TaskStatus) -> Result<()> {
    if task.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(OrchestratorError::InvalidTransition {
            task_id: task.id.clone(),
            from: task.status,
            to,
        })
    }
}
