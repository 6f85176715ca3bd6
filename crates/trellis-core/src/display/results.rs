//! Result wrapper types for displaying operation outcomes.
//!
//! Each tool returns a structured result; these implementations turn them into
//! the markdown the agent or terminal user reads.

use std::fmt;

use crate::{
    layering::DropReason,
    lifecycle::{
        CheckpointAction, CheckpointDecision, CheckpointReview, ExecutionResult, NextStep,
        ResumeReport, RevertResult, RollbackReport,
    },
    models::Task,
    orchestrator::{CheckpointOutcome, PlanCreated},
};

/// Wrapper type for displaying the result of update operations.
///
/// Tracks the specific changes made so the caller gets clear feedback about
/// what was modified.
///
/// # Examples
///
/// ```rust
/// use trellis_core::{display::UpdateResult, models::{Task, TaskStatus}};
///
/// let task = Task {
///     id: "p1t1".to_string(),
///     name: "db".to_string(),
///     description: "Implement the db component".to_string(),
///     component: Some("db".to_string()),
///     depends_on: vec![],
///     expected_files: vec![],
///     status: TaskStatus::InProgress,
///     file_changes: vec![],
///     started: None,
///     completed: None,
///     error: None,
/// };
///
/// let result = UpdateResult::with_changes(task, vec!["Started task".to_string()]);
/// assert!(format!("{result}").contains("Updated task p1t1"));
/// ```
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    /// Create a new UpdateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    /// Create an UpdateResult with a list of changes made.
    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl fmt::Display for UpdateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated task {}", self.resource.id)?;

        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for PlanCreated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Created build plan with ID: {} ({} phases, {} tasks)",
            self.plan.id,
            self.plan.phases.len(),
            self.plan.tasks().count()
        )?;
        if let Some(old) = self.superseded {
            writeln!(f, "Superseded build plan {old}.")?;
        }

        if !self.forced.is_empty() || !self.dropped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Planning notes:")?;
            for name in &self.forced {
                writeln!(
                    f,
                    "- Dependency cycle: placed `{name}` before all of its dependencies"
                )?;
            }
            for dropped in &self.dropped {
                let why = match dropped.reason {
                    DropReason::Unknown => "is not part of the architecture",
                    DropReason::SelfReference => "refers to the component itself",
                    DropReason::NotEarlier => "is not in an earlier phase",
                };
                writeln!(
                    f,
                    "- Ignored dependency `{}` of `{}`: it {why}",
                    dropped.dependency, dropped.component
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Session ID: {}", self.plan.session_id)?;
        writeln!(f)?;
        write!(f, "{}", self.plan)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Recorded task {} as {}.",
            self.task_id,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        if self.phase_completed {
            writeln!(f, "- Phase {} is complete.", self.phase_index + 1)?;
        }
        if let Some(phase) = self.advanced_to {
            writeln!(f, "- Moved on to phase {}.", phase + 1)?;
        }
        if self.awaiting_approval {
            writeln!(
                f,
                "- Checkpoint reached: review and approve before continuing."
            )?;
        }
        writeln!(f, "- Build status: {}", self.plan_status)?;

        if !self.irreversible_changes.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "Warning: no previous content was recorded for these files, so they cannot be rolled back automatically:"
            )?;
            for path in &self.irreversible_changes {
                writeln!(f, "- `{path}`")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CheckpointReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Checkpoint review: {} (plan {})", self.project, self.plan_id)?;
        writeln!(f)?;
        writeln!(f, "- Build status: {}", self.plan_status)?;
        writeln!(
            f,
            "- Current phase: {} ({}){}",
            self.phase_name,
            self.phase_status,
            if self.checkpoint { " [checkpoint]" } else { "" }
        )?;
        writeln!(f, "- Completed: {}", self.progress.completed)?;
        writeln!(f, "- Pending: {}", self.progress.pending)?;
        writeln!(f, "- In progress: {}", self.progress.in_progress)?;
        writeln!(f, "- Failed: {}", self.progress.failed)?;
        if self.progress.rolled_back > 0 {
            writeln!(f, "- Rolled back: {}", self.progress.rolled_back)?;
        }

        writeln!(f)?;
        writeln!(f, "## File changes")?;
        writeln!(f)?;
        if self.ledger.is_empty() {
            writeln!(f, "No file changes recorded.")?;
        } else {
            for entry in &self.ledger {
                writeln!(f, "- {}: {}", entry.task_id, entry.change)?;
            }
        }

        if !self.guidance.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Next steps")?;
            writeln!(f)?;
            for line in &self.guidance {
                writeln!(f, "- {line}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CheckpointDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            CheckpointAction::Approve if self.capped => writeln!(
                f,
                "Approved. Phase {} is the last phase; the build stays on it.",
                self.current_phase + 1
            )?,
            CheckpointAction::Approve => writeln!(
                f,
                "Approved. Moved from phase {} to phase {}.",
                self.previous_phase + 1,
                self.current_phase + 1
            )?,
            CheckpointAction::Reject | CheckpointAction::Review => writeln!(
                f,
                "Rejected. The build is paused at phase {}.",
                self.current_phase + 1
            )?,
        }
        if let Some(reason) = &self.reason {
            writeln!(f, "Reason: {reason}")?;
        }
        writeln!(f, "Build status: {}", self.plan_status)
    }
}

impl fmt::Display for CheckpointOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointOutcome::Review(review) => write!(f, "{review}"),
            CheckpointOutcome::Decision(decision) => write!(f, "{decision}"),
        }
    }
}

impl fmt::Display for RollbackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let effects = &self.effects;
        writeln!(
            f,
            "Rolled back task {} (was {}).",
            effects.task_id, effects.previous_status
        )?;
        writeln!(f)?;

        if !effects.reset_dependents.is_empty() {
            writeln!(
                f,
                "- Reset in-progress dependents to pending: {}",
                effects.reset_dependents.join(", ")
            )?;
        }
        if effects.plan_reopened {
            writeln!(f, "- The build is no longer complete.")?;
        }
        writeln!(f, "- Build status: {}", self.plan_status)?;

        if self.files.is_empty() {
            writeln!(f)?;
            writeln!(f, "No file changes to revert.")?;
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "## Files")?;
        writeln!(f)?;
        for outcome in &self.files {
            let result = match &outcome.result {
                RevertResult::Deleted => "deleted".to_string(),
                RevertResult::Restored => "restored previous content".to_string(),
                RevertResult::Recreated => "recreated".to_string(),
                RevertResult::ManualIntervention { reason } => {
                    format!("needs manual intervention: {reason}")
                }
                RevertResult::Failed { error } => format!("failed: {error}"),
                RevertResult::Skipped => "skipped (no project root given)".to_string(),
            };
            writeln!(f, "- `{}` ({}): {result}", outcome.path, outcome.action)?;
        }
        Ok(())
    }
}

impl fmt::Display for ResumeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resumed build plan {} for {}.", self.plan_id, self.project)?;
        writeln!(f)?;
        writeln!(f, "- Session ID: {}", self.session_id)?;
        if self.previous_status != self.plan_status {
            writeln!(
                f,
                "- Status: {} (was {})",
                self.plan_status, self.previous_status
            )?;
        } else {
            writeln!(f, "- Status: {}", self.plan_status)?;
        }
        writeln!(
            f,
            "- Phase: {} of {}",
            self.current_phase + 1,
            self.total_phases
        )?;
        writeln!(f, "- Progress: {}", self.progress)?;
        if self.at_checkpoint {
            writeln!(
                f,
                "- The current phase is complete and waits for checkpoint approval."
            )?;
        }

        if !self.failed_tasks.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Failed tasks")?;
            writeln!(f)?;
            for task in &self.failed_tasks {
                match &task.error {
                    Some(error) => writeln!(f, "- {} ({}): {error}", task.task_id, task.name)?,
                    None => writeln!(f, "- {} ({})", task.task_id, task.name)?,
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "## Next step")?;
        writeln!(f)?;
        match &self.next_step {
            NextStep::Task {
                task_id,
                name,
                description,
                expected_files,
            } => {
                writeln!(f, "Work on {task_id} ({name}): {description}")?;
                for pattern in expected_files {
                    writeln!(f, "- `{pattern}`")?;
                }
            }
            NextStep::RetryFailed { task_id, name } => writeln!(
                f,
                "No task is ready. Task {task_id} ({name}) failed; roll it back or retry it."
            )?,
            NextStep::Waiting => writeln!(
                f,
                "No task is ready. Remaining tasks are in progress or waiting on dependencies."
            )?,
            NextStep::Done => writeln!(f, "Every task is completed.")?,
        }
        Ok(())
    }
}
