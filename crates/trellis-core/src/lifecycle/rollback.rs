//! Reversing a task: status reset, dependent cascade and file reversal.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::ensure_transition;
use crate::{
    error::{OrchestratorError, Result},
    fs::{join_within_root, Filesystem},
    models::{BuildPlan, FileAction, FileChange, PlanStatus, TaskStatus},
};

/// Status-side effects of rolling back one task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollbackEffects {
    pub task_id: String,
    pub previous_status: TaskStatus,
    /// Ledger the task held before it was cleared
    pub file_changes: Vec<FileChange>,
    /// In-progress dependents returned to pending
    pub reset_dependents: Vec<String>,
    /// The plan was completed and is back in progress
    pub plan_reopened: bool,
}

/// How one file change was handled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RevertResult {
    /// A created file was removed
    Deleted,
    /// A modified file got its previous content back
    Restored,
    /// A deleted file was written again
    Recreated,
    /// Nothing to restore from; someone has to fix it by hand
    ManualIntervention { reason: String },
    /// The filesystem refused the operation
    Failed { error: String },
    /// No project root was given
    Skipped,
}

impl RevertResult {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RevertResult::Deleted | RevertResult::Restored | RevertResult::Recreated
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRevertOutcome {
    pub path: String,
    pub action: FileAction,
    #[serde(flatten)]
    pub result: RevertResult,
}

/// Full response of a rollback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollbackReport {
    pub plan_id: u64,
    pub effects: RollbackEffects,
    pub files: Vec<FileRevertOutcome>,
    pub plan_status: PlanStatus,
}

impl RollbackReport {
    /// Outcomes that need attention from the caller.
    pub fn problems(&self) -> impl Iterator<Item = &FileRevertOutcome> {
        self.files
            .iter()
            .filter(|outcome| !outcome.result.is_success() && outcome.result != RevertResult::Skipped)
    }
}

impl BuildPlan {
    /// Picks the task to roll back.
    ///
    /// Without an explicit id this is the last task in plan order whose status
    /// is completed or failed.
    pub fn rollback_target(&self, task_id: Option<&str>) -> Result<String> {
        match task_id {
            Some(id) => Ok(self.existing_task(id)?.id.clone()),
            None => self
                .tasks()
                .filter(|task| task.status.is_reversible())
                .last()
                .map(|task| task.id.clone())
                .ok_or_else(|| OrchestratorError::NothingToRollback {
                    project: self.project.clone(),
                }),
        }
    }

    /// Marks a completed or failed task rolled back and resets dependents
    /// that were in flight. Completed dependents are left alone.
    pub fn rollback_task(&mut self, task_id: &str) -> Result<RollbackEffects> {
        let task = self.existing_task(task_id)?;
        ensure_transition(task, TaskStatus::RolledBack)?;
        let previous_status = task.status;

        let mut file_changes = Vec::new();
        if let Some(task) = self.task_mut(task_id) {
            file_changes = std::mem::take(&mut task.file_changes);
            task.status = TaskStatus::RolledBack;
            task.completed = None;
            task.error = None;
        }

        let mut reset_dependents = Vec::new();
        for task in self.phases.iter_mut().flat_map(|phase| phase.tasks.iter_mut()) {
            if task.status == TaskStatus::InProgress
                && task.depends_on.iter().any(|dep| dep == task_id)
            {
                task.status = TaskStatus::Pending;
                task.started = None;
                reset_dependents.push(task.id.clone());
            }
        }

        self.recompute_phase_statuses();
        let plan_reopened = self.status == PlanStatus::Completed;
        if plan_reopened {
            self.status = PlanStatus::InProgress;
        }

        info!(
            "Rolled back task {task_id} ({} file change(s), {} dependent(s) reset)",
            file_changes.len(),
            reset_dependents.len()
        );

        Ok(RollbackEffects {
            task_id: task_id.to_string(),
            previous_status,
            file_changes,
            reset_dependents,
            plan_reopened,
        })
    }
}

/// Reverses each change independently; one failure never stops the rest.
///
/// Changes without previous content always need manual intervention. Without
/// a root nothing is touched and every other change is reported skipped.
pub fn revert_file_changes(
    fs: &dyn Filesystem,
    root: Option<&Path>,
    changes: &[FileChange],
) -> Vec<FileRevertOutcome> {
    changes
        .iter()
        .map(|change| FileRevertOutcome {
            path: change.path.clone(),
            action: change.action,
            result: match root {
                _ if !change.is_reversible() => manual_intervention(change),
                Some(root) => revert_one(fs, root, change),
                None => RevertResult::Skipped,
            },
        })
        .collect()
}

fn revert_one(fs: &dyn Filesystem, root: &Path, change: &FileChange) -> RevertResult {
    let Some(path) = join_within_root(root, &change.path) else {
        warn!("Refusing to revert {} outside the project root", change.path);
        return RevertResult::Failed {
            error: "path is absolute or escapes the project root".to_string(),
        };
    };

    let outcome = match (change.action, change.previous_content.as_deref()) {
        (FileAction::Created, _) => fs.remove_file(&path).map(|_| RevertResult::Deleted),
        (FileAction::Modified, Some(content)) => {
            fs.write_file(&path, content).map(|_| RevertResult::Restored)
        }
        (FileAction::Deleted, Some(content)) => {
            fs.write_file(&path, content).map(|_| RevertResult::Recreated)
        }
        (_, None) => return manual_intervention(change),
    };

    outcome.unwrap_or_else(|e| {
        warn!("Failed to revert {}: {e}", path.display());
        RevertResult::Failed {
            error: e.to_string(),
        }
    })
}

fn manual_intervention(change: &FileChange) -> RevertResult {
    warn!(
        "Cannot revert {} of {}: no previous content recorded",
        change.action.as_str(),
        change.path
    );
    RevertResult::ManualIntervention {
        reason: format!(
            "file was {} without previous content; restore it manually",
            change.action.as_str()
        ),
    }
}
