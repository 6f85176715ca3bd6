//! Rolling back a task.

use log::{debug, warn};

use super::{load_current, Orchestrator};
use crate::{
    error::Result,
    fs::resolve_project_root,
    lifecycle::{revert_file_changes, RollbackReport},
    params::RollbackStep,
};

impl Orchestrator {
    /// Rolls back one task and reverts its recorded file changes.
    ///
    /// The status change is stored first and always applies; file reversal
    /// is attempted afterwards and reported per file. Without
    /// `project_root_path` no file is touched.
    pub async fn rollback_step(&self, params: &RollbackStep) -> Result<RollbackReport> {
        debug!(
            "rollback_step: project={}, task_id={:?}, project_root_path={:?}",
            params.project, params.task_id, params.project_root_path
        );
        let root = params
            .project_root_path
            .as_deref()
            .map(resolve_project_root)
            .transpose()?;
        let params = params.clone();
        let fs = self.fs.clone();

        self.with_database(move |db| {
            let mut plan = load_current(db, &params.project)?;
            plan.check_session(params.session_id.as_deref())?;

            let target = plan.rollback_target(params.task_id.as_deref())?;
            let effects = plan.rollback_task(&target)?;
            let plan = db.update_plan(&plan)?;

            let files = revert_file_changes(fs.as_ref(), root.as_deref(), &effects.file_changes);
            let report = RollbackReport {
                plan_id: plan.id,
                effects,
                files,
                plan_status: plan.status,
            };

            for outcome in report.problems() {
                warn!(
                    "Rollback of {} left {} unreverted: {:?}",
                    report.effects.task_id, outcome.path, outcome.result
                );
            }
            Ok(report)
        })
        .await
    }
}
