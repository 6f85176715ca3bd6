//! Session resumption.

use log::{debug, info};

use super::{load_active, new_session_id, Orchestrator};
use crate::{error::Result, lifecycle::ResumeReport, params::ProjectRef};

impl Orchestrator {
    /// Attaches a new session to the project's active plan and reports where
    /// the build stands.
    ///
    /// Callers still holding the previous session id are rejected from then
    /// on.
    pub async fn resume_build(&self, params: &ProjectRef) -> Result<ResumeReport> {
        debug!("resume_build: project={}", params.project);
        let project = params.project.clone();

        self.with_database(move |db| {
            let mut plan = load_active(db, &project)?;
            let previous_session = plan.session_id.clone();
            let previous_status = plan.attach_session(new_session_id())?;
            let plan = db.update_plan(&plan)?;

            info!(
                "Resumed build {} for project {project} with session {}",
                plan.id, plan.session_id
            );
            Ok(plan.resume_report(previous_session, previous_status))
        })
        .await
    }
}
