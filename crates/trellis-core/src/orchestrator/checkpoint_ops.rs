//! The checkpoint gate.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{load_current, Orchestrator};
use crate::{
    error::Result,
    lifecycle::{CheckpointAction, CheckpointDecision, CheckpointReview},
    params::ReviewCheckpoint,
};

/// Response of `review_checkpoint`: a review or a decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckpointOutcome {
    Review(CheckpointReview),
    Decision(CheckpointDecision),
}

impl Orchestrator {
    /// Reviews, approves or rejects at the current phase.
    ///
    /// `review` never writes and ignores the session. `approve` and `reject`
    /// check the session and are compare-and-swap writes like every other
    /// mutation.
    pub async fn review_checkpoint(&self, params: &ReviewCheckpoint) -> Result<CheckpointOutcome> {
        debug!(
            "review_checkpoint: project={}, action={:?}",
            params.project, params.action
        );
        let params = params.clone();

        self.with_database(move |db| {
            let mut plan = load_current(db, &params.project)?;
            match params.action {
                CheckpointAction::Review => Ok(CheckpointOutcome::Review(plan.review_checkpoint())),
                CheckpointAction::Approve => {
                    plan.check_session(params.session_id.as_deref())?;
                    let decision = plan.approve_checkpoint();
                    db.update_plan(&plan)?;
                    Ok(CheckpointOutcome::Decision(decision))
                }
                CheckpointAction::Reject => {
                    plan.check_session(params.session_id.as_deref())?;
                    let decision = plan.reject_checkpoint(params.reason)?;
                    db.update_plan(&plan)?;
                    Ok(CheckpointOutcome::Decision(decision))
                }
            }
        })
        .await
    }
}
