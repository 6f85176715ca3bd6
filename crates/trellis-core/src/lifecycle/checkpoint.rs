//! Checkpoint gate between phases.
//!
//! The gate is advisory: `approve` trusts the caller to have reviewed the
//! phase and does not re-check that it is complete.

use std::str::FromStr;

use log::info;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OrchestratorError, Result},
    models::{BuildPlan, LedgerEntry, PhaseStatus, PlanStatus, Progress},
};

/// Action requested at a checkpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum CheckpointAction {
    /// Read-only summary of the build
    #[default]
    Review,
    /// Advance to the next phase
    Approve,
    /// Pause the build
    Reject,
}

impl FromStr for CheckpointAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "review" => Ok(CheckpointAction::Review),
            "approve" => Ok(CheckpointAction::Approve),
            "reject" => Ok(CheckpointAction::Reject),
            _ => Err(format!("Invalid checkpoint action: {s}")),
        }
    }
}

/// Read-only view of a plan at its current phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointReview {
    pub plan_id: u64,
    pub project: String,
    pub plan_status: PlanStatus,
    /// 0-based current phase
    pub current_phase: usize,
    pub phase_name: String,
    pub phase_status: PhaseStatus,
    pub checkpoint: bool,
    pub progress: Progress,
    pub ledger: Vec<LedgerEntry>,
    pub guidance: Vec<String>,
}

/// Result of an approve or reject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointDecision {
    pub action: CheckpointAction,
    pub previous_phase: usize,
    pub current_phase: usize,
    /// Approve on the last phase leaves `current_phase` where it is
    pub capped: bool,
    pub plan_status: PlanStatus,
    pub reason: Option<String>,
}

impl BuildPlan {
    /// Summarizes progress, the file ledger and what to do next.
    pub fn review_checkpoint(&self) -> CheckpointReview {
        let (phase_name, phase_status, checkpoint) = self
            .phases
            .get(self.current_phase)
            .map(|phase| (phase.name.clone(), phase.derived_status(), phase.checkpoint))
            .unwrap_or_default();

        CheckpointReview {
            plan_id: self.id,
            project: self.project.clone(),
            plan_status: self.status,
            current_phase: self.current_phase,
            phase_name,
            phase_status,
            checkpoint,
            progress: self.progress(),
            ledger: self.file_ledger(),
            guidance: self.checkpoint_guidance(),
        }
    }

    /// Moves to the next phase, capped at the last one.
    pub fn approve_checkpoint(&mut self) -> CheckpointDecision {
        let previous_phase = self.current_phase;
        let capped = self.is_last_phase();
        if !capped {
            self.current_phase += 1;
        }
        if self.status != PlanStatus::Completed {
            self.status = PlanStatus::InProgress;
        }
        info!(
            "Checkpoint approved for plan {}: phase {} -> {}",
            self.id,
            previous_phase + 1,
            self.current_phase + 1
        );

        CheckpointDecision {
            action: CheckpointAction::Approve,
            previous_phase,
            current_phase: self.current_phase,
            capped,
            plan_status: self.status,
            reason: None,
        }
    }

    /// Pauses the plan. The reason is echoed back and not stored.
    pub fn reject_checkpoint(&mut self, reason: Option<String>) -> Result<CheckpointDecision> {
        if self.status == PlanStatus::Completed {
            return Err(OrchestratorError::invalid_input("action")
                .with_reason("the build is already completed and cannot be paused"));
        }
        self.status = PlanStatus::Paused;
        info!(
            "Checkpoint rejected for plan {} at phase {}",
            self.id,
            self.current_phase + 1
        );

        Ok(CheckpointDecision {
            action: CheckpointAction::Reject,
            previous_phase: self.current_phase,
            current_phase: self.current_phase,
            capped: false,
            plan_status: self.status,
            reason,
        })
    }

    fn checkpoint_guidance(&self) -> Vec<String> {
        let mut guidance = Vec::new();

        if self.status == PlanStatus::Completed {
            guidance.push("All phases are complete. The build is done.".to_string());
            return guidance;
        }

        for task in self.failed_tasks() {
            guidance.push(format!(
                "Task {} ({}) failed{}. Roll it back with rollback_step or retry it with retry_step.",
                task.id,
                task.name,
                task.error
                    .as_deref()
                    .map(|e| format!(": {e}"))
                    .unwrap_or_default()
            ));
        }

        if self.status == PlanStatus::Paused {
            guidance.push(
                "The build is paused. Resolve the rejection cause, then approve or resume_build."
                    .to_string(),
            );
        }

        let Some(phase) = self.phases.get(self.current_phase) else {
            return guidance;
        };
        let phase_number = self.current_phase + 1;

        if phase.derived_status().is_completed() {
            if self.is_last_phase() {
                guidance.push(format!(
                    "Phase {phase_number} is the final phase and is complete."
                ));
            } else if phase.checkpoint {
                guidance.push(format!(
                    "Phase {phase_number} is complete. Approve to continue with phase {}, or reject to pause the build.",
                    phase_number + 1
                ));
            }
        } else {
            let unfinished = phase
                .tasks
                .iter()
                .filter(|task| task.status != crate::models::TaskStatus::Completed)
                .count();
            guidance.push(format!(
                "Phase {phase_number} has {unfinished} unfinished task(s); finish them before approving."
            ));
        }

        if let Some(next) = self.next_actionable_task() {
            guidance.push(format!("Next actionable task: {} ({}).", next.id, next.name));
        }

        guidance
    }
}
