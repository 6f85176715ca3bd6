//! Status enumerations for build plans, phases and tasks.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Type-safe enumeration of build plan statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Plan was produced but no task has reported yet
    #[default]
    Planning,

    /// Work is underway
    InProgress,

    /// Work is deferred, usually after a rejected checkpoint
    Paused,

    /// Every task is completed
    Completed,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(PlanStatus::Planning),
            "in_progress" | "inprogress" => Ok(PlanStatus::InProgress),
            "paused" => Ok(PlanStatus::Paused),
            "completed" => Ok(PlanStatus::Completed),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl PlanStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Planning => "planning",
            PlanStatus::InProgress => "in_progress",
            PlanStatus::Paused => "paused",
            PlanStatus::Completed => "completed",
        }
    }
}

/// Status of a phase, always derived from the statuses of its tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Failed => "failed",
        }
    }

    pub fn is_completed(self) -> bool {
        self == PhaseStatus::Completed
    }
}

/// Type-safe enumeration of task statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,

    /// Claimed by a working session
    InProgress,

    /// Reported done
    Completed,

    /// Reported failed
    Failed,

    /// Effects reversed by the rollback engine
    RolledBack,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "rolled_back" | "rolledback" => Ok(TaskStatus::RolledBack),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::RolledBack => "rolled_back",
        }
    }

    /// Whether a task in this status may move directly to `next`.
    ///
    /// ```text
    /// pending ──▶ in_progress ──▶ completed ──▶ rolled_back
    ///    │  ▲         │  │                        │
    ///    │  └─────────┘  └──▶ failed ──▶ rolled_back
    ///    └──▶ completed / failed      └──▶ pending ◀┘
    /// ```
    ///
    /// `in_progress -> pending` is the rollback cascade; `failed -> pending`
    /// and `rolled_back -> pending` are retries.
    ///
    /// ```rust
    /// use trellis_core::models::TaskStatus;
    ///
    /// assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
    /// assert!(!TaskStatus::RolledBack.can_transition_to(TaskStatus::InProgress));
    /// ```
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress | Completed | Failed)
                | (InProgress, Completed | Failed | Pending)
                | (Completed, RolledBack)
                | (Failed, RolledBack | Pending)
                | (RolledBack, Pending)
        )
    }

    /// Whether the task may be targeted by the rollback engine.
    pub fn is_reversible(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// ```rust
    /// use trellis_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TaskStatus::RolledBack.with_icon(), "↺ Rolled Back");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "✓ Completed",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::Pending => "○ Pending",
            TaskStatus::Failed => "✗ Failed",
            TaskStatus::RolledBack => "↺ Rolled Back",
        }
    }
}

/// Outcome an external agent reports for a task it worked on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Completed,
    Failed,
}

impl From<StepOutcome> for TaskStatus {
    fn from(outcome: StepOutcome) -> Self {
        match outcome {
            StepOutcome::Completed => TaskStatus::Completed,
            StepOutcome::Failed => TaskStatus::Failed,
        }
    }
}

impl FromStr for StepOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(StepOutcome::Completed),
            "failed" => Ok(StepOutcome::Failed),
            _ => Err(format!("Invalid step outcome: {s} (expected completed or failed)")),
        }
    }
}
