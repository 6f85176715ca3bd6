//! Data models for architectures and build plans.
//!
//! A [`BuildPlan`] embeds its [`Phase`]s, which embed their [`Task`]s, which
//! carry their [`FileChange`] ledger. The whole tree is persisted as one unit.
//! Display implementations live in [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use trellis_core::models::{Phase, PhaseStatus, Task, TaskStatus};
//!
//! let task = Task {
//!     id: "p1t1".to_string(),
//!     name: "db".to_string(),
//!     description: "Build the db component".to_string(),
//!     component: Some("db".to_string()),
//!     depends_on: vec![],
//!     expected_files: vec!["src/db/**".to_string()],
//!     status: TaskStatus::Completed,
//!     file_changes: vec![],
//!     started: None,
//!     completed: None,
//!     error: None,
//! };
//! let phase = Phase {
//!     id: 1,
//!     name: "Phase 1".to_string(),
//!     description: String::new(),
//!     tasks: vec![task],
//!     status: PhaseStatus::Pending,
//!     checkpoint: true,
//! };
//! assert_eq!(phase.derived_status(), PhaseStatus::Completed);
//! ```

pub mod architecture;
pub mod file_change;
pub mod phase;
pub mod plan;
pub mod status;
pub mod summary;
pub mod task;

#[cfg(test)]
mod tests;

pub use architecture::Component;
pub use file_change::{FileAction, FileChange};
pub use phase::Phase;
pub use plan::{BuildPlan, LedgerEntry};
pub use status::{PhaseStatus, PlanStatus, StepOutcome, TaskStatus};
pub use summary::{PlanSummary, Progress};
pub use task::Task;
