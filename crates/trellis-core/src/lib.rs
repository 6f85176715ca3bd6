//! Core library for the Trellis build plan orchestrator.
//!
//! Trellis turns a project's declared architecture (components and the
//! components they depend on) into a phased build plan, then keeps the books
//! while an external agent does the work: which tasks are done, which files
//! each task touched, where the checkpoints are, and how to undo a task.
//!
//! # Layers
//!
//! - [`layering`]: pure phase planner (batched Kahn layering with forced
//!   placement on cycles)
//! - [`lifecycle`]: pure state transitions on a [`models::BuildPlan`]
//! - [`db`]: SQLite persistence with compare-and-swap writes
//! - [`orchestrator`]: async facade combining the three, used by the CLI and
//!   the MCP server
//! - [`display`]: markdown rendering of every result
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trellis_core::{
//!     models::{Component, StepOutcome},
//!     params::{DefineArchitecture, ExecuteStep, PlanBuild},
//!     OrchestratorBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = OrchestratorBuilder::new()
//!     .with_database_path(Some("trellis.db"))
//!     .build()
//!     .await?;
//!
//! orchestrator
//!     .define_architecture(&DefineArchitecture {
//!         project: "shop".to_string(),
//!         components: vec![Component::new("db", &[]), Component::new("api", &["db"])],
//!     })
//!     .await?;
//!
//! let created = orchestrator
//!     .plan_build(&PlanBuild {
//!         project: "shop".to_string(),
//!         ..PlanBuild::default()
//!     })
//!     .await?;
//!
//! let result = orchestrator
//!     .execute_step(&ExecuteStep {
//!         project: "shop".to_string(),
//!         task_id: "p1t1".to_string(),
//!         outcome: StepOutcome::Completed,
//!         file_changes: vec![],
//!         error: None,
//!         session_id: Some(created.plan.session_id.clone()),
//!     })
//!     .await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod architecture;
pub mod db;
pub mod display;
pub mod error;
pub mod fs;
pub mod layering;
pub mod lifecycle;
pub mod models;
pub mod orchestrator;
pub mod params;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use architecture::ArchitectureProvider;
pub use db::Database;
pub use display::{Components, OperationStatus, PlanSummaries, UpdateResult};
pub use error::{OrchestratorError, Result};
pub use fs::{Filesystem, LocalFilesystem};
pub use lifecycle::{
    CheckpointAction, CheckpointDecision, CheckpointReview, ExecutionResult, NextStep,
    ResumeReport, RollbackReport,
};
pub use models::{
    BuildPlan, Component, FileAction, FileChange, Phase, PhaseStatus, PlanStatus, PlanSummary,
    StepOutcome, Task, TaskStatus,
};
pub use orchestrator::{CheckpointOutcome, Orchestrator, OrchestratorBuilder, PlanCreated};
