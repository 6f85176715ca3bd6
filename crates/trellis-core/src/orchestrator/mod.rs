//! High-level orchestrator API used by the CLI and the MCP server.
//!
//! The [`Orchestrator`] loads a plan from the database, applies one of the
//! pure transitions from [`crate::lifecycle`] and writes the result back with
//! a compare-and-swap on the plan version. SQLite work runs on the blocking
//! thread pool so callers can stay async.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Orchestrator  │    │    Lifecycle    │    │    Database     │
//! │ (plan_ops,      │───▶│ (execution,     │───▶│   (via db/)     │
//! │  step_ops, ...) │    │  rollback, ...) │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!   Async facade          Pure transitions       Persistence (CAS)
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Orchestrator`] instances
//! - [`plan_ops`]: Architecture definition, planning and inspection
//! - [`step_ops`]: Reporting, starting and retrying tasks
//! - [`checkpoint_ops`]: The checkpoint gate
//! - [`rollback_ops`]: Rolling back a task and its files
//! - [`resume_ops`]: Session resumption
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use trellis_core::{
//!     models::Component,
//!     params::{DefineArchitecture, PlanBuild},
//!     OrchestratorBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = OrchestratorBuilder::new()
//!     .with_database_path(Some("/tmp/trellis.db"))
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
//! println!("{created}");
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, sync::Arc};

use tokio::task;

use crate::{
    db::Database,
    error::{OrchestratorError, Result},
    fs::Filesystem,
    models::BuildPlan,
};

pub mod builder;
pub mod checkpoint_ops;
pub mod plan_ops;
pub mod resume_ops;
pub mod rollback_ops;
pub mod step_ops;

#[cfg(test)]
mod tests;

pub use builder::OrchestratorBuilder;
pub use checkpoint_ops::CheckpointOutcome;
pub use plan_ops::PlanCreated;

/// Main interface for planning and driving builds.
pub struct Orchestrator {
    pub(crate) db_path: PathBuf,
    pub(crate) fs: Arc<dyn Filesystem>,
}

impl Orchestrator {
    pub(crate) fn new(db_path: PathBuf, fs: Arc<dyn Filesystem>) -> Self {
        Self { db_path, fs }
    }

    /// Runs `f` against a fresh connection on the blocking thread pool.
    async fn with_database<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            f(&mut db)
        })
        .await
        .map_err(OrchestratorError::join_error)?
    }
}

/// The project's current plan, which may be completed.
fn load_current(db: &Database, project: &str) -> Result<BuildPlan> {
    db.get_current_plan(project)?
        .ok_or_else(|| OrchestratorError::NoActivePlan {
            project: project.to_string(),
        })
}

/// The project's current plan, if it still accepts work.
fn load_active(db: &Database, project: &str) -> Result<BuildPlan> {
    let plan = load_current(db, project)?;
    if plan.is_active() {
        Ok(plan)
    } else {
        Err(OrchestratorError::NoActivePlan {
            project: project.to_string(),
        })
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
