//! Error types for the orchestrator library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::TaskStatus;

/// Comprehensive error type for all orchestrator operations.
///
/// Variants from [`OrchestratorError::EmptyArchitecture`] onward are usage
/// errors: a precondition was violated and nothing was written.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// The project has no components to plan from
    #[error("Project '{project}' has no architecture components to plan from")]
    EmptyArchitecture { project: String },
    /// No active build plan exists for the project
    #[error("No active build plan for project '{project}'")]
    NoActivePlan { project: String },
    /// Build plan not found for the given ID
    #[error("Build plan with ID {id} not found")]
    PlanNotFound { id: u64 },
    /// A second active plan was requested without `replace`
    #[error(
        "Project '{project}' already has an active build plan (ID {plan_id}); pass replace to supersede it"
    )]
    ActivePlanExists { project: String, plan_id: u64 },
    /// Task not found in the plan
    #[error("Task '{task_id}' not found in the build plan")]
    TaskNotFound { task_id: String },
    /// Task status transition is not allowed
    #[error("Task '{task_id}' cannot move from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
    /// Task dependencies are not all completed
    #[error("Task '{task_id}' is blocked by incomplete dependencies: {}", .blocked_by.join(", "))]
    DependenciesIncomplete {
        task_id: String,
        blocked_by: Vec<String>,
    },
    /// No completed or failed task is available to roll back
    #[error("No completed or failed task to roll back in project '{project}'")]
    NothingToRollback { project: String },
    /// Caller's session is no longer attached to the plan
    #[error("Session '{given}' is not attached to this build plan (current session '{current}')")]
    SessionMismatch { given: String, current: String },
    /// The plan was written by someone else since it was read
    #[error("Build plan {plan_id} was modified concurrently (expected version {expected})")]
    VersionConflict { plan_id: u64, expected: u64 },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> OrchestratorError {
        OrchestratorError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> OrchestratorError {
        OrchestratorError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl OrchestratorError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Whether the error is a caller mistake rather than an infrastructure
    /// failure.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::EmptyArchitecture { .. }
                | Self::NoActivePlan { .. }
                | Self::PlanNotFound { .. }
                | Self::ActivePlanExists { .. }
                | Self::TaskNotFound { .. }
                | Self::InvalidTransition { .. }
                | Self::DependenciesIncomplete { .. }
                | Self::NothingToRollback { .. }
                | Self::SessionMismatch { .. }
        )
    }

    /// Whether the write lost a race with another writer. The request itself
    /// was valid; reloading the plan and retrying can succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    pub(crate) fn join_error(e: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {e}"),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| OrchestratorError::database(message).with_source(e))
    }
}

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;
