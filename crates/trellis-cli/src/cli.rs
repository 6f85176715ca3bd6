//! Command-line interface definitions and handlers
//!
//! Each subcommand has a clap `Args` struct that converts into the matching
//! core parameter type, so clap attributes never leak into trellis-core:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Orchestrator
//! ```
//!
//! [`Cli`] runs the converted parameters against the orchestrator and prints
//! the markdown `Display` output through the [`TerminalRenderer`].

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use trellis_core::{
    models::{Component, FileChange, StepOutcome},
    params::*,
    CheckpointAction, OperationStatus, Orchestrator,
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Architecture commands
// ============================================================================

/// Replace a project's architecture with the components in a JSON file
///
/// The file holds an array of components, each with a `name` and optional
/// `type`, `files` and `dependencies`. Use `-` to read from stdin.
#[derive(Args)]
pub struct DefineArchitectureArgs {
    /// Name of the project
    pub project: String,
    /// JSON file with the component list, or `-` for stdin
    pub file: PathBuf,
}

impl DefineArchitectureArgs {
    fn into_params(self) -> Result<DefineArchitecture> {
        let json = read_input(&self.file)?;
        let components: Vec<Component> = serde_json::from_str(&json)
            .with_context(|| format!("Invalid component list in {}", self.file.display()))?;
        Ok(DefineArchitecture {
            project: self.project,
            components,
        })
    }
}

/// Show a project's stored architecture
#[derive(Args)]
pub struct ProjectArgs {
    /// Name of the project
    pub project: String,
}

impl From<ProjectArgs> for ProjectRef {
    fn from(val: ProjectArgs) -> Self {
        ProjectRef {
            project: val.project,
        }
    }
}

#[derive(Subcommand)]
pub enum ArchCommands {
    /// Replace a project's architecture from a JSON file
    #[command(alias = "d")]
    Define(DefineArchitectureArgs),
    /// Show a project's architecture
    #[command(alias = "s")]
    Show(ProjectArgs),
}

// ============================================================================
// Build commands
// ============================================================================

/// Plan a build from the project's stored architecture
///
/// Components are layered into phases so every task only depends on tasks in
/// earlier phases. Dependency cycles are broken by forcing a component into
/// the next phase; the output lists which components were forced.
#[derive(Args)]
pub struct PlanBuildArgs {
    /// Name of the project
    pub project: String,
    #[arg(short, long, default_value = "", help = "What the build should achieve")]
    pub description: String,
    #[arg(
        long,
        help = "Do not require checkpoint approval between phases"
    )]
    pub no_checkpoints: bool,
    #[arg(long, help = "Supersede the project's active plan instead of failing")]
    pub replace: bool,
}

impl From<PlanBuildArgs> for PlanBuild {
    fn from(val: PlanBuildArgs) -> Self {
        PlanBuild {
            project: val.project,
            description: val.description,
            checkpoints: !val.no_checkpoints,
            replace: val.replace,
        }
    }
}

/// Report the outcome of a task
///
/// Created files can be listed with `--created`. Modified and deleted files
/// need their previous content to be reversible, so report them through a
/// JSON file passed with `--changes-file`.
#[derive(Args)]
pub struct ExecuteStepArgs {
    /// Name of the project
    pub project: String,
    /// Task identifier such as p1t2
    pub task_id: String,
    #[arg(short, long, value_enum, default_value_t = OutcomeArg::Completed)]
    pub outcome: OutcomeArg,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Files the task created, as a comma-separated list"
    )]
    pub created: Vec<String>,
    #[arg(long, help = "JSON file with an array of file changes")]
    pub changes_file: Option<PathBuf>,
    #[arg(short, long, help = "What went wrong, for failed tasks")]
    pub error: Option<String>,
    #[arg(long, help = "Session id returned by plan or resume")]
    pub session_id: Option<String>,
}

impl ExecuteStepArgs {
    fn into_params(self) -> Result<ExecuteStep> {
        let mut file_changes = match &self.changes_file {
            Some(path) => {
                let json = read_input(path)?;
                serde_json::from_str::<Vec<FileChange>>(&json)
                    .with_context(|| format!("Invalid file changes in {}", path.display()))?
            }
            None => Vec::new(),
        };
        file_changes.extend(self.created.into_iter().map(FileChange::created));

        Ok(ExecuteStep {
            project: self.project,
            task_id: self.task_id,
            outcome: self.outcome.into(),
            file_changes,
            error: self.error,
            session_id: self.session_id,
        })
    }
}

/// Start or retry a single task
#[derive(Args)]
pub struct TaskArgs {
    /// Name of the project
    pub project: String,
    /// Task identifier such as p1t2
    pub task_id: String,
    #[arg(long, help = "Session id returned by plan or resume")]
    pub session_id: Option<String>,
}

impl From<TaskArgs> for TaskRef {
    fn from(val: TaskArgs) -> Self {
        TaskRef {
            project: val.project,
            task_id: val.task_id,
            session_id: val.session_id,
        }
    }
}

/// Review, approve or reject the current phase
///
/// `review` only reads. `approve` moves to the next phase (capped at the
/// last one). `reject` pauses the build until it is resumed.
#[derive(Args)]
pub struct ReviewArgs {
    /// Name of the project
    pub project: String,
    #[arg(short, long, value_enum, default_value_t = ActionArg::Review)]
    pub action: ActionArg,
    #[arg(short, long, help = "Why the phase was rejected")]
    pub reason: Option<String>,
    #[arg(long, help = "Session id returned by plan or resume")]
    pub session_id: Option<String>,
}

impl From<ReviewArgs> for ReviewCheckpoint {
    fn from(val: ReviewArgs) -> Self {
        ReviewCheckpoint {
            project: val.project,
            action: val.action.into(),
            reason: val.reason,
            session_id: val.session_id,
        }
    }
}

/// Roll back a completed or failed task
///
/// Without `--task-id` the last completed or failed task is rolled back.
/// Without `--root` the task status changes but no file is touched.
#[derive(Args)]
pub struct RollbackArgs {
    /// Name of the project
    pub project: String,
    #[arg(short, long, help = "Task to roll back")]
    pub task_id: Option<String>,
    #[arg(long, help = "Code root the recorded file paths are relative to")]
    pub root: Option<String>,
    #[arg(long, help = "Session id returned by plan or resume")]
    pub session_id: Option<String>,
}

impl From<RollbackArgs> for RollbackStep {
    fn from(val: RollbackArgs) -> Self {
        RollbackStep {
            project: val.project,
            task_id: val.task_id,
            project_root_path: val.root,
            session_id: val.session_id,
        }
    }
}

/// List build plans
#[derive(Args)]
pub struct ListBuildsArgs {
    #[arg(short, long, help = "Include completed builds")]
    pub all: bool,
}

impl From<ListBuildsArgs> for ListBuilds {
    fn from(val: ListBuildsArgs) -> Self {
        ListBuilds {
            include_completed: val.all,
        }
    }
}

#[derive(Subcommand)]
pub enum BuildCommands {
    /// Plan a build from the stored architecture
    #[command(alias = "p")]
    Plan(PlanBuildArgs),
    /// Report the outcome of a task
    #[command(alias = "x")]
    Execute(ExecuteStepArgs),
    /// Mark a pending task as in progress
    Start(TaskArgs),
    /// Return a failed or rolled back task to pending
    Retry(TaskArgs),
    /// Review, approve or reject the current checkpoint
    #[command(alias = "r")]
    Review(ReviewArgs),
    /// Roll back a task and revert its files
    Rollback(RollbackArgs),
    /// Attach a new session to the active build
    Resume(ProjectArgs),
    /// Show the project's current build plan
    #[command(alias = "s")]
    Show(ProjectArgs),
    /// List build plans
    #[command(aliases = ["l", "ls"])]
    List(ListBuildsArgs),
}

/// Task outcome accepted by `build execute`
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutcomeArg {
    Completed,
    Failed,
}

impl From<OutcomeArg> for StepOutcome {
    fn from(val: OutcomeArg) -> Self {
        match val {
            OutcomeArg::Completed => StepOutcome::Completed,
            OutcomeArg::Failed => StepOutcome::Failed,
        }
    }
}

/// Checkpoint action accepted by `build review`
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Review,
    Approve,
    Reject,
}

impl From<ActionArg> for CheckpointAction {
    fn from(val: ActionArg) -> Self {
        match val {
            ActionArg::Review => CheckpointAction::Review,
            ActionArg::Approve => CheckpointAction::Approve,
            ActionArg::Reject => CheckpointAction::Reject,
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs parsed commands against the orchestrator and renders the results.
pub struct Cli {
    orchestrator: Orchestrator,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(orchestrator: Orchestrator, renderer: TerminalRenderer) -> Self {
        Self {
            orchestrator,
            renderer,
        }
    }

    pub async fn handle_arch_command(&self, command: ArchCommands) -> Result<()> {
        match command {
            ArchCommands::Define(args) => {
                let params = args.into_params()?;
                let components = self
                    .orchestrator
                    .define_architecture(&params)
                    .await
                    .context("Failed to define architecture")?;
                let status = OperationStatus::success(format!(
                    "Stored {} component(s) for {}",
                    components.len(),
                    params.project
                ));
                self.renderer.render(&format!("{status}\n{components}"))
            }
            ArchCommands::Show(args) => {
                let components = self
                    .orchestrator
                    .show_architecture(&args.into())
                    .await
                    .context("Failed to show architecture")?;
                self.renderer.render(&components.to_string())
            }
        }
    }

    pub async fn handle_build_command(&self, command: BuildCommands) -> Result<()> {
        use BuildCommands::*;

        let output = match command {
            Plan(args) => self
                .orchestrator
                .plan_build(&args.into())
                .await
                .context("Failed to plan build")?
                .to_string(),
            Execute(args) => self
                .orchestrator
                .execute_step(&args.into_params()?)
                .await
                .context("Failed to record step")?
                .to_string(),
            Start(args) => self
                .orchestrator
                .start_step(&args.into())
                .await
                .context("Failed to start task")?
                .to_string(),
            Retry(args) => self
                .orchestrator
                .retry_step(&args.into())
                .await
                .context("Failed to retry task")?
                .to_string(),
            Review(args) => self
                .orchestrator
                .review_checkpoint(&args.into())
                .await
                .context("Checkpoint action failed")?
                .to_string(),
            Rollback(args) => {
                let report = self
                    .orchestrator
                    .rollback_step(&args.into())
                    .await
                    .context("Failed to roll back task")?;
                format!("{}\n{report}", OperationStatus::for_rollback(&report))
            }
            Resume(args) => self
                .orchestrator
                .resume_build(&args.into())
                .await
                .context("Failed to resume build")?
                .to_string(),
            Show(args) => self
                .orchestrator
                .show_build(&args.into())
                .await
                .context("Failed to show build")?
                .to_string(),
            List(args) => return self.list_builds(&args.into()).await,
        };

        self.renderer.render(&output)
    }

    pub async fn list_builds(&self, params: &ListBuilds) -> Result<()> {
        let summaries = self
            .orchestrator
            .list_builds(params)
            .await
            .context("Failed to list builds")?;
        self.renderer.render(&summaries.to_string())
    }
}
