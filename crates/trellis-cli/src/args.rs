use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{ArchCommands, BuildCommands};

/// Build plan orchestrator for agent-driven development
///
/// Trellis turns a project's component architecture into a phased build plan
/// and tracks it while an agent implements it: task outcomes, the files each
/// task touched, checkpoint approvals and rollbacks. It runs either as a
/// command-line tool or as an MCP (Model Context Protocol) server.
#[derive(Parser)]
#[command(version, about, name = "trellis")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/trellis/trellis.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
///
/// - `arch`: Define or show a project's component architecture
/// - `build`: Plan a build and drive it task by task
/// - `serve`: Start the MCP server for AI assistant integration
#[derive(Subcommand)]
pub enum Commands {
    /// Manage project architectures
    #[command(alias = "a")]
    Arch {
        #[command(subcommand)]
        command: ArchCommands,
    },
    /// Plan and drive builds
    #[command(alias = "b")]
    Build {
        #[command(subcommand)]
        command: BuildCommands,
    },
    /// Start the MCP server
    Serve,
}
