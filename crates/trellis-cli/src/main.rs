//! Trellis CLI Application
//!
//! Command-line and MCP front end for the Trellis build plan orchestrator.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, TrellisMcpServer};
use renderer::TerminalRenderer;
use trellis_core::{params::ListBuilds, OrchestratorBuilder};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let orchestrator = OrchestratorBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize orchestrator")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Trellis started");

    match command {
        Some(Arch { command }) => {
            Cli::new(orchestrator, renderer)
                .handle_arch_command(command)
                .await
        }
        Some(Build { command }) => {
            Cli::new(orchestrator, renderer)
                .handle_build_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting Trellis MCP server");
            run_stdio_server(TrellisMcpServer::new(orchestrator))
                .await
                .context("MCP server failed")
        }
        None => {
            Cli::new(orchestrator, renderer)
                .list_builds(&ListBuilds {
                    include_completed: false,
                })
                .await
        }
    }
}
