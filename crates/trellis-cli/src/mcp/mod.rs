//! MCP server implementation for Trellis
//!
//! Exposes the orchestrator as Model Context Protocol tools so an AI agent
//! can plan a build and report its progress one task at a time.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};
use trellis_core::Orchestrator;

pub mod errors;
pub mod handlers;

pub use handlers::{
    DefineArchitecture, ExecuteStep, ListBuilds, McpHandlers, McpResult, PlanBuild, ProjectRef,
    ReviewCheckpoint, RollbackStep, TaskRef,
};

/// MCP server for Trellis
#[derive(Clone)]
pub struct TrellisMcpServer {
    orchestrator: Arc<Orchestrator>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TrellisMcpServer {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> McpHandlers {
        McpHandlers::new(self.orchestrator.clone())
    }

    #[tool(
        name = "define_architecture",
        description = "Store a project's component architecture, replacing any previous one. Each component has a unique name, an optional type, optional file globs it owns, and the names of components it depends on. Run this before plan_build."
    )]
    async fn define_architecture(&self, params: Parameters<DefineArchitecture>) -> McpResult {
        self.handlers().define_architecture(params).await
    }

    #[tool(
        name = "show_architecture",
        description = "Show the components stored for a project in declaration order."
    )]
    async fn show_architecture(&self, params: Parameters<ProjectRef>) -> McpResult {
        self.handlers().show_architecture(params).await
    }

    #[tool(
        name = "plan_build",
        description = "Plan a phased build from the project's stored architecture. Components are layered so tasks only depend on earlier phases; dependency cycles are broken and reported. Checkpoints (default true) require review_checkpoint approval between phases. Fails if the project already has an active plan unless replace=true. Returns the plan and a session_id to pass to later calls."
    )]
    async fn plan_build(&self, params: Parameters<PlanBuild>) -> McpResult {
        self.handlers().plan_build(params).await
    }

    #[tool(
        name = "execute_step",
        description = "Report the outcome of a task: outcome 'completed' or 'failed', the files it touched, and an error for failures. Every dependency must be completed first.

        IMPORTANT: For 'modified' and 'deleted' files include 'previous_content', otherwise the change cannot be rolled back. Example:
        {
          \"project\": \"shop\",
          \"task_id\": \"p1t1\",
          \"outcome\": \"completed\",
          \"file_changes\": [
            {\"path\": \"src/db.ts\", \"action\": \"created\"},
            {\"path\": \"package.json\", \"action\": \"modified\", \"previous_content\": \"{...}\"}
          ],
          \"session_id\": \"...\"
        }"
    )]
    async fn execute_step(&self, params: Parameters<ExecuteStep>) -> McpResult {
        self.handlers().execute_step(params).await
    }

    #[tool(
        name = "start_step",
        description = "Mark a pending task as in progress before working on it. All of its dependencies must be completed."
    )]
    async fn start_step(&self, params: Parameters<TaskRef>) -> McpResult {
        self.handlers().start_step(params).await
    }

    #[tool(
        name = "retry_step",
        description = "Return a failed or rolled back task to pending so it can be attempted again. A failed task that recorded file changes must be rolled back first."
    )]
    async fn retry_step(&self, params: Parameters<TaskRef>) -> McpResult {
        self.handlers().retry_step(params).await
    }

    #[tool(
        name = "review_checkpoint",
        description = "Checkpoint gate for the current phase. action='review' (default) shows the phase, progress and file ledger without changing anything. action='approve' moves to the next phase. action='reject' pauses the build with an optional reason until resume_build is called. Approve and reject take the current session_id and are rejected if it is stale."
    )]
    async fn review_checkpoint(&self, params: Parameters<ReviewCheckpoint>) -> McpResult {
        self.handlers().review_checkpoint(params).await
    }

    #[tool(
        name = "rollback_step",
        description = "Roll back a completed or failed task (default: the most recent one). Its recorded file changes are reverted under project_root_path: created files are deleted, modified and deleted files get their previous content back. Without project_root_path no file is touched. In-progress dependents return to pending."
    )]
    async fn rollback_step(&self, params: Parameters<RollbackStep>) -> McpResult {
        self.handlers().rollback_step(params).await
    }

    #[tool(
        name = "resume_build",
        description = "Continue a project's active build in a new session. Returns the new session_id, progress, failed tasks and the next step. Calls with the previous session_id are rejected afterwards."
    )]
    async fn resume_build(&self, params: Parameters<ProjectRef>) -> McpResult {
        self.handlers().resume_build(params).await
    }

    #[tool(
        name = "show_build",
        description = "Show the project's current build plan with every phase, task status and recorded file change."
    )]
    async fn show_build(&self, params: Parameters<ProjectRef>) -> McpResult {
        self.handlers().show_build(params).await
    }

    #[tool(
        name = "list_builds",
        description = "List build plans across projects. Completed builds are hidden unless include_completed=true."
    )]
    async fn list_builds(&self, params: Parameters<ListBuilds>) -> McpResult {
        self.handlers().list_builds(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TrellisMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "trellis".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(r#"Trellis plans a project's build from its component architecture and keeps track of it while you implement it.

## Workflow
1. `define_architecture` with the project's components and their dependencies
2. `plan_build` to get phases of tasks and a session_id
3. For each task: `start_step`, do the work, then `execute_step` with every file you created, modified or deleted
4. When a phase is done, `review_checkpoint` with action='approve' to move on (or 'reject' to pause)
5. If a task went wrong, `rollback_step` with project_root_path to undo its files, then `retry_step`
6. In a new conversation, `resume_build` to get a fresh session_id and the next step

## Rules
- A task can only be reported once all of its dependencies are completed
- Pass the latest session_id; stale sessions are rejected
- Include previous_content for modified and deleted files or they cannot be reverted"#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: TrellisMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Trellis MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
