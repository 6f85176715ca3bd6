//! MCP tool handlers implementation

use std::sync::Arc;

use log::debug;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;
use trellis_core::{display::OperationStatus, params as core, Orchestrator};

use super::errors::to_mcp_error;

/// Transparent MCP wrapper around a core parameter type.
///
/// Deserialization and the JSON schema pass straight through to the core
/// type, which only derives `JsonSchema` behind the `schema` feature.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type ProjectRef = McpParams<core::ProjectRef>;
pub type DefineArchitecture = McpParams<core::DefineArchitecture>;
pub type PlanBuild = McpParams<core::PlanBuild>;
pub type ExecuteStep = McpParams<core::ExecuteStep>;
pub type TaskRef = McpParams<core::TaskRef>;
pub type ReviewCheckpoint = McpParams<core::ReviewCheckpoint>;
pub type RollbackStep = McpParams<core::RollbackStep>;
pub type ListBuilds = McpParams<core::ListBuilds>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    orchestrator: Arc<Orchestrator>,
}

impl McpHandlers {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn define_architecture(
        &self,
        Parameters(params): Parameters<DefineArchitecture>,
    ) -> McpResult {
        debug!("define_architecture: {:?}", params);

        let inner = params.as_ref();
        let components = self
            .orchestrator
            .define_architecture(inner)
            .await
            .map_err(|e| to_mcp_error("Failed to define architecture", &e))?;

        let status = OperationStatus::success(format!(
            "Stored {} component(s) for {}. Use 'plan_build' to plan the build.",
            components.len(),
            inner.project
        ));
        text(format!("{status}\n{components}"))
    }

    pub async fn show_architecture(
        &self,
        Parameters(params): Parameters<ProjectRef>,
    ) -> McpResult {
        debug!("show_architecture: {:?}", params);

        let components = self
            .orchestrator
            .show_architecture(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to show architecture", &e))?;
        text(components)
    }

    pub async fn plan_build(&self, Parameters(params): Parameters<PlanBuild>) -> McpResult {
        debug!("plan_build: {:?}", params);

        let created = self
            .orchestrator
            .plan_build(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to plan build", &e))?;
        text(created)
    }

    pub async fn execute_step(&self, Parameters(params): Parameters<ExecuteStep>) -> McpResult {
        debug!("execute_step: {:?}", params);

        let result = self
            .orchestrator
            .execute_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to record step", &e))?;
        text(result)
    }

    pub async fn start_step(&self, Parameters(params): Parameters<TaskRef>) -> McpResult {
        debug!("start_step: {:?}", params);

        let updated = self
            .orchestrator
            .start_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to start task", &e))?;
        text(updated)
    }

    pub async fn retry_step(&self, Parameters(params): Parameters<TaskRef>) -> McpResult {
        debug!("retry_step: {:?}", params);

        let updated = self
            .orchestrator
            .retry_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to retry task", &e))?;
        text(updated)
    }

    pub async fn review_checkpoint(
        &self,
        Parameters(params): Parameters<ReviewCheckpoint>,
    ) -> McpResult {
        debug!("review_checkpoint: {:?}", params);

        let outcome = self
            .orchestrator
            .review_checkpoint(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Checkpoint action failed", &e))?;
        text(outcome)
    }

    pub async fn rollback_step(&self, Parameters(params): Parameters<RollbackStep>) -> McpResult {
        debug!("rollback_step: {:?}", params);

        let report = self
            .orchestrator
            .rollback_step(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to roll back task", &e))?;
        text(format!("{}\n{report}", OperationStatus::for_rollback(&report)))
    }

    pub async fn resume_build(&self, Parameters(params): Parameters<ProjectRef>) -> McpResult {
        debug!("resume_build: {:?}", params);

        let report = self
            .orchestrator
            .resume_build(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to resume build", &e))?;
        text(report)
    }

    pub async fn show_build(&self, Parameters(params): Parameters<ProjectRef>) -> McpResult {
        debug!("show_build: {:?}", params);

        let plan = self
            .orchestrator
            .show_build(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to show build", &e))?;
        text(plan)
    }

    pub async fn list_builds(&self, Parameters(params): Parameters<ListBuilds>) -> McpResult {
        debug!("list_builds: {:?}", params);

        let inner = params.as_ref();
        let summaries = self
            .orchestrator
            .list_builds(inner)
            .await
            .map_err(|e| to_mcp_error("Failed to list builds", &e))?;

        let title = if inner.include_completed {
            "All Builds"
        } else {
            "Active Builds"
        };
        text(format!("# {title}\n\n{summaries}"))
    }
}
