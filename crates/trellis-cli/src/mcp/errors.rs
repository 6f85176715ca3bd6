//! Error handling utilities for the MCP server

use rmcp::ErrorData;
use serde_json::json;
use trellis_core::OrchestratorError;

/// Converts an orchestrator error into an MCP error.
///
/// Errors the caller can fix (unknown task, blocked dependencies, stale
/// session) become `invalid_params`. A lost write race is an internal error
/// flagged `retryable` in its data, since the same request can succeed once
/// the plan is reloaded. Storage failures stay plain internal errors.
pub fn to_mcp_error(message: &str, error: &OrchestratorError) -> ErrorData {
    let message = format!("{message}: {error}");
    if error.is_usage_error() {
        ErrorData::invalid_params(message, None)
    } else if error.is_conflict() {
        ErrorData::internal_error(
            format!("{message}; retry the call"),
            Some(json!({ "retryable": true })),
        )
    } else {
        ErrorData::internal_error(message, None)
    }
}
