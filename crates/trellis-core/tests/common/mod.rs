use trellis_core::{
    models::Component, params::DefineArchitecture, Orchestrator, OrchestratorBuilder,
};
use tempfile::TempDir;

/// Helper function to create a test orchestrator
pub async fn create_test_orchestrator() -> (TempDir, Orchestrator) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let orchestrator = OrchestratorBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create orchestrator");
    (temp_dir, orchestrator)
}

/// Stores `components` as the architecture of `project`.
pub async fn define_architecture(
    orchestrator: &Orchestrator,
    project: &str,
    components: Vec<Component>,
) {
    orchestrator
        .define_architecture(&DefineArchitecture {
            project: project.to_string(),
            components,
        })
        .await
        .expect("Failed to define architecture");
}
