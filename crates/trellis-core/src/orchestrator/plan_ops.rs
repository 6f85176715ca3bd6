//! Architecture definition, build planning and inspection.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{load_current, new_session_id, Orchestrator};
use crate::{
    architecture::{validate_components, ArchitectureProvider},
    display::{Components, PlanSummaries},
    error::{OrchestratorError, Result},
    layering::{layer_components, DroppedDependency},
    models::{BuildPlan, PlanSummary},
    params::{DefineArchitecture, ListBuilds, PlanBuild, ProjectRef},
};

/// A newly planned build with the planner's diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanCreated {
    pub plan: BuildPlan,
    /// Components placed early to break dependency cycles
    pub forced: Vec<String>,
    pub dropped: Vec<DroppedDependency>,
    /// Active plan this one replaced
    pub superseded: Option<u64>,
}

impl Orchestrator {
    /// Replaces the architecture of a project.
    pub async fn define_architecture(&self, params: &DefineArchitecture) -> Result<Components> {
        debug!(
            "define_architecture: project={}, components={}",
            params.project,
            params.components.len()
        );
        validate_components(&params.components)?;

        let project = params.project.clone();
        let components = params.components.clone();
        self.with_database(move |db| {
            db.replace_components(&project, &components)?;
            info!(
                "Stored {} component(s) for project {project}",
                components.len()
            );
            Ok(Components(components))
        })
        .await
    }

    /// Lists the stored architecture of a project.
    pub async fn show_architecture(&self, params: &ProjectRef) -> Result<Components> {
        debug!("show_architecture: project={}", params.project);
        let project = params.project.clone();
        self.with_database(move |db| Ok(Components(db.components(&project)?)))
            .await
    }

    /// Layers the stored architecture into phases and stores the plan.
    ///
    /// # Errors
    ///
    /// * `OrchestratorError::EmptyArchitecture` - The project has no components
    /// * `OrchestratorError::ActivePlanExists` - An active plan exists and
    ///   `replace` is false
    pub async fn plan_build(&self, params: &PlanBuild) -> Result<PlanCreated> {
        debug!(
            "plan_build: project={}, checkpoints={}, replace={}",
            params.project, params.checkpoints, params.replace
        );
        let params = params.clone();

        self.with_database(move |db| {
            let components = db.components(&params.project)?;
            if components.is_empty() {
                return Err(OrchestratorError::EmptyArchitecture {
                    project: params.project,
                });
            }

            let superseded = match db.get_current_plan(&params.project)? {
                Some(existing) if existing.is_active() && !params.replace => {
                    return Err(OrchestratorError::ActivePlanExists {
                        project: params.project,
                        plan_id: existing.id,
                    });
                }
                Some(existing) if existing.is_active() => Some(existing.id),
                _ => None,
            };

            let layout = layer_components(&components, params.checkpoints)?;
            let plan = db.insert_plan(
                &params.project,
                &params.description,
                &layout.phases,
                &new_session_id(),
                superseded,
            )?;

            info!(
                "Planned build {} for project {} ({} phases)",
                plan.id,
                plan.project,
                plan.phases.len()
            );
            if let Some(old) = superseded {
                info!("Build plan {old} superseded by {}", plan.id);
            }

            Ok(PlanCreated {
                plan,
                forced: layout.forced,
                dropped: layout.dropped,
                superseded,
            })
        })
        .await
    }

    /// The project's current plan with every phase and task.
    pub async fn show_build(&self, params: &ProjectRef) -> Result<BuildPlan> {
        debug!("show_build: project={}", params.project);
        let project = params.project.clone();
        self.with_database(move |db| load_current(db, &project))
            .await
    }

    /// Summaries of the current plan of every project.
    pub async fn list_builds(&self, params: &ListBuilds) -> Result<PlanSummaries> {
        debug!("list_builds: include_completed={}", params.include_completed);
        let include_completed = params.include_completed;
        self.with_database(move |db| {
            let plans = db.list_plans(include_completed)?;
            Ok(PlanSummaries(
                plans.iter().map(PlanSummary::from).collect(),
            ))
        })
        .await
    }
}
