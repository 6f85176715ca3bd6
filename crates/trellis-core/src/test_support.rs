//! Fixtures shared by unit tests.

use jiff::Timestamp;

use crate::{
    layering::layer_components,
    models::{BuildPlan, Component, PlanStatus, TaskStatus},
};

pub(crate) fn ts(second: i64) -> Timestamp {
    Timestamp::from_second(second).unwrap()
}

pub(crate) fn plan_with(components: &[Component], checkpoints: bool) -> BuildPlan {
    let layout = layer_components(components, checkpoints).unwrap();
    BuildPlan {
        id: 1,
        project: "demo".to_string(),
        description: "Demo build".to_string(),
        status: PlanStatus::Planning,
        current_phase: 0,
        phases: layout.phases,
        session_id: "session-1".to_string(),
        version: 1,
        created_at: ts(1_700_000_000),
        updated_at: ts(1_700_000_000),
    }
}

/// db <- api <- ui, one task per phase.
pub(crate) fn chain_plan() -> BuildPlan {
    plan_with(
        &[
            Component::new("db", &[]),
            Component::new("api", &["db"]),
            Component::new("ui", &["api"]),
        ],
        true,
    )
}

pub(crate) fn force_status(plan: &mut BuildPlan, task_id: &str, status: TaskStatus) {
    plan.task_mut(task_id).unwrap().status = status;
    plan.recompute_phase_statuses();
}
