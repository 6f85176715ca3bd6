//! Tests for the orchestrator module.

use tempfile::TempDir;

use super::*;
use crate::{
    lifecycle::{CheckpointAction, NextStep, RevertResult},
    models::{Component, FileChange, PlanStatus, StepOutcome, TaskStatus},
    params::{
        DefineArchitecture, ExecuteStep, ListBuilds, PlanBuild, ProjectRef, ReviewCheckpoint,
        RollbackStep, TaskRef,
    },
};

/// Helper function to create a test orchestrator
async fn create_test_orchestrator() -> (TempDir, Orchestrator) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let orchestrator = OrchestratorBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create orchestrator");
    (temp_dir, orchestrator)
}

async fn define(orchestrator: &Orchestrator, project: &str, components: Vec<Component>) {
    orchestrator
        .define_architecture(&DefineArchitecture {
            project: project.to_string(),
            components,
        })
        .await
        .expect("Failed to define architecture");
}

async fn plan(orchestrator: &Orchestrator, project: &str) -> PlanCreated {
    orchestrator
        .plan_build(&PlanBuild {
            project: project.to_string(),
            description: "Test build".to_string(),
            ..PlanBuild::default()
        })
        .await
        .expect("Failed to plan build")
}

fn report(project: &str, task_id: &str, outcome: StepOutcome) -> ExecuteStep {
    ExecuteStep {
        project: project.to_string(),
        task_id: task_id.to_string(),
        outcome,
        file_changes: vec![],
        error: None,
        session_id: None,
    }
}

fn chain() -> Vec<Component> {
    vec![
        Component::new("db", &[]),
        Component::new("api", &["db"]),
        Component::new("ui", &["api"]),
    ]
}

#[tokio::test]
async fn test_plan_build_layers_stored_architecture() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;

    let created = plan(&orchestrator, "shop").await;

    assert_eq!(created.plan.phases.len(), 3);
    assert_eq!(created.plan.status, PlanStatus::Planning);
    assert_eq!(created.plan.version, 1);
    assert!(!created.plan.session_id.is_empty());
    assert!(created.forced.is_empty());
    assert_eq!(created.superseded, None);
    assert!(created.plan.phases.iter().all(|phase| phase.checkpoint));
}

#[tokio::test]
async fn test_plan_build_with_cycle_reports_forced_placement() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(
        &orchestrator,
        "loop",
        vec![Component::new("a", &["b"]), Component::new("b", &["a"])],
    )
    .await;

    let created = plan(&orchestrator, "loop").await;

    assert_eq!(created.forced, vec!["a"]);
    assert_eq!(created.plan.phases.len(), 2);
    assert!(created.plan.phases[0].tasks[0].depends_on.is_empty());
    assert_eq!(created.plan.phases[1].tasks[0].depends_on, vec!["p1t1"]);
}

#[tokio::test]
async fn test_plan_build_without_architecture_is_rejected() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;

    let err = orchestrator
        .plan_build(&PlanBuild {
            project: "empty".to_string(),
            ..PlanBuild::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::EmptyArchitecture { .. }));
    assert!(err.is_usage_error());
}

#[tokio::test]
async fn test_second_plan_requires_replace() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    let first = plan(&orchestrator, "shop").await;

    let err = orchestrator
        .plan_build(&PlanBuild {
            project: "shop".to_string(),
            ..PlanBuild::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::ActivePlanExists { plan_id, .. } if plan_id == first.plan.id
    ));

    let second = orchestrator
        .plan_build(&PlanBuild {
            project: "shop".to_string(),
            replace: true,
            ..PlanBuild::default()
        })
        .await
        .unwrap();
    assert_eq!(second.superseded, Some(first.plan.id));

    let current = orchestrator
        .show_build(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(current.id, second.plan.id);
}

#[tokio::test]
async fn test_full_build_with_checkpoints() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    plan(&orchestrator, "shop").await;

    for (index, task_id) in ["p1t1", "p2t1", "p3t1"].iter().enumerate() {
        let result = orchestrator
            .execute_step(&report("shop", task_id, StepOutcome::Completed))
            .await
            .unwrap();
        assert!(result.phase_completed);

        if index < 2 {
            assert!(result.awaiting_approval);
            let outcome = orchestrator
                .review_checkpoint(&ReviewCheckpoint {
                    project: "shop".to_string(),
                    action: CheckpointAction::Approve,
                    reason: None,
                    session_id: None,
                })
                .await
                .unwrap();
            assert!(matches!(
                outcome,
                CheckpointOutcome::Decision(ref d) if d.current_phase == index + 1
            ));
        } else {
            assert_eq!(result.plan_status, PlanStatus::Completed);
        }
    }

    let builds = orchestrator
        .list_builds(&ListBuilds {
            include_completed: false,
        })
        .await
        .unwrap();
    assert!(builds.is_empty());

    let builds = orchestrator
        .list_builds(&ListBuilds {
            include_completed: true,
        })
        .await
        .unwrap();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].completed_phases, 3);
}

#[tokio::test]
async fn test_execute_step_rejects_blocked_task_without_writing() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    let created = plan(&orchestrator, "shop").await;

    let err = orchestrator
        .execute_step(&report("shop", "p2t1", StepOutcome::Completed))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::DependenciesIncomplete { .. }));

    let stored = orchestrator
        .show_build(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(stored.version, created.plan.version);
    assert_eq!(stored.task("p2t1").unwrap().status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_review_is_read_only() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    plan(&orchestrator, "shop").await;

    let review = ReviewCheckpoint {
        project: "shop".to_string(),
        action: CheckpointAction::Review,
        reason: None,
        session_id: None,
    };
    let first = orchestrator.review_checkpoint(&review).await.unwrap();
    let second = orchestrator.review_checkpoint(&review).await.unwrap();
    assert_eq!(first, second);

    let stored = orchestrator
        .show_build(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn test_reject_then_resume() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    let created = plan(&orchestrator, "shop").await;

    orchestrator
        .review_checkpoint(&ReviewCheckpoint {
            project: "shop".to_string(),
            action: CheckpointAction::Reject,
            reason: Some("wrong schema".to_string()),
            session_id: None,
        })
        .await
        .unwrap();

    let resumed = orchestrator
        .resume_build(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(resumed.previous_status, PlanStatus::Paused);
    assert_eq!(resumed.plan_status, PlanStatus::InProgress);
    assert_eq!(resumed.previous_session_id, created.plan.session_id);
    assert_ne!(resumed.session_id, created.plan.session_id);
    assert!(matches!(
        resumed.next_step,
        NextStep::Task { ref task_id, .. } if task_id == "p1t1"
    ));

    let mut stale = report("shop", "p1t1", StepOutcome::Completed);
    stale.session_id = Some(created.plan.session_id.clone());
    assert!(matches!(
        orchestrator.execute_step(&stale).await,
        Err(OrchestratorError::SessionMismatch { .. })
    ));

    stale.session_id = Some(resumed.session_id.clone());
    assert!(orchestrator.execute_step(&stale).await.is_ok());
}

#[tokio::test]
async fn test_checkpoint_decisions_reject_stale_session() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    let created = plan(&orchestrator, "shop").await;
    orchestrator
        .execute_step(&report("shop", "p1t1", StepOutcome::Completed))
        .await
        .unwrap();

    let resumed = orchestrator
        .resume_build(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();
    let project = ProjectRef {
        project: "shop".to_string(),
    };
    let before = orchestrator.show_build(&project).await.unwrap();

    for action in [CheckpointAction::Approve, CheckpointAction::Reject] {
        let err = orchestrator
            .review_checkpoint(&ReviewCheckpoint {
                project: "shop".to_string(),
                action,
                reason: None,
                session_id: Some(created.plan.session_id.clone()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::SessionMismatch { .. }));
    }
    assert_eq!(orchestrator.show_build(&project).await.unwrap(), before);

    // Review stays read-only and accepts any session.
    orchestrator
        .review_checkpoint(&ReviewCheckpoint {
            project: "shop".to_string(),
            action: CheckpointAction::Review,
            reason: None,
            session_id: Some(created.plan.session_id.clone()),
        })
        .await
        .unwrap();

    let outcome = orchestrator
        .review_checkpoint(&ReviewCheckpoint {
            project: "shop".to_string(),
            action: CheckpointAction::Approve,
            reason: None,
            session_id: Some(resumed.session_id.clone()),
        })
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        CheckpointOutcome::Decision(ref d) if d.current_phase == 1
    ));
}

#[tokio::test]
async fn test_resume_without_plan_is_rejected() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    assert!(matches!(
        orchestrator
            .resume_build(&ProjectRef {
                project: "ghost".to_string(),
            })
            .await,
        Err(OrchestratorError::NoActivePlan { .. })
    ));
}

#[tokio::test]
async fn test_rollback_deletes_created_file() {
    let (temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    plan(&orchestrator, "shop").await;

    let root = temp_dir.path().join("code");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("x.ts"), "export {}").unwrap();

    let mut step = report("shop", "p1t1", StepOutcome::Completed);
    step.file_changes = vec![FileChange::created("x.ts")];
    orchestrator.execute_step(&step).await.unwrap();

    let report = orchestrator
        .rollback_step(&RollbackStep {
            project: "shop".to_string(),
            task_id: None,
            project_root_path: Some(root.to_string_lossy().into_owned()),
            session_id: None,
        })
        .await
        .unwrap();

    assert_eq!(report.effects.task_id, "p1t1");
    assert_eq!(report.files[0].result, RevertResult::Deleted);
    assert!(!root.join("x.ts").exists());

    let stored = orchestrator
        .show_build(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();
    let task = stored.task("p1t1").unwrap();
    assert_eq!(task.status, TaskStatus::RolledBack);
    assert!(task.file_changes.is_empty());
}

#[tokio::test]
async fn test_rollback_without_root_still_changes_status() {
    let (temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    plan(&orchestrator, "shop").await;

    let file = temp_dir.path().join("x.ts");
    std::fs::write(&file, "export {}").unwrap();
    let mut step = report("shop", "p1t1", StepOutcome::Completed);
    step.file_changes = vec![
        FileChange::created("x.ts"),
        FileChange::modified("package.json", None),
    ];
    orchestrator.execute_step(&step).await.unwrap();

    let report = orchestrator
        .rollback_step(&RollbackStep {
            project: "shop".to_string(),
            ..RollbackStep::default()
        })
        .await
        .unwrap();

    assert_eq!(report.files[0].result, RevertResult::Skipped);
    assert!(matches!(
        report.files[1].result,
        RevertResult::ManualIntervention { .. }
    ));
    assert_eq!(report.problems().count(), 1);
    assert!(!crate::display::OperationStatus::for_rollback(&report).success);
    assert!(file.exists());
    assert_eq!(report.plan_status, PlanStatus::InProgress);
}

#[tokio::test]
async fn test_rollback_with_nothing_eligible_is_rejected() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    let created = plan(&orchestrator, "shop").await;

    let err = orchestrator
        .rollback_step(&RollbackStep {
            project: "shop".to_string(),
            ..RollbackStep::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::NothingToRollback { .. }));

    let stored = orchestrator
        .show_build(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(stored, created.plan);
}

#[tokio::test]
async fn test_start_retry_cycle() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;
    plan(&orchestrator, "shop").await;

    let task_ref = TaskRef {
        project: "shop".to_string(),
        task_id: "p1t1".to_string(),
        session_id: None,
    };
    let started = orchestrator.start_step(&task_ref).await.unwrap();
    assert_eq!(started.resource.status, TaskStatus::InProgress);

    let mut failed = report("shop", "p1t1", StepOutcome::Failed);
    failed.error = Some("compile error".to_string());
    orchestrator.execute_step(&failed).await.unwrap();

    let retried = orchestrator.retry_step(&task_ref).await.unwrap();
    assert_eq!(retried.resource.status, TaskStatus::Pending);
    assert_eq!(retried.changes, vec!["Status: failed -> pending"]);
}

#[tokio::test]
async fn test_show_architecture_round_trip() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define(&orchestrator, "shop", chain()).await;

    let components = orchestrator
        .show_architecture(&ProjectRef {
            project: "shop".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(components.len(), 3);
    assert_eq!(components.0[2].dependencies, vec!["api"]);
}
