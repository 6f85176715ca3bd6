mod common;

use std::collections::HashSet;

use common::{create_test_orchestrator, define_architecture};
use trellis_core::{
    layering::layer_components,
    lifecycle::RevertResult,
    models::{Component, FileChange, PlanStatus, StepOutcome, TaskStatus},
    params::{ExecuteStep, PlanBuild, ProjectRef, ReviewCheckpoint, RollbackStep, TaskRef},
    CheckpointAction, CheckpointOutcome, Database, OrchestratorError,
};

fn step(project: &str, task_id: &str, outcome: StepOutcome) -> ExecuteStep {
    ExecuteStep {
        project: project.to_string(),
        task_id: task_id.to_string(),
        outcome,
        file_changes: vec![],
        error: None,
        session_id: None,
    }
}

fn project(name: &str) -> ProjectRef {
    ProjectRef {
        project: name.to_string(),
    }
}

#[tokio::test]
async fn test_linear_chain_plans_three_phases() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define_architecture(
        &orchestrator,
        "chain",
        vec![
            Component::new("A", &[]),
            Component::new("B", &["A"]),
            Component::new("C", &["B"]),
        ],
    )
    .await;

    let created = orchestrator
        .plan_build(&PlanBuild {
            project: "chain".to_string(),
            ..PlanBuild::default()
        })
        .await
        .expect("Failed to plan build");

    let phases = &created.plan.phases;
    assert_eq!(phases.len(), 3);
    assert_eq!(phases[0].tasks[0].id, "p1t1");
    assert_eq!(phases[0].tasks[0].name, "A");
    assert_eq!(phases[1].tasks[0].depends_on, vec!["p1t1"]);
    assert_eq!(phases[2].tasks[0].depends_on, vec!["p2t1"]);
}

#[tokio::test]
async fn test_cycle_is_broken_by_forced_placement() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define_architecture(
        &orchestrator,
        "cycle",
        vec![Component::new("A", &["B"]), Component::new("B", &["A"])],
    )
    .await;

    let created = orchestrator
        .plan_build(&PlanBuild {
            project: "cycle".to_string(),
            ..PlanBuild::default()
        })
        .await
        .expect("Failed to plan build");

    assert_eq!(created.forced, vec!["A"]);
    let phases = &created.plan.phases;
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[0].tasks[0].name, "A");
    assert!(phases[0].tasks[0].depends_on.is_empty());
    assert_eq!(phases[1].tasks[0].name, "B");
    assert_eq!(phases[1].tasks[0].depends_on, vec!["p1t1"]);
}

#[test]
fn test_every_component_is_placed_once_and_depends_only_backwards() {
    let architectures = vec![
        vec![
            Component::new("a", &["b", "c"]),
            Component::new("b", &["c"]),
            Component::new("c", &["a"]),
            Component::new("d", &[]),
            Component::new("e", &["d", "missing", "e"]),
        ],
        vec![
            Component::new("x", &["y"]),
            Component::new("y", &["z"]),
            Component::new("z", &["x"]),
            Component::new("w", &["x", "y", "z"]),
        ],
        vec![Component::new("solo", &["solo"])],
    ];

    for components in architectures {
        let layout = layer_components(&components, true).expect("Failed to layer");

        let mut placed = HashSet::new();
        for (phase_index, phase) in layout.phases.iter().enumerate() {
            for task in &phase.tasks {
                assert!(placed.insert(task.name.clone()), "{} placed twice", task.name);
                for dep in &task.depends_on {
                    let dep_phase = layout
                        .phases
                        .iter()
                        .position(|p| p.tasks.iter().any(|t| &t.id == dep))
                        .expect("dependency must exist");
                    assert!(dep_phase < phase_index, "{} -> {dep} is not backwards", task.id);
                }
            }
        }
        assert_eq!(placed.len(), components.len());
    }
}

#[tokio::test]
async fn test_rollback_deletes_created_file_from_disk() {
    let (temp_dir, orchestrator) = create_test_orchestrator().await;
    define_architecture(&orchestrator, "web", vec![Component::new("A", &[])]).await;
    orchestrator
        .plan_build(&PlanBuild {
            project: "web".to_string(),
            ..PlanBuild::default()
        })
        .await
        .expect("Failed to plan build");

    let root = temp_dir.path().join("src-root");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("x.ts"), "export const x = 1;").unwrap();

    let mut report = step("web", "p1t1", StepOutcome::Completed);
    report.file_changes = vec![FileChange::created("x.ts")];
    let result = orchestrator.execute_step(&report).await.unwrap();
    assert_eq!(result.plan_status, PlanStatus::Completed);

    let rollback = orchestrator
        .rollback_step(&RollbackStep {
            project: "web".to_string(),
            project_root_path: Some(root.display().to_string()),
            ..RollbackStep::default()
        })
        .await
        .unwrap();

    assert_eq!(rollback.files.len(), 1);
    assert_eq!(rollback.files[0].result, RevertResult::Deleted);
    assert!(rollback.effects.plan_reopened);
    assert!(!root.join("x.ts").exists());

    let plan = orchestrator.show_build(&project("web")).await.unwrap();
    assert_eq!(plan.task("p1t1").unwrap().status, TaskStatus::RolledBack);
    assert_eq!(plan.status, PlanStatus::InProgress);
}

#[tokio::test]
async fn test_blocked_step_is_rejected_and_nothing_changes() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define_architecture(
        &orchestrator,
        "shop",
        vec![Component::new("A", &[]), Component::new("B", &["A"])],
    )
    .await;
    let created = orchestrator
        .plan_build(&PlanBuild {
            project: "shop".to_string(),
            ..PlanBuild::default()
        })
        .await
        .unwrap();

    let err = orchestrator
        .execute_step(&step("shop", "p2t1", StepOutcome::Completed))
        .await
        .unwrap_err();
    assert!(err.is_usage_error());

    let plan = orchestrator.show_build(&project("shop")).await.unwrap();
    assert_eq!(plan, created.plan);
    assert_eq!(plan.task("p2t1").unwrap().status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_rollback_cascade_resets_only_in_flight_dependents() {
    let (temp_dir, orchestrator) = create_test_orchestrator().await;
    define_architecture(
        &orchestrator,
        "shop",
        vec![
            Component::new("db", &[]),
            Component::new("api", &["db"]),
            Component::new("jobs", &["db"]),
        ],
    )
    .await;
    orchestrator
        .plan_build(&PlanBuild {
            project: "shop".to_string(),
            checkpoints: false,
            ..PlanBuild::default()
        })
        .await
        .unwrap();

    let root = temp_dir.path().join("code");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("schema.sql"), "CREATE TABLE new;").unwrap();

    let mut db_step = step("shop", "p1t1", StepOutcome::Completed);
    db_step.file_changes = vec![FileChange::modified(
        "schema.sql",
        Some("CREATE TABLE old;".to_string()),
    )];
    orchestrator.execute_step(&db_step).await.unwrap();
    orchestrator
        .start_step(&TaskRef {
            project: "shop".to_string(),
            task_id: "p2t1".to_string(),
            session_id: None,
        })
        .await
        .unwrap();
    orchestrator
        .execute_step(&step("shop", "p2t2", StepOutcome::Completed))
        .await
        .unwrap();

    let rollback = orchestrator
        .rollback_step(&RollbackStep {
            project: "shop".to_string(),
            task_id: Some("p1t1".to_string()),
            project_root_path: Some(root.display().to_string()),
            session_id: None,
        })
        .await
        .unwrap();

    assert_eq!(rollback.effects.reset_dependents, vec!["p2t1"]);
    assert_eq!(rollback.files[0].result, RevertResult::Restored);
    assert_eq!(
        std::fs::read_to_string(root.join("schema.sql")).unwrap(),
        "CREATE TABLE old;"
    );

    let plan = orchestrator.show_build(&project("shop")).await.unwrap();
    let target = plan.task("p1t1").unwrap();
    assert_eq!(target.status, TaskStatus::RolledBack);
    assert!(target.file_changes.is_empty());
    let in_flight = plan.task("p2t1").unwrap();
    assert_eq!(in_flight.status, TaskStatus::Pending);
    assert!(in_flight.started.is_none());
    assert_eq!(plan.task("p2t2").unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_approve_on_last_phase_is_capped() {
    let (_temp_dir, orchestrator) = create_test_orchestrator().await;
    define_architecture(&orchestrator, "tiny", vec![Component::new("A", &[])]).await;
    orchestrator
        .plan_build(&PlanBuild {
            project: "tiny".to_string(),
            ..PlanBuild::default()
        })
        .await
        .unwrap();

    for _ in 0..2 {
        let outcome = orchestrator
            .review_checkpoint(&ReviewCheckpoint {
                project: "tiny".to_string(),
                action: CheckpointAction::Approve,
                reason: None,
                session_id: None,
            })
            .await
            .unwrap();
        match outcome {
            CheckpointOutcome::Decision(decision) => {
                assert!(decision.capped);
                assert_eq!(decision.current_phase, 0);
            }
            CheckpointOutcome::Review(_) => panic!("approve must return a decision"),
        }
    }
}

#[tokio::test]
async fn test_stale_writer_gets_version_conflict() {
    let (temp_dir, orchestrator) = create_test_orchestrator().await;
    define_architecture(&orchestrator, "shop", vec![Component::new("A", &[])]).await;
    orchestrator
        .plan_build(&PlanBuild {
            project: "shop".to_string(),
            ..PlanBuild::default()
        })
        .await
        .unwrap();

    let mut db = Database::new(temp_dir.path().join("test.db")).unwrap();
    let mut stale = db.get_current_plan("shop").unwrap().unwrap();

    orchestrator
        .execute_step(&step("shop", "p1t1", StepOutcome::Completed))
        .await
        .unwrap();

    stale.status = PlanStatus::Paused;
    let err = db.update_plan(&stale).unwrap_err();
    assert!(matches!(err, OrchestratorError::VersionConflict { .. }));
    assert!(err.is_conflict());
    assert!(!err.is_usage_error());

    let plan = orchestrator.show_build(&project("shop")).await.unwrap();
    assert_eq!(plan.status, PlanStatus::Completed);
}
