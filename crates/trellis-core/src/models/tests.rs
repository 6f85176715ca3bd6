#[cfg(test)]
mod model_tests {
    use jiff::Timestamp;

    use crate::models::{
        BuildPlan, FileChange, Phase, PhaseStatus, PlanStatus, PlanSummary, Progress, Task,
        TaskStatus,
    };

    fn create_test_task(id: &str, status: TaskStatus, depends_on: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            name: format!("component-{id}"),
            description: "Implement the component".to_string(),
            component: Some(format!("component-{id}")),
            depends_on: depends_on.iter().map(|d| (*d).to_string()).collect(),
            expected_files: vec!["src/**".to_string()],
            status,
            file_changes: vec![],
            started: None,
            completed: None,
            error: None,
        }
    }

    fn create_test_phase(id: u32, tasks: Vec<Task>) -> Phase {
        Phase {
            id,
            name: format!("Phase {id}"),
            description: String::new(),
            tasks,
            status: PhaseStatus::Pending,
            checkpoint: true,
        }
    }

    fn create_test_plan() -> BuildPlan {
        BuildPlan {
            id: 789,
            project: "shop".to_string(),
            description: "Storefront MVP".to_string(),
            status: PlanStatus::InProgress,
            current_phase: 0,
            phases: vec![
                create_test_phase(
                    1,
                    vec![
                        create_test_task("p1t1", TaskStatus::Completed, &[]),
                        create_test_task("p1t2", TaskStatus::Pending, &[]),
                    ],
                ),
                create_test_phase(
                    2,
                    vec![create_test_task("p2t1", TaskStatus::Pending, &["p1t1", "p1t2"])],
                ),
            ],
            session_id: "session".to_string(),
            version: 3,
            created_at: Timestamp::from_second(1640995200).unwrap(),
            updated_at: Timestamp::from_second(1641081600).unwrap(),
        }
    }

    fn phase_of(statuses: &[TaskStatus]) -> Phase {
        create_test_phase(
            1,
            statuses
                .iter()
                .enumerate()
                .map(|(i, status)| create_test_task(&format!("p1t{}", i + 1), *status, &[]))
                .collect(),
        )
    }

    #[test]
    fn test_derived_phase_status() {
        use TaskStatus::*;

        assert_eq!(phase_of(&[]).derived_status(), PhaseStatus::Completed);
        assert_eq!(
            phase_of(&[Completed, Completed]).derived_status(),
            PhaseStatus::Completed
        );
        assert_eq!(
            phase_of(&[Pending, Pending]).derived_status(),
            PhaseStatus::Pending
        );
        assert_eq!(
            phase_of(&[Pending, RolledBack]).derived_status(),
            PhaseStatus::Pending
        );
        assert_eq!(
            phase_of(&[Completed, Pending]).derived_status(),
            PhaseStatus::InProgress
        );
        assert_eq!(
            phase_of(&[Failed, Pending]).derived_status(),
            PhaseStatus::Failed
        );
        assert_eq!(
            phase_of(&[Completed, Failed]).derived_status(),
            PhaseStatus::InProgress
        );
        assert_eq!(
            phase_of(&[Failed, RolledBack]).derived_status(),
            PhaseStatus::Failed
        );
        assert_eq!(
            phase_of(&[Failed, InProgress]).derived_status(),
            PhaseStatus::InProgress
        );
    }

    #[test]
    fn test_task_transition_table() {
        use TaskStatus::*;

        let allowed = [
            (Pending, InProgress),
            (Pending, Completed),
            (Pending, Failed),
            (InProgress, Completed),
            (InProgress, Failed),
            (InProgress, Pending),
            (Completed, RolledBack),
            (Failed, RolledBack),
            (Failed, Pending),
            (RolledBack, Pending),
        ];
        let all = [Pending, InProgress, Completed, Failed, RolledBack];

        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_status_parsing_and_serde_names() {
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("ROLLED_BACK".parse::<TaskStatus>(), Ok(TaskStatus::RolledBack));
        assert!("done".parse::<TaskStatus>().is_err());
        assert_eq!("paused".parse::<PlanStatus>(), Ok(PlanStatus::Paused));

        assert_eq!(
            serde_json::to_string(&TaskStatus::RolledBack).unwrap(),
            "\"rolled_back\""
        );
        assert_eq!(
            serde_json::to_string(&PlanStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_unmet_dependencies_and_next_actionable_task() {
        let mut plan = create_test_plan();
        let p2t1 = plan.task("p2t1").unwrap().clone();

        assert_eq!(plan.unmet_dependencies(&p2t1), vec!["p1t2"]);
        assert_eq!(plan.next_actionable_task().unwrap().id, "p1t2");

        plan.task_mut("p1t2").unwrap().status = TaskStatus::Completed;
        assert!(plan.unmet_dependencies(&p2t1).is_empty());
        assert_eq!(plan.next_actionable_task().unwrap().id, "p2t1");
    }

    #[test]
    fn test_at_checkpoint_requires_completed_checkpoint_phase() {
        let mut plan = create_test_plan();
        assert!(!plan.at_checkpoint());

        plan.task_mut("p1t2").unwrap().status = TaskStatus::Completed;
        assert!(plan.at_checkpoint());

        plan.phases[0].checkpoint = false;
        assert!(!plan.at_checkpoint());
    }

    #[test]
    fn test_progress_and_ledger() {
        let mut plan = create_test_plan();
        plan.task_mut("p1t1").unwrap().file_changes = vec![
            FileChange::created("src/a.rs"),
            FileChange::modified("Cargo.toml", Some("[package]".to_string())),
        ];
        plan.task_mut("p2t1").unwrap().status = TaskStatus::Failed;

        let progress = plan.progress();
        assert_eq!(
            progress,
            Progress {
                total: 3,
                pending: 1,
                in_progress: 0,
                completed: 1,
                failed: 1,
                rolled_back: 0,
            }
        );
        assert_eq!(progress.remaining(), 2);

        let ledger = plan.file_ledger();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.iter().all(|entry| entry.task_id == "p1t1"));
        assert_eq!(ledger[1].change.path, "Cargo.toml");
    }

    #[test]
    fn test_file_change_reversibility() {
        assert!(FileChange::created("a").is_reversible());
        assert!(FileChange::deleted("a", Some(String::new())).is_reversible());
        assert!(!FileChange::modified("a", None).is_reversible());
        assert!(!FileChange::deleted("a", None).is_reversible());
    }

    #[test]
    fn test_plan_round_trips_through_json() {
        let plan = create_test_plan();
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"status\":\"in_progress\""));
        let back: BuildPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_task_display() {
        let mut task = create_test_task("p1t1", TaskStatus::Failed, &["p0t1"]);
        task.error = Some("linker error".to_string());
        task.file_changes = vec![FileChange::modified("build.rs", None)];
        let output = format!("{}", task);

        assert!(output.contains("### p1t1. component-p1t1 (✗ Failed)"));
        assert!(output.contains("- Depends on: p0t1"));
        assert!(output.contains("#### Error"));
        assert!(output.contains("linker error"));
        assert!(output.contains("- `build.rs` (modified) [irreversible]"));
        assert!(!output.contains("#### Expected Files"));
    }

    #[test]
    fn test_pending_task_display_shows_expected_files() {
        let output = format!("{}", create_test_task("p1t2", TaskStatus::Pending, &[]));

        assert!(output.contains("(○ Pending)"));
        assert!(output.contains("#### Expected Files"));
        assert!(output.contains("- `src/**`"));
        assert!(!output.contains("#### Error"));
    }

    #[test]
    fn test_plan_display() {
        let plan = create_test_plan();
        let output = format!("{}", plan);

        assert!(output.contains("# 789. Build plan for shop"));
        assert!(output.contains("- Status: in_progress"));
        assert!(output.contains("- Current phase: 1 of 2"));
        assert!(output.contains("- Progress: 1/3 tasks completed"));
        assert!(output.contains("Storefront MVP"));
        assert!(output.contains("## Phase 1 (in_progress) [checkpoint]"));
        assert!(output.contains("## Phase 2 (pending) [checkpoint]"));
        assert!(output.contains("✓ Completed"));
    }

    #[test]
    fn test_plan_display_without_phases() {
        let mut plan = create_test_plan();
        plan.phases.clear();
        let output = format!("{}", plan);

        assert!(output.contains("No phases in this plan."));
    }

    #[test]
    fn test_plan_summary_display() {
        let summary = PlanSummary::from(&create_test_plan());
        let output = format!("{}", summary);

        assert!(output.contains("## shop (ID: 789) (1/3)"));
        assert!(output.contains("- **Description**: Storefront MVP"));
        assert!(output.contains("- **Phases**: 0/2 completed, current 1"));
        assert!(output.ends_with("\n\n"));
    }
}
