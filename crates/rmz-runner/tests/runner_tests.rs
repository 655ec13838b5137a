use std::path::Path;
use std::sync::Arc;

use rmz_agents::{Roster, Tools};
use rmz_core::{RoleKind, Stage, Task, TaskKind, TaskStatus, WorkflowState};
use rmz_runner::{Config, Engine, RunOptions, RunSummary, Runner};
use rmz_store::InMemoryRecordStore;
use tempfile::tempdir;

fn plan_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/plans/jrpg-opening.yaml")
}

fn engine(plan: Option<Vec<Task>>) -> Engine {
    Engine::new(Roster::build(Tools::new(Arc::new(InMemoryRecordStore::new())), plan, 0.1))
}

#[test]
fn run_writes_records_state_and_summary() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    let cfg = Runner::init_project(dir.path()).unwrap();
    assert_eq!(cfg.engine.max_steps, 20);
    assert!(Config::config_path(dir.path()).exists());

    let runner = Runner::open(dir.path().to_path_buf()).unwrap();
    let opts = RunOptions {
        title: Some("Epic Fantasy Adventure".into()),
        description: Some("A classic JRPG".into()),
        ..Default::default()
    };
    let summary = runner.run(&opts).unwrap();

    assert_eq!(summary.title, "Epic Fantasy Adventure");
    assert_eq!(summary.stage, Stage::Implementation);
    assert_eq!(summary.progress_percent, 20);
    assert_eq!(summary.steps, 3);
    assert_eq!(summary.created[&RoleKind::WorldBuilder]["map_id"], vec![1]);
    assert_eq!(summary.created[&RoleKind::EventEngineer]["event_id"], vec![1]);
    assert!(summary.findings.is_empty());

    assert!(dir.path().join("data/Map001.json").exists());
    assert!(dir.path().join("data/MapInfos.json").exists());

    let state = runner.load_state().unwrap();
    assert_eq!(state.game_document.metadata.description, "A classic JRPG");
    assert!(state.queue_is_empty());
    assert_eq!(runner.status().unwrap(), summary);
}

#[test]
fn run_without_data_dir_fails_unless_dry() {
    let dir = tempdir().unwrap();
    let runner = Runner::open(dir.path().to_path_buf()).unwrap();
    assert!(Runner::init_project(dir.path()).is_err());
    assert!(runner.run(&RunOptions::default()).is_err());

    let summary = runner.run(&RunOptions { dry_run: true, ..Default::default() }).unwrap();
    assert_eq!(summary.completed.len(), 2);
    assert!(!dir.path().join("data").exists());
}

#[test]
fn plan_file_and_step_budget_come_from_options() {
    let dir = tempdir().unwrap();
    let runner = Runner::open(dir.path().to_path_buf()).unwrap().with_store(Arc::new(InMemoryRecordStore::new()));
    let summary = runner
        .run(&RunOptions { plan: Some(plan_path()), max_steps: Some(4), ..Default::default() })
        .unwrap();
    assert_eq!(summary.steps, 4);
    assert_eq!(summary.completed.len(), 3);
    assert_eq!(summary.pending.len(), 4);

    let full = runner.run(&RunOptions { plan: Some(plan_path()), ..Default::default() }).unwrap();
    assert_eq!(full.completed.len(), 7);
    assert!(full.pending.is_empty() && full.failed.is_empty());
    assert_eq!(full.progress_percent, 70);
}

#[test]
fn identical_runs_have_identical_fingerprints() {
    let plan = rmz_runner::load_plan(&plan_path()).unwrap();
    let a = engine(Some(plan.clone())).run(WorkflowState::new("Epic", ""), 20);
    let b = engine(Some(plan)).run(WorkflowState::new("Epic", ""), 20);

    assert_eq!(a.selections, b.selections);
    assert_eq!(a.state.coordinator.completed_task_ids(), b.state.coordinator.completed_task_ids());
    assert_eq!(RunSummary::from_report(&a).fingerprint, RunSummary::from_report(&b).fingerprint);
}

#[test]
fn progress_never_decreases_and_caps_at_one() {
    let plan: Vec<Task> = (0..15).map(|i| Task::new(format!("create_skill_{i}"), TaskKind::SkillCreation, "")).collect();
    let engine = engine(Some(plan));
    let mut state = WorkflowState::new("Epic", "");
    let mut last = 0.0;
    for _ in 0..20 {
        engine.step(&mut state);
        assert!(state.progress >= last);
        assert!(state.progress <= 1.0);
        last = state.progress;
    }
    assert_eq!(state.progress, 1.0);
    assert_eq!(state.coordinator.completed_task_ids().len(), 15);
}

#[test]
fn dependents_never_start_before_their_dependencies() {
    let plan = rmz_runner::load_plan(&plan_path()).unwrap();
    let report = engine(Some(plan.clone())).run(WorkflowState::new("Epic", ""), 20);
    let order = report.state.coordinator.completed_task_ids();
    for task in &plan {
        let pos = order.iter().position(|id| *id == task.id).unwrap();
        for dep in &task.dependencies {
            let dep_pos = order.iter().position(|id| id == dep).unwrap();
            assert!(dep_pos < pos, "{} finished before its dependency {}", task.id, dep);
        }
    }
}

#[test]
fn budget_bounds_dispatches_with_self_dependency() {
    let plan = vec![Task::new("create_loop", TaskKind::MapCreation, "").with_dependencies(["create_loop"])];
    let report = engine(Some(plan)).run(WorkflowState::new("Epic", ""), 7);
    assert_eq!(report.steps, 7);
    assert_eq!(report.state.coordinator.task_queue[0].status, TaskStatus::Pending);
    assert_eq!(report.state.stage, Stage::Implementation);
}

#[test]
fn open_and_init_share_the_saved_config() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    let mut cfg = Runner::open(dir.path().to_path_buf()).unwrap().cfg;
    cfg.engine.max_steps = 7;
    cfg.save_to(&Config::config_path(dir.path())).unwrap();

    assert_eq!(Runner::init_project(dir.path()).unwrap().engine.max_steps, 7);
    assert_eq!(Runner::open(dir.path().to_path_buf()).unwrap().cfg.engine.max_steps, 7);
}
