use rmz_core::{LogEvent, RoleKind, Stage, Task, TaskKind, WorkflowState};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    generator::advise,
    role::{Role, Tools},
};

/// The batch queued when no plan file is given: a town, then an intro
/// cutscene placed on it.
pub fn default_plan() -> Vec<Task> {
    vec![
        Task::new("create_starting_town", TaskKind::MapCreation, "Create the starting town where the hero begins")
            .with_priority(1),
        Task::new("create_intro_cutscene", TaskKind::CutsceneCreation, "Create the opening cutscene in the starting town")
            .with_priority(2)
            .with_dependencies(["create_starting_town"]),
    ]
}

/// Plans the work, advances the stage and keeps per-role progress current.
/// It never executes a task itself.
pub struct Coordinator {
    plan: Vec<Task>,
    tools: Tools,
}

impl Coordinator {
    pub fn new(tools: Tools) -> Self {
        Self { plan: default_plan(), tools }
    }

    pub fn with_plan(mut self, plan: Vec<Task>) -> Self {
        self.plan = plan;
        self
    }

    pub fn plan(&self) -> &[Task] {
        &self.plan
    }

    fn queue_initial_batch(&self, state: &mut WorkflowState) {
        let mut batch = self.plan.clone();
        // stable: equal priorities keep plan order
        batch.sort_by_key(|t| t.priority);

        match state.coordinator.enqueue_batch(batch) {
            Ok(report) => {
                info!(role = %RoleKind::Coordinator, tasks = report.queued.len(), "initial batch queued");
                for (task_id, dependency) in report.unknown_dependencies {
                    warn!(task = %task_id, dependency = %dependency, "dependency on unknown task");
                    state.record(LogEvent::UnknownDependency { task_id, dependency });
                }
                state.record(LogEvent::TasksQueued { task_ids: report.queued });
            }
            Err(e) => {
                warn!(role = %RoleKind::Coordinator, error = %e, "plan rejected");
                state.record(LogEvent::PlanRejected { error: e.to_string() });
            }
        }
    }
}

impl Role for Coordinator {
    fn kind(&self) -> RoleKind {
        RoleKind::Coordinator
    }

    fn process(&self, state: &mut WorkflowState) {
        state.ensure_role(RoleKind::Coordinator);

        match state.stage {
            Stage::Planning => {
                self.queue_initial_batch(state);
                state.set_stage(Stage::Implementation);
                info!(stage = %state.stage, "planning finished");
            }
            Stage::Implementation if state.coordinator.pending().next().is_none() => {
                state.set_stage(Stage::Testing);
                info!(stage = %state.stage, failed = state.coordinator.failed().count(), "no pending work left");
            }
            _ => {}
        }

        state.coordinator.refresh_progress();
        let details = json!({
            "stage": state.stage,
            "queue_len": state.coordinator.task_queue.len(),
            "role_progress": state.coordinator.role_progress,
        });
        advise(self.tools.generator.as_ref(), state, RoleKind::Coordinator, None, details);
    }
}
