use crate::{ids::TaskId, model::*, state::WorkflowState, types::Task};

/// Decide which role acts next. Pure: same state, same answer.
///
/// - planning always goes to the coordinator
/// - otherwise the first pending task (insertion order) whose dependencies are
///   all completed picks its worker; blocked tasks are skipped, not waited on
/// - with nothing eligible, testing goes to the tester and everything else
///   back to the coordinator
pub fn select_next_role(state: &WorkflowState) -> RoleKind {
    if state.stage == Stage::Planning {
        return RoleKind::Coordinator;
    }

    let completed = state.coordinator.completed_task_ids();
    if let Some(task) = state
        .coordinator
        .task_queue
        .iter()
        .find(|t| t.role().is_worker() && task_is_eligible(t, completed))
    {
        return task.role();
    }

    if state.stage == Stage::Testing {
        return RoleKind::Tester;
    }
    RoleKind::Coordinator
}

/// A task is eligible when it is pending and every dependency has completed.
/// Dependencies on ids that never complete (unknown ids, self-references)
/// keep the task ineligible forever.
pub fn task_is_eligible(task: &Task, completed: &[TaskId]) -> bool {
    task.status == TaskStatus::Pending && task.dependencies_met(completed)
}

/// First eligible task for `role`, in queue order.
pub fn next_task_for<'a>(queue: &'a [Task], completed: &[TaskId], role: RoleKind) -> Option<&'a Task> {
    queue.iter().find(|t| role.handles(t.kind) && task_is_eligible(t, completed))
}
