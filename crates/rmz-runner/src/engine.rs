use rmz_agents::Roster;
use rmz_core::{select_next_role, RoleKind, WorkflowState};
use tracing::{debug, info};

/// Final state of a run plus the route it took.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub state: WorkflowState,
    pub selections: Vec<RoleKind>,
    pub steps: usize,
}

/// Star-shaped step loop: the router picks a role, the role runs once, and
/// control comes back to the router.
pub struct Engine {
    roster: Roster,
}

impl Engine {
    pub fn new(roster: Roster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// One dispatch. Returns the role that ran.
    pub fn step(&self, state: &mut WorkflowState) -> RoleKind {
        let role = select_next_role(state);
        debug!(role = %role, stage = %state.stage, "dispatch");
        self.roster.dispatch(role, state);
        role
    }

    /// Dispatch at most `max_steps` roles, stopping early once the queue is empty.
    pub fn run(&self, mut state: WorkflowState, max_steps: usize) -> RunReport {
        let mut selections = Vec::with_capacity(max_steps);
        for step in 1..=max_steps {
            let role = self.step(&mut state);
            selections.push(role);
            info!(step, role = %role, stage = %state.stage, progress = state.progress, "step finished");
            if state.queue_is_empty() {
                break;
            }
        }
        let steps = selections.len();
        if !state.queue_is_empty() {
            info!(steps, remaining = state.coordinator.task_queue.len(), "step budget exhausted");
        }
        RunReport { state, selections, steps }
    }
}
