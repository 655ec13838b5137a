use std::collections::BTreeMap;

use rmz_core::{
    next_task_for, GameDocument, LogEvent, RecordId, RoleKind, RoleState, Task, TaskResult, WorkflowState,
};
use rmz_store::RecordStore;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::ActionError,
    generator::advise,
    role::{Role, Tools},
};

/// Progress added for every completed task.
pub const DEFAULT_PROGRESS_INCREMENT: f64 = 0.1;

/// Record ids produced by one action, keyed by what they are (`map_id`, ...).
pub type Records = BTreeMap<String, RecordId>;

/// What an action can touch while it runs.
pub struct ActionContext<'a> {
    pub document: &'a mut GameDocument,
    pub scratch: &'a mut RoleState,
    pub store: &'a dyn RecordStore,
    pub(crate) stubs: Vec<(&'static str, String)>,
}

impl ActionContext<'_> {
    /// Note that a default entity had to be created for a missing name.
    pub fn stubbed(&mut self, entity: &'static str, name: &str) {
        self.stubs.push((entity, name.to_string()));
    }
}

/// The role-specific half of a worker. `Worker` owns claiming and reporting.
pub trait DomainAction: Send + Sync {
    fn role(&self) -> RoleKind;

    /// Extra context for the content generator.
    fn details(&self, _task: &Task, _doc: &GameDocument, _scratch: &RoleState) -> Value {
        Value::Null
    }

    fn execute(&self, task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError>;
}

/// Claim / execute / report around a `DomainAction`.
pub struct Worker<A> {
    action: A,
    tools: Tools,
    progress_increment: f64,
}

impl<A: DomainAction> Worker<A> {
    pub fn new(action: A, tools: Tools) -> Self {
        Self { action, tools, progress_increment: DEFAULT_PROGRESS_INCREMENT }
    }

    pub fn with_progress_increment(mut self, increment: f64) -> Self {
        self.progress_increment = increment;
        self
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    fn run_action(&self, task: &Task, state: &mut WorkflowState) -> (Result<Records, ActionError>, Vec<(&'static str, String)>) {
        let kind = self.action.role();
        let WorkflowState { game_document, roles, .. } = state;
        let scratch = roles.entry(kind).or_insert_with(|| RoleState::new(kind));
        let mut ctx = ActionContext { document: game_document, scratch, store: self.tools.store.as_ref(), stubs: vec![] };
        let result = self.action.execute(task, &mut ctx);
        (result, ctx.stubs)
    }
}

impl<A: DomainAction> Role for Worker<A> {
    fn kind(&self) -> RoleKind {
        self.action.role()
    }

    fn process(&self, state: &mut WorkflowState) {
        let kind = self.action.role();
        state.ensure_role(kind);

        let completed = state.coordinator.completed_task_ids();
        let Some(task) = next_task_for(&state.coordinator.task_queue, completed, kind).cloned() else {
            debug!(role = %kind, "no eligible task");
            state.record(LogEvent::Idle { role: kind });
            return;
        };

        if let Err(e) = state.coordinator.claim(&task.id, kind) {
            warn!(role = %kind, task = %task.id, error = %e, "claim refused");
            state.record(LogEvent::Idle { role: kind });
            return;
        }
        if let Some(role) = state.role_mut(kind) {
            role.current_task = Some(task.id.clone());
        }
        state.record(LogEvent::TaskClaimed { task_id: task.id.clone(), role: kind });
        info!(role = %kind, task = %task.id, kind = %task.kind, "task claimed");

        let details = match state.role(kind) {
            Some(scratch) => self.action.details(&task, &state.game_document, scratch),
            None => Value::Null,
        };
        advise(self.tools.generator.as_ref(), state, kind, Some(&task), details);

        let (outcome, stubbed) = self.run_action(&task, state);
        for (entity, name) in stubbed {
            debug!(role = %kind, entity, name = %name, "stub entity created");
            state.record(LogEvent::EntityStubbed { role: kind, entity: entity.to_string(), name });
        }

        match outcome {
            Ok(records) => {
                let result = TaskResult::Created { records: records.clone() };
                match state.coordinator.mark_completed(&task.id, result) {
                    Ok(_) => {
                        if let Some(role) = state.role_mut(kind) {
                            role.completed_task_ids.push(task.id.clone());
                        }
                        let progress = state.advance_progress(self.progress_increment);
                        info!(role = %kind, task = %task.id, progress, "task completed");
                        state.record(LogEvent::TaskCompleted { task_id: task.id.clone(), role: kind, records });
                    }
                    Err(e) => warn!(role = %kind, task = %task.id, error = %e, "completion rejected"),
                }
            }
            Err(err) => {
                let error = err.to_string();
                warn!(role = %kind, task = %task.id, error = %error, "task failed");
                if let Err(e) = state.coordinator.mark_failed(&task.id, error.clone()) {
                    warn!(role = %kind, task = %task.id, error = %e, "failure not recorded");
                }
                state.record(LogEvent::TaskFailed { task_id: task.id.clone(), role: kind, error });
            }
        }

        if let Some(role) = state.role_mut(kind) {
            role.current_task = None;
        }
    }
}

pub(crate) fn records<const N: usize>(pairs: [(&str, RecordId); N]) -> Records {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Unsigned task parameter, falling back to `default` when absent or out of range.
pub(crate) fn param_u32(task: &Task, key: &str, default: u32) -> u32 {
    task.data_u32(key).unwrap_or(default)
}

pub(crate) fn param_i64(task: &Task, key: &str, default: i64) -> i64 {
    task.data_i64(key).unwrap_or(default)
}

/// String-list parameter; non-string entries are skipped.
pub(crate) fn param_lines(task: &Task, key: &str) -> Vec<String> {
    match task.data.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => vec![],
    }
}
