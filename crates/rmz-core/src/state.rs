use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{document::*, ids::*, model::*, types::*};

/// Coordinator bookkeeping: the authoritative queue plus aggregate progress.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CoordinatorState {
    pub role: RoleState,
    /// Insertion order is the router's tie-break.
    pub task_queue: Vec<Task>,
    /// Every task ever enqueued, grouped under the role its kind maps to.
    #[serde(default)]
    pub assignments: BTreeMap<RoleKind, Vec<TaskId>>,
    /// Completed / assigned ratio per role, refreshed whenever the coordinator runs.
    #[serde(default)]
    pub role_progress: BTreeMap<RoleKind, f64>,
    /// Ids are never reused, including ids of tasks already removed from the queue.
    #[serde(default)]
    pub issued_ids: BTreeSet<TaskId>,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self {
            role: RoleState::new(RoleKind::Coordinator),
            task_queue: vec![],
            assignments: BTreeMap::new(),
            role_progress: BTreeMap::new(),
            issued_ids: BTreeSet::new(),
        }
    }
}

impl CoordinatorState {
    pub fn completed_task_ids(&self) -> &[TaskId] {
        &self.role.completed_task_ids
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.task_queue.iter().find(|t| &t.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.task_queue.iter().filter(|t| t.status == TaskStatus::Pending)
    }

    pub fn failed(&self) -> impl Iterator<Item = &Task> {
        self.task_queue.iter().filter(|t| t.status == TaskStatus::Failed)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RoleInitialized { role: RoleKind },
    TasksQueued { task_ids: Vec<TaskId> },
    PlanRejected { error: String },
    UnknownDependency { task_id: TaskId, dependency: TaskId },
    StageChanged { from: Stage, to: Stage },
    TaskClaimed { task_id: TaskId, role: RoleKind },
    TaskCompleted { task_id: TaskId, role: RoleKind, records: BTreeMap<String, RecordId> },
    TaskFailed { task_id: TaskId, role: RoleKind, error: String },
    EntityStubbed { role: RoleKind, entity: String, name: String },
    Advice { role: RoleKind, chars: usize },
    Validation { findings: usize, failures: usize },
    Idle { role: RoleKind },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub seq: u64,
    pub event: LogEvent,
}

/// The single unit of truth threaded through every engine step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkflowState {
    pub game_document: GameDocument,
    pub coordinator: CoordinatorState,
    /// Worker states, absent until the role is first dispatched.
    #[serde(default)]
    pub roles: BTreeMap<RoleKind, RoleState>,
    pub stage: Stage,
    /// In [0.0, 1.0], non-decreasing.
    pub progress: f64,
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl WorkflowState {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_document(GameDocument::new(GameMetadata::new(title, description)))
    }

    pub fn with_document(game_document: GameDocument) -> Self {
        Self {
            game_document,
            coordinator: CoordinatorState::default(),
            roles: BTreeMap::new(),
            stage: Stage::Planning,
            progress: 0.0,
            log: vec![],
        }
    }

    pub fn role(&self, kind: RoleKind) -> Option<&RoleState> {
        match kind {
            RoleKind::Coordinator => Some(&self.coordinator.role),
            other => self.roles.get(&other),
        }
    }

    pub fn role_mut(&mut self, kind: RoleKind) -> Option<&mut RoleState> {
        match kind {
            RoleKind::Coordinator => Some(&mut self.coordinator.role),
            other => self.roles.get_mut(&other),
        }
    }

    /// Create the role's state on first use. Returns true if it was created;
    /// an existing state is never replaced.
    pub fn ensure_role(&mut self, kind: RoleKind) -> bool {
        if self.role(kind).is_some() {
            return false;
        }
        self.roles.insert(kind, RoleState::new(kind));
        self.record(LogEvent::RoleInitialized { role: kind });
        true
    }

    pub fn set_stage(&mut self, to: Stage) -> bool {
        if self.stage == to {
            return false;
        }
        let from = self.stage;
        self.stage = to;
        self.record(LogEvent::StageChanged { from, to });
        true
    }

    /// Add `increment` to progress, clamped to [current, 1.0].
    pub fn advance_progress(&mut self, increment: f64) -> f64 {
        if increment.is_finite() && increment > 0.0 {
            self.progress = (self.progress + increment).min(1.0);
        }
        self.progress
    }

    pub fn record(&mut self, event: LogEvent) {
        let seq = self.log.last().map(|e| e.seq + 1).unwrap_or(0);
        self.log.push(LogEntry { seq, event });
    }

    pub fn queue_is_empty(&self) -> bool {
        self.coordinator.task_queue.is_empty()
    }
}
