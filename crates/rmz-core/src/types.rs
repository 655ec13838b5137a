use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ids::*, model::*};

fn default_priority() -> i32 {
    1
}

/// A unit of work in the coordinator's queue.
///
/// `priority` is advisory: lower is more urgent, and only the coordinator
/// looks at it when ordering a freshly generated batch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to: Option<RoleKind>,
    /// Worker parameters (coordinates, stats, ...). Missing keys use worker defaults.
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, kind: TaskKind, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            priority: default_priority(),
            dependencies: vec![],
            status: TaskStatus::Pending,
            assigned_to: None,
            data: BTreeMap::new(),
            result: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Dependencies behave as a set: duplicates are dropped, first occurrence wins.
    pub fn with_dependencies<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        for dep in deps {
            let dep = dep.into();
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn role(&self) -> RoleKind {
        self.kind.role()
    }

    pub fn dependencies_met(&self, completed: &[TaskId]) -> bool {
        self.dependencies.iter().all(|dep| completed.contains(dep))
    }

    pub fn data_u32(&self, key: &str) -> Option<u32> {
        self.data.get(key).and_then(Value::as_u64).and_then(|v| u32::try_from(v).ok())
    }

    pub fn data_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Name of the document entity a task refers to: `create_starting_town` -> `starting town`.
    /// An explicit `data.name` wins over the id.
    pub fn entity_name(&self) -> String {
        if let Some(name) = self.data_str("name") {
            return name.trim().to_string();
        }
        let raw = self.id.as_str();
        raw.strip_prefix("create_").unwrap_or(raw).replace('_', " ")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskResult {
    Created { records: BTreeMap<String, RecordId> },
    Failed { error: String },
}

impl TaskResult {
    pub fn record(&self, key: &str) -> Option<RecordId> {
        match self {
            TaskResult::Created { records } => records.get(key).copied(),
            TaskResult::Failed { .. } => None,
        }
    }
}

/// Per-role bookkeeping, created lazily the first time a role is dispatched.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoleState {
    pub role_id: String,
    pub role_kind: RoleKind,
    /// Set only while a task is in progress within a single step.
    #[serde(default)]
    pub current_task: Option<TaskId>,
    /// Append-only, in completion order.
    #[serde(default)]
    pub completed_task_ids: Vec<TaskId>,
    #[serde(default)]
    pub knowledge_base: BTreeMap<String, Value>,
    /// Role scratch. Keys per role: `maps_created`, `events_created`, `dialogue_created`,
    /// `cutscenes_created`, `skills_created`, `enemies_created`, `troops_created`
    /// (arrays of record ids or event objects), `asset_mappings` (name -> actor id),
    /// `issues_found` (findings), `validated_fingerprint` (string).
    #[serde(default)]
    pub working_data: BTreeMap<String, Value>,
}

impl RoleState {
    pub fn new(kind: RoleKind) -> Self {
        Self {
            role_id: kind.as_str().to_string(),
            role_kind: kind,
            current_task: None,
            completed_task_ids: vec![],
            knowledge_base: BTreeMap::new(),
            working_data: BTreeMap::new(),
        }
    }

    /// Append `value` to the array stored under `key`, creating it if needed.
    pub fn push_scratch(&mut self, key: &str, value: impl Into<Value>) {
        let slot = self.working_data.entry(key.to_string()).or_insert_with(|| Value::Array(vec![]));
        match slot {
            Value::Array(items) => items.push(value.into()),
            other => *other = Value::Array(vec![other.take(), value.into()]),
        }
    }

    /// Record ids stored under `key`; event objects contribute their `id` field.
    pub fn scratch_ids(&self, key: &str) -> Vec<RecordId> {
        let Some(Value::Array(items)) = self.working_data.get(key) else {
            return vec![];
        };
        items
            .iter()
            .filter_map(|v| match v {
                Value::Object(map) => map.get("id").and_then(Value::as_u64),
                other => other.as_u64(),
            })
            .filter_map(|v| RecordId::try_from(v).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_name_derives_from_id() {
        let t = Task::new("create_starting_town", TaskKind::MapCreation, "town");
        assert_eq!(t.entity_name(), "starting town");
        let t = Task::new("harbor", TaskKind::MapCreation, "").with_data("name", "Old Harbor");
        assert_eq!(t.entity_name(), "Old Harbor");
    }

    #[test]
    fn dependencies_are_a_set() {
        let t = Task::new("b", TaskKind::CutsceneCreation, "").with_dependencies(["a", "a", "c"]);
        assert_eq!(t.dependencies, vec![TaskId::from("a"), TaskId::from("c")]);
        assert!(!t.dependencies_met(&[TaskId::from("a")]));
        assert!(t.dependencies_met(&[TaskId::from("c"), TaskId::from("a")]));
    }

    #[test]
    fn task_deserializes_with_defaults() {
        let t: Task = serde_json::from_value(json!({
            "id": "create_slime",
            "kind": "enemy_creation",
            "description": "a slime"
        }))
        .unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.priority, 1);
        assert!(t.dependencies.is_empty());
        assert!(t.result.is_none());
    }

    #[test]
    fn scratch_ids_read_plain_and_object_entries() {
        let mut role = RoleState::new(RoleKind::EventEngineer);
        role.push_scratch("events_created", json!({"id": 3, "map_id": 1}));
        role.push_scratch("events_created", 7);
        assert_eq!(role.scratch_ids("events_created"), vec![3, 7]);
        assert!(role.scratch_ids("missing").is_empty());
    }
}
