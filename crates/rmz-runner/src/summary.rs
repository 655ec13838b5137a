use std::collections::BTreeMap;
use std::fmt::Write as _;

use rmz_core::{LogEvent, RecordId, RoleKind, RunId, Stage, TaskId, TaskResult, TaskStatus, WorkflowState};
use rmz_validate::{validate, Finding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::RunReport;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FailedTask {
    pub id: TaskId,
    pub error: String,
}

/// What a finished run produced, in a form fit for printing or diffing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub title: String,
    pub stage: Stage,
    pub progress_percent: u32,
    pub steps: usize,
    /// Record ids per role, grouped by record key (`map_id`, `event_id`, ...).
    pub created: BTreeMap<RoleKind, BTreeMap<String, Vec<RecordId>>>,
    pub completed: Vec<TaskId>,
    pub failed: Vec<FailedTask>,
    /// Tasks still waiting, including any left in progress.
    pub pending: Vec<TaskId>,
    pub findings: Vec<Finding>,
    /// SHA-256 over the role selections and completion order.
    pub fingerprint: String,
}

impl RunSummary {
    pub fn from_report(report: &RunReport) -> Self {
        Self::from_state(&report.state, &report.selections)
    }

    pub fn from_state(state: &WorkflowState, selections: &[RoleKind]) -> Self {
        let mut created: BTreeMap<RoleKind, BTreeMap<String, Vec<RecordId>>> = BTreeMap::new();
        for entry in &state.log {
            if let LogEvent::TaskCompleted { role, records, .. } = &entry.event {
                let per_role = created.entry(*role).or_default();
                for (key, id) in records {
                    per_role.entry(key.clone()).or_default().push(*id);
                }
            }
        }

        let failed = state
            .coordinator
            .failed()
            .map(|t| FailedTask {
                id: t.id.clone(),
                error: match &t.result {
                    Some(TaskResult::Failed { error }) => error.clone(),
                    _ => String::new(),
                },
            })
            .collect();
        let pending = state
            .coordinator
            .task_queue
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress))
            .map(|t| t.id.clone())
            .collect();

        let completed = state.coordinator.completed_task_ids().to_vec();
        Self {
            run_id: RunId::new(),
            title: state.game_document.metadata.title.clone(),
            stage: state.stage,
            progress_percent: (state.progress * 100.0).round() as u32,
            steps: selections.len(),
            created,
            fingerprint: fingerprint(selections, &completed),
            completed,
            failed,
            pending,
            findings: validate(&state.game_document),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Game: {}", self.title);
        let _ = writeln!(out, "Stage: {}", self.stage);
        let _ = writeln!(out, "Progress: {}%", self.progress_percent);
        let _ = writeln!(out, "Steps: {}", self.steps);
        let _ = writeln!(out, "Completed ({}): {}", self.completed.len(), join(&self.completed));
        let _ = writeln!(out, "Pending ({}): {}", self.pending.len(), join(&self.pending));
        let _ = writeln!(out, "Failed ({}):", self.failed.len());
        for f in &self.failed {
            let _ = writeln!(out, "- {}: {}", f.id, f.error);
        }
        let _ = writeln!(out, "Created records:");
        for (role, records) in &self.created {
            let ids: Vec<String> = records
                .iter()
                .map(|(key, ids)| format!("{key}={}", ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")))
                .collect();
            let _ = writeln!(out, "- {role}: {}", ids.join(" "));
        }
        let _ = writeln!(out, "Findings ({}):", self.findings.len());
        for f in &self.findings {
            let _ = writeln!(out, "- [{:?}] {}", f.severity, f.message);
        }
        let _ = writeln!(out, "Fingerprint: {}", self.fingerprint);
        out
    }
}

fn join(ids: &[TaskId]) -> String {
    ids.iter().map(TaskId::as_str).collect::<Vec<_>>().join(", ")
}

/// Identical routes and completion orders hash identically.
pub fn fingerprint(selections: &[RoleKind], completed: &[TaskId]) -> String {
    let canonical = serde_json::json!({ "completed": completed, "selections": selections });
    hex::encode(Sha256::digest(canonical.to_string().as_bytes()))
}
