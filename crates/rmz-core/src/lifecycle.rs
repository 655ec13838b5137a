//! Queue mutations owned by the coordinator. Each call is one atomic change:
//! it either fully applies or leaves the queue untouched.

use std::collections::BTreeSet;

use crate::{error::CoreError, ids::*, model::*, state::CoordinatorState, types::*};

/// Outcome of enqueueing a batch: dependencies that did not resolve to a known id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnqueueReport {
    pub queued: Vec<TaskId>,
    pub unknown_dependencies: Vec<(TaskId, TaskId)>,
}

impl CoordinatorState {
    pub fn enqueue(&mut self, task: Task) -> Result<EnqueueReport, CoreError> {
        self.enqueue_batch(vec![task])
    }

    /// Append tasks in the given order. Ids must be new (never issued before and
    /// unique within the batch). Tasks are reset to `Pending`.
    ///
    /// A dependency on an id that is neither issued nor part of the batch is
    /// tolerated: the task just never becomes eligible.
    pub fn enqueue_batch(&mut self, tasks: Vec<Task>) -> Result<EnqueueReport, CoreError> {
        let mut batch_ids = BTreeSet::new();
        for task in &tasks {
            if self.issued_ids.contains(&task.id) || !batch_ids.insert(task.id.clone()) {
                return Err(CoreError::DuplicateTaskId(task.id.clone()));
            }
        }

        let mut report = EnqueueReport::default();
        for mut task in tasks {
            for dep in &task.dependencies {
                if !self.issued_ids.contains(dep) && !batch_ids.contains(dep) {
                    report.unknown_dependencies.push((task.id.clone(), dep.clone()));
                }
            }
            task.status = TaskStatus::Pending;
            task.assigned_to = None;
            task.result = None;

            self.issued_ids.insert(task.id.clone());
            self.assignments.entry(task.role()).or_default().push(task.id.clone());
            report.queued.push(task.id.clone());
            self.task_queue.push(task);
        }
        Ok(report)
    }

    /// Claim a pending task for `role`. Fails if the task is not pending, so a
    /// second claim on the same task can never succeed.
    pub fn claim(&mut self, id: &TaskId, role: RoleKind) -> Result<&Task, CoreError> {
        let task = self.task_mut(id)?;
        transition(task, TaskStatus::InProgress)?;
        task.assigned_to = Some(role);
        Ok(task)
    }

    /// Complete an in-progress task: record the result, append it to the
    /// completion order and drop it from the queue. Returns the finished task.
    pub fn mark_completed(&mut self, id: &TaskId, result: TaskResult) -> Result<Task, CoreError> {
        let task = self.task_mut(id)?;
        transition(task, TaskStatus::Completed)?;
        task.result = Some(result);
        self.role.completed_task_ids.push(id.clone());
        self.remove_from_queue(id).ok_or_else(|| CoreError::UnknownTask(id.clone()))
    }

    /// Fail an in-progress task. It stays in the queue for inspection.
    pub fn mark_failed(&mut self, id: &TaskId, error: impl Into<String>) -> Result<&Task, CoreError> {
        let task = self.task_mut(id)?;
        transition(task, TaskStatus::Failed)?;
        task.result = Some(TaskResult::Failed { error: error.into() });
        Ok(task)
    }

    pub fn remove_from_queue(&mut self, id: &TaskId) -> Option<Task> {
        let idx = self.task_queue.iter().position(|t| &t.id == id)?;
        Some(self.task_queue.remove(idx))
    }

    /// Queue a fresh copy of a failed task under `<id>-retry-<n>`. Never called
    /// by the engine itself; the failed task stays where it is.
    pub fn retry_failed(&mut self, id: &TaskId) -> Result<TaskId, CoreError> {
        let failed = self.find(id).ok_or_else(|| CoreError::UnknownTask(id.clone()))?;
        if failed.status != TaskStatus::Failed {
            return Err(CoreError::InvalidTransition {
                id: id.clone(),
                from: failed.status,
                to: TaskStatus::Pending,
            });
        }
        let mut copy = failed.clone();
        let mut n = 1;
        copy.id = loop {
            let candidate = TaskId::from_str(format!("{}-retry-{}", id.as_str(), n));
            if !self.issued_ids.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        let new_id = copy.id.clone();
        self.enqueue(copy)?;
        Ok(new_id)
    }

    /// Recompute completed / assigned per role.
    pub fn refresh_progress(&mut self) {
        let completed = &self.role.completed_task_ids;
        self.role_progress = self
            .assignments
            .iter()
            .map(|(role, ids)| {
                let done = ids.iter().filter(|id| completed.contains(id)).count();
                let ratio = if ids.is_empty() { 0.0 } else { done as f64 / ids.len() as f64 };
                (*role, ratio)
            })
            .collect();
    }

    fn task_mut(&mut self, id: &TaskId) -> Result<&mut Task, CoreError> {
        self.task_queue
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| CoreError::UnknownTask(id.clone()))
    }
}

fn transition(task: &mut Task, to: TaskStatus) -> Result<(), CoreError> {
    if !task.status.can_transition_to(to) {
        return Err(CoreError::InvalidTransition { id: task.id.clone(), from: task.status, to });
    }
    task.status = to;
    Ok(())
}
