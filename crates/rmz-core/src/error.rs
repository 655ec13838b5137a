use thiserror::Error;

use crate::{ids::TaskId, model::TaskStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("task id `{0}` was already issued")]
    DuplicateTaskId(TaskId),

    #[error("task `{0}` is not in the queue")]
    UnknownTask(TaskId),

    #[error("task `{id}` cannot move from {from} to {to}")]
    InvalidTransition { id: TaskId, from: TaskStatus, to: TaskStatus },

    #[error("unknown task kind `{0}`")]
    UnknownTaskKind(String),

    #[error("unknown stage `{0}`")]
    UnknownStage(String),

    #[error("unknown role `{0}`")]
    UnknownRole(String),

    #[error("{entity} `{name}` already exists in the document")]
    DuplicateEntity { entity: &'static str, name: String },
}
