use rmz_core::{CoreError, RoleKind, TaskKind};
use rmz_store::StoreError;
use thiserror::Error;

/// Why a domain action could not finish. Always folded into a failed task.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Document(#[from] CoreError),

    #[error("{role} cannot handle {kind} tasks")]
    Unsupported { role: RoleKind, kind: TaskKind },
}
