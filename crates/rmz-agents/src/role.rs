use std::sync::Arc;

use rmz_core::{RoleKind, WorkflowState};
use rmz_store::RecordStore;

use crate::generator::{ContentGenerator, PlaceholderGenerator};

/// A participant the engine can dispatch. One call is one step: the role runs
/// to completion against the state and returns.
pub trait Role: Send + Sync {
    fn kind(&self) -> RoleKind;
    fn process(&self, state: &mut WorkflowState);
}

/// External collaborators shared by every role.
#[derive(Clone)]
pub struct Tools {
    pub store: Arc<dyn RecordStore>,
    pub generator: Arc<dyn ContentGenerator>,
}

impl Tools {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store, generator: Arc::new(PlaceholderGenerator) }
    }

    pub fn with_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = generator;
        self
    }
}
