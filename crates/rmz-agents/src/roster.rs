use rmz_core::{RoleKind, Task, WorkflowState};

use crate::{
    assets::AssetManager,
    combat::CombatSystem,
    coordinator::Coordinator,
    events::EventEngineer,
    role::{Role, Tools},
    tester::Tester,
    worker::{Worker, DEFAULT_PROGRESS_INCREMENT},
    world::WorldBuilder,
};

/// Fixed dispatch table: one implementation per role identity.
pub struct Roster {
    coordinator: Coordinator,
    world_builder: Worker<WorldBuilder>,
    event_engineer: Worker<EventEngineer>,
    combat_system: Worker<CombatSystem>,
    asset_manager: Worker<AssetManager>,
    tester: Tester,
}

impl Roster {
    pub fn new(tools: Tools) -> Self {
        Self::build(tools, None, DEFAULT_PROGRESS_INCREMENT)
    }

    /// `plan` replaces the default initial batch when given.
    pub fn build(tools: Tools, plan: Option<Vec<Task>>, progress_increment: f64) -> Self {
        let coordinator = match plan {
            Some(plan) => Coordinator::new(tools.clone()).with_plan(plan),
            None => Coordinator::new(tools.clone()),
        };
        Self {
            coordinator,
            world_builder: Worker::new(WorldBuilder, tools.clone()).with_progress_increment(progress_increment),
            event_engineer: Worker::new(EventEngineer, tools.clone()).with_progress_increment(progress_increment),
            combat_system: Worker::new(CombatSystem, tools.clone()).with_progress_increment(progress_increment),
            asset_manager: Worker::new(AssetManager, tools.clone()).with_progress_increment(progress_increment),
            tester: Tester::new(tools),
        }
    }

    pub fn role(&self, kind: RoleKind) -> &dyn Role {
        match kind {
            RoleKind::Coordinator => &self.coordinator,
            RoleKind::WorldBuilder => &self.world_builder,
            RoleKind::EventEngineer => &self.event_engineer,
            RoleKind::CombatSystem => &self.combat_system,
            RoleKind::AssetManager => &self.asset_manager,
            RoleKind::Tester => &self.tester,
        }
    }

    pub fn dispatch(&self, kind: RoleKind, state: &mut WorkflowState) {
        self.role(kind).process(state);
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmz_store::InMemoryRecordStore;
    use std::sync::Arc;

    #[test]
    fn every_role_has_an_implementation() {
        let roster = Roster::new(Tools::new(Arc::new(InMemoryRecordStore::new())));
        for kind in RoleKind::ALL {
            assert_eq!(roster.role(kind).kind(), kind);
        }
    }
}
