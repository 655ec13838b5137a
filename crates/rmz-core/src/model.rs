use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Task lifecycle: `Pending -> InProgress -> {Completed, Failed}`.
/// Completed and Failed are terminal; a retry is a new task with a fresh id.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Completed)
                | (TaskStatus::InProgress, TaskStatus::Failed)
        )
    }
}

/// Closed set of task kinds. Every kind maps to exactly one worker role.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    MapCreation,
    EventCreation,
    CutsceneCreation,
    DialogueCreation,
    SkillCreation,
    EnemyCreation,
    TroopCreation,
    AssetManagement,
}

impl TaskKind {
    pub const ALL: [TaskKind; 8] = [
        TaskKind::MapCreation,
        TaskKind::EventCreation,
        TaskKind::CutsceneCreation,
        TaskKind::DialogueCreation,
        TaskKind::SkillCreation,
        TaskKind::EnemyCreation,
        TaskKind::TroopCreation,
        TaskKind::AssetManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::MapCreation => "map_creation",
            TaskKind::EventCreation => "event_creation",
            TaskKind::CutsceneCreation => "cutscene_creation",
            TaskKind::DialogueCreation => "dialogue_creation",
            TaskKind::SkillCreation => "skill_creation",
            TaskKind::EnemyCreation => "enemy_creation",
            TaskKind::TroopCreation => "troop_creation",
            TaskKind::AssetManagement => "asset_management",
        }
    }

    /// Kind -> role lookup table used by the router and by workers.
    pub fn role(&self) -> RoleKind {
        match self {
            TaskKind::MapCreation => RoleKind::WorldBuilder,
            TaskKind::EventCreation | TaskKind::CutsceneCreation | TaskKind::DialogueCreation => {
                RoleKind::EventEngineer
            }
            TaskKind::SkillCreation | TaskKind::EnemyCreation | TaskKind::TroopCreation => RoleKind::CombatSystem,
            TaskKind::AssetManagement => RoleKind::AssetManager,
        }
    }
}

impl FromStr for TaskKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s.trim();
        TaskKind::ALL
            .into_iter()
            .find(|k| k.as_str() == n)
            .ok_or_else(|| CoreError::UnknownTaskKind(n.to_string()))
    }
}

/// Participant identities. The coordinator owns the queue, the rest are workers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Coordinator,
    WorldBuilder,
    EventEngineer,
    CombatSystem,
    AssetManager,
    Tester,
}

impl RoleKind {
    pub const ALL: [RoleKind; 6] = [
        RoleKind::Coordinator,
        RoleKind::WorldBuilder,
        RoleKind::EventEngineer,
        RoleKind::CombatSystem,
        RoleKind::AssetManager,
        RoleKind::Tester,
    ];

    /// Stable role id, also used as `assigned_to` on tasks.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Coordinator => "coordinator",
            RoleKind::WorldBuilder => "world_builder",
            RoleKind::EventEngineer => "event_engineer",
            RoleKind::CombatSystem => "combat_system",
            RoleKind::AssetManager => "asset_manager",
            RoleKind::Tester => "tester",
        }
    }

    pub fn is_worker(&self) -> bool {
        !matches!(self, RoleKind::Coordinator)
    }

    pub fn handles(&self, kind: TaskKind) -> bool {
        kind.role() == *self
    }
}

impl FromStr for RoleKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s.trim();
        RoleKind::ALL
            .into_iter()
            .find(|r| r.as_str() == n)
            .ok_or_else(|| CoreError::UnknownRole(n.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Planning,
    Implementation,
    Testing,
    Refinement,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Planning => "planning",
            Stage::Implementation => "implementation",
            Stage::Testing => "testing",
            Stage::Refinement => "refinement",
        }
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "planning" => Ok(Stage::Planning),
            "implementation" => Ok(Stage::Implementation),
            "testing" => Ok(Stage::Testing),
            "refinement" => Ok(Stage::Refinement),
            other => Err(CoreError::UnknownStage(other.to_string())),
        }
    }
}

macro_rules! display_as_str {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(TaskStatus, TaskKind, RoleKind, Stage);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_only_moves_forward() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::InProgress));
    }

    #[test]
    fn kind_table_routes_to_workers() {
        assert_eq!(TaskKind::MapCreation.role(), RoleKind::WorldBuilder);
        assert_eq!(TaskKind::CutsceneCreation.role(), RoleKind::EventEngineer);
        assert_eq!(TaskKind::DialogueCreation.role(), RoleKind::EventEngineer);
        assert_eq!(TaskKind::TroopCreation.role(), RoleKind::CombatSystem);
        assert_eq!(TaskKind::AssetManagement.role(), RoleKind::AssetManager);
        for kind in TaskKind::ALL {
            assert!(kind.role().is_worker());
            assert_ne!(kind.role(), RoleKind::Tester);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!("map_creation".parse::<TaskKind>().unwrap(), TaskKind::MapCreation);
        assert_eq!(
            "character_setup".parse::<TaskKind>(),
            Err(CoreError::UnknownTaskKind("character_setup".into()))
        );
    }

    #[test]
    fn names_round_trip_through_serde() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let role: RoleKind = serde_json::from_str("\"world_builder\"").unwrap();
        assert_eq!(role, RoleKind::WorldBuilder);
        assert_eq!(Stage::Testing.to_string(), "testing");
    }
}
