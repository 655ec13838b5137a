use rmz_core::{title_case, CharacterType, GameDocument, RoleKind, RoleState, Task, TaskKind};
use rmz_store::{EnemySpec, SkillSpec};
use serde_json::{json, Value};

use crate::{
    error::ActionError,
    worker::{param_i64, param_u32, records, ActionContext, DomainAction, Records},
};

pub const DEFAULT_FORMULA: &str = "a.atk * 4 - b.def * 2";

/// Skills, enemies and troops.
#[derive(Clone, Copy, Debug, Default)]
pub struct CombatSystem;

impl DomainAction for CombatSystem {
    fn role(&self) -> RoleKind {
        RoleKind::CombatSystem
    }

    fn details(&self, _task: &Task, doc: &GameDocument, scratch: &RoleState) -> Value {
        let enemies: Vec<&str> = doc
            .characters
            .iter()
            .filter(|c| c.character_type == CharacterType::Enemy)
            .map(|c| c.name.as_str())
            .collect();
        json!({
            "enemies": enemies,
            "skills_created": scratch.scratch_ids("skills_created"),
            "troops_created": scratch.scratch_ids("troops_created"),
        })
    }

    fn execute(&self, task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
        match task.kind {
            TaskKind::SkillCreation => create_skill(task, ctx),
            TaskKind::EnemyCreation => create_enemy(task, ctx),
            TaskKind::TroopCreation => create_troop(task, ctx),
            kind => Err(ActionError::Unsupported { role: RoleKind::CombatSystem, kind }),
        }
    }
}

fn create_skill(task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
    let spec = SkillSpec {
        name: title_case(&task.entity_name()),
        description: task.data_str("description").unwrap_or(&task.description).to_string(),
        mp_cost: param_u32(task, "mp_cost", 5),
        damage_type: param_u32(task, "damage_type", 1),
        formula: task.data_str("formula").unwrap_or(DEFAULT_FORMULA).to_string(),
        icon_index: param_u32(task, "icon_index", 64),
    };
    let skill_id = ctx.store.create_skill(&spec)?;
    ctx.scratch.push_scratch("skills_created", skill_id);
    Ok(records([("skill_id", skill_id)]))
}

fn create_enemy(task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
    let resolved = ctx.document.resolve_character(&task.entity_name(), CharacterType::Enemy);
    let enemy = resolved.entity;
    if resolved.created {
        ctx.stubs.push(("character", enemy.name.clone()));
    }
    // explicit task data beats stats already on the character
    let stat = |key: &str, default: i64| param_i64(task, key, enemy.stats.get(key).copied().unwrap_or(default));
    let spec = EnemySpec {
        name: enemy.name.clone(),
        max_hp: stat("max_hp", 100),
        attack: stat("attack", 10),
        defense: stat("defense", 10),
        gold: stat("gold", 10),
        exp: stat("exp", 10),
    };
    let enemy_id = ctx.store.create_enemy(&spec)?;

    enemy.id = Some(enemy_id);
    for (key, value) in [
        ("max_hp", spec.max_hp),
        ("attack", spec.attack),
        ("defense", spec.defense),
        ("gold", spec.gold),
        ("exp", spec.exp),
    ] {
        enemy.stats.insert(key.to_string(), value);
    }
    ctx.scratch.push_scratch("enemies_created", enemy_id);
    Ok(records([("enemy_id", enemy_id)]))
}

fn create_troop(task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
    let created_so_far = ctx.scratch.scratch_ids("enemies_created");
    let resolved = ctx.document.resolve_battle(&task.entity_name());
    let battle = resolved.entity;
    if resolved.created {
        ctx.stubs.push(("battle", battle.name.clone()));
        if let Some(bg) = task.data_str("background") {
            battle.background = bg.to_string();
        }
    }
    if battle.enemies.is_empty() {
        battle.enemies = created_so_far;
    }
    let troop_id = ctx.store.create_troop(&battle.name, &battle.enemies)?;
    battle.troop_id = Some(troop_id);

    ctx.scratch.push_scratch("troops_created", troop_id);
    Ok(records([("troop_id", troop_id)]))
}
