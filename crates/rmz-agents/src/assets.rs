use rmz_core::{CharacterType, GameDocument, RoleKind, RoleState, Task, TaskKind};
use serde_json::{json, Map, Value};

use crate::{
    error::ActionError,
    worker::{param_u32, ActionContext, DomainAction, Records},
};

/// Registers characters as playable actors, creating a class when needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetManager;

impl DomainAction for AssetManager {
    fn role(&self) -> RoleKind {
        RoleKind::AssetManager
    }

    fn details(&self, _task: &Task, doc: &GameDocument, scratch: &RoleState) -> Value {
        let unregistered: Vec<&str> =
            doc.characters.iter().filter(|c| c.id.is_none()).map(|c| c.name.as_str()).collect();
        json!({
            "unregistered_characters": unregistered,
            "asset_mappings": scratch.working_data.get("asset_mappings").cloned().unwrap_or(Value::Null),
        })
    }

    fn execute(&self, task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
        if task.kind != TaskKind::AssetManagement {
            return Err(ActionError::Unsupported { role: self.role(), kind: task.kind });
        }

        let resolved = ctx.document.resolve_character(&task.entity_name(), CharacterType::Player);
        let character = resolved.entity;
        if resolved.created {
            ctx.stubs.push(("character", character.name.clone()));
            character.level = param_u32(task, "level", character.level);
        }

        let mut out = Records::new();
        let class_id = match character.class_id {
            Some(id) => id,
            None => {
                let class_name = task.data_str("class").map(str::to_string).unwrap_or_else(|| format!("{} Class", character.name));
                let id = ctx.store.create_class(&class_name)?;
                character.class_id = Some(id);
                out.insert("class_id".to_string(), id);
                id
            }
        };
        let actor_id = ctx.store.create_actor(&character.name, class_id, character.level)?;
        character.id = Some(actor_id);
        out.insert("actor_id".to_string(), actor_id);

        let mappings = ctx
            .scratch
            .working_data
            .entry("asset_mappings".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = mappings {
            map.insert(character.name.clone(), json!(actor_id));
        }
        Ok(out)
    }
}
