use rmz_core::{GameDocument, RoleKind, RoleState, Task, TaskKind};
use rmz_store::MapSpec;
use serde_json::{json, Value};

use crate::{
    error::ActionError,
    worker::{param_u32, records, ActionContext, DomainAction, Records},
};

/// Turns locations into maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorldBuilder;

impl DomainAction for WorldBuilder {
    fn role(&self) -> RoleKind {
        RoleKind::WorldBuilder
    }

    fn details(&self, _task: &Task, doc: &GameDocument, scratch: &RoleState) -> Value {
        let names: Vec<&str> = doc.locations.iter().map(|l| l.name.as_str()).collect();
        json!({ "existing_locations": names, "maps_created": scratch.scratch_ids("maps_created") })
    }

    fn execute(&self, task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
        if task.kind != TaskKind::MapCreation {
            return Err(ActionError::Unsupported { role: self.role(), kind: task.kind });
        }

        let resolved = ctx.document.resolve_location(&task.entity_name());
        let location = resolved.entity;
        if resolved.created {
            ctx.stubs.push(("location", location.name.clone()));
            location.width = param_u32(task, "width", location.width);
            location.height = param_u32(task, "height", location.height);
            location.tileset_id = param_u32(task, "tileset_id", location.tileset_id);
            if let Some(description) = task.data_str("description") {
                location.description = description.to_string();
            }
        }

        // a location keeps the first map built for it
        if let Some(map_id) = location.id {
            return Ok(records([("map_id", map_id)]));
        }

        let spec = MapSpec {
            name: location.name.clone(),
            width: location.width,
            height: location.height,
            tileset_id: location.tileset_id,
        };
        let map_id = ctx.store.create_map(&spec)?;
        location.id = Some(map_id);
        ctx.scratch.push_scratch("maps_created", map_id);
        Ok(records([("map_id", map_id)]))
    }
}
