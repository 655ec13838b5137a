use rmz_core::{title_case, GameDocument, RoleKind, RoleState, Task, TaskKind};
use rmz_store::{message, show_choices, EventPage, EventSpec, Trigger};
use serde_json::{json, Value};

use crate::{
    error::ActionError,
    worker::{param_lines, param_u32, records, ActionContext, DomainAction, Records},
};

const DEFAULT_X: u32 = 5;
const DEFAULT_Y: u32 = 5;

/// Places events, cutscenes and dialogue on maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventEngineer;

impl DomainAction for EventEngineer {
    fn role(&self) -> RoleKind {
        RoleKind::EventEngineer
    }

    fn details(&self, _task: &Task, doc: &GameDocument, scratch: &RoleState) -> Value {
        let cutscenes: Vec<&str> = doc.cutscenes.iter().map(|c| c.name.as_str()).collect();
        json!({
            "cutscenes": cutscenes,
            "events_created": scratch.scratch_ids("events_created"),
            "first_map_id": doc.first_map_id(),
        })
    }

    fn execute(&self, task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
        match task.kind {
            TaskKind::CutsceneCreation => create_cutscene(task, ctx),
            TaskKind::EventCreation => create_event(task, ctx),
            TaskKind::DialogueCreation => create_dialogue(task, ctx),
            kind => Err(ActionError::Unsupported { role: RoleKind::EventEngineer, kind }),
        }
    }
}

fn create_cutscene(task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
    let resolved = ctx.document.resolve_cutscene(&task.entity_name());
    let cutscene = resolved.entity;
    if resolved.created {
        ctx.stubs.push(("cutscene", cutscene.name.clone()));
        cutscene.lines = param_lines(task, "lines");
        if let Some(map_id) = task.data_u32("map_id") {
            cutscene.location_id = map_id;
        }
    }
    if cutscene.lines.is_empty() {
        cutscene.lines.push(cutscene.description.clone());
    }

    let mut commands = message("", 0, "", &cutscene.lines);
    commands.extend(show_choices(&["Continue", "Skip"], 1));
    let spec = EventSpec {
        name: cutscene.name.clone(),
        x: param_u32(task, "x", DEFAULT_X),
        y: param_u32(task, "y", DEFAULT_Y),
        pages: vec![EventPage::with_commands(Trigger::Autorun, commands)],
    };
    let map_id = cutscene.location_id;
    let event_id = ctx.store.create_event(map_id, &spec)?;
    cutscene.id = Some(event_id);

    ctx.scratch.push_scratch("cutscenes_created", json!({"id": event_id, "map_id": map_id, "name": spec.name}));
    Ok(records([("event_id", event_id), ("map_id", map_id)]))
}

fn create_event(task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
    let map_id = task.data_u32("map_id").or_else(|| ctx.document.first_map_id()).unwrap_or(1);
    let mut lines = param_lines(task, "lines");
    if lines.is_empty() && !task.description.is_empty() {
        lines.push(task.description.clone());
    }
    let page = if lines.is_empty() {
        EventPage::default()
    } else {
        EventPage::with_commands(Trigger::ActionButton, message("", 0, "", &lines))
    };
    let spec = EventSpec {
        name: title_case(&task.entity_name()),
        x: param_u32(task, "x", DEFAULT_X),
        y: param_u32(task, "y", DEFAULT_Y),
        pages: vec![page],
    };
    let event_id = ctx.store.create_event(map_id, &spec)?;

    ctx.scratch.push_scratch("events_created", json!({"id": event_id, "map_id": map_id, "name": spec.name}));
    Ok(records([("event_id", event_id), ("map_id", map_id)]))
}

fn create_dialogue(task: &Task, ctx: &mut ActionContext<'_>) -> Result<Records, ActionError> {
    let speaker = task.data_str("speaker").map(str::to_string).unwrap_or_else(|| task.entity_name());
    let resolved = ctx.document.resolve_dialogue(&speaker);
    let dialogue = resolved.entity;
    if resolved.created {
        ctx.stubs.push(("dialogue", dialogue.speaker.clone()));
        let lines = param_lines(task, "lines");
        if !lines.is_empty() {
            dialogue.text = lines;
        }
    }

    let commands = message(&dialogue.face_name, dialogue.face_index, &dialogue.speaker, &dialogue.text);
    let name = format!("{} Dialogue", dialogue.speaker);
    let common_event_id = ctx.store.create_common_event(&name, 0, &commands)?;
    dialogue.id = Some(common_event_id);

    ctx.scratch.push_scratch("dialogue_created", common_event_id);
    Ok(records([("common_event_id", common_event_id)]))
}
