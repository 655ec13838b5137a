use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One line of an event's command list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventCommand {
    pub code: u32,
    #[serde(default)]
    pub indent: u32,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl EventCommand {
    pub fn new(code: u32, parameters: Vec<Value>) -> Self {
        Self { code, indent: 0, parameters }
    }

    pub fn indented(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    ActionButton = 0,
    PlayerTouch = 1,
    EventTouch = 2,
    Autorun = 3,
    Parallel = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableOp {
    Set = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Mod = 5,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub conditions: Value,
    pub image: Value,
    pub move_type: u32,
    pub move_speed: u32,
    pub move_frequency: u32,
    pub move_route: Value,
    pub walk_anime: bool,
    pub step_anime: bool,
    pub direction_fix: bool,
    pub through: bool,
    pub priority_type: u32,
    pub trigger: u32,
    pub list: Vec<EventCommand>,
}

impl Default for EventPage {
    fn default() -> Self {
        Self {
            conditions: json!({
                "actorId": 1, "actorValid": false,
                "itemId": 1, "itemValid": false,
                "selfSwitchCh": "A", "selfSwitchValid": false,
                "switch1Id": 1, "switch1Valid": false,
                "switch2Id": 1, "switch2Valid": false,
                "variableId": 1, "variableValid": false, "variableValue": 0
            }),
            image: json!({
                "characterIndex": 0, "characterName": "",
                "direction": 2, "pattern": 1, "tileId": 0
            }),
            move_type: 0,
            move_speed: 3,
            move_frequency: 3,
            move_route: json!({
                "list": [{"code": 0, "parameters": []}],
                "repeat": true, "skippable": false, "wait": false
            }),
            walk_anime: true,
            step_anime: false,
            direction_fix: false,
            through: false,
            priority_type: 1,
            trigger: Trigger::ActionButton as u32,
            list: vec![end_of_list(0)],
        }
    }
}

impl EventPage {
    /// A page running `commands`; the terminating end command is appended.
    pub fn with_commands(trigger: Trigger, mut commands: Vec<EventCommand>) -> Self {
        commands.push(end_of_list(0));
        Self { trigger: trigger as u32, list: commands, ..Self::default() }
    }
}

/// Show Text header (101). Text lines follow as separate 401 commands.
pub fn show_text(face_name: &str, face_index: u32, speaker: &str) -> EventCommand {
    EventCommand::new(101, vec![json!(face_name), json!(face_index), json!(0), json!(2), json!(speaker)])
}

pub fn text_line(text: &str) -> EventCommand {
    EventCommand::new(401, vec![json!(text)])
}

/// Show Text header followed by one 401 per line.
pub fn message(face_name: &str, face_index: u32, speaker: &str, lines: &[String]) -> Vec<EventCommand> {
    let mut out = vec![show_text(face_name, face_index, speaker)];
    out.extend(lines.iter().map(|l| text_line(l)));
    out
}

/// Show Choices (102) with an empty branch per choice and, when `cancel_type`
/// is non-zero, a cancel branch. Closed by 404.
pub fn show_choices(choices: &[&str], cancel_type: i32) -> Vec<EventCommand> {
    let mut out = vec![EventCommand::new(102, vec![json!(choices), json!(cancel_type), json!(0), json!(2), json!(0)])];
    for (i, choice) in choices.iter().enumerate() {
        out.push(EventCommand::new(402, vec![json!(i), json!(choice)]));
        out.push(end_of_list(1));
    }
    if cancel_type > 0 {
        out.push(EventCommand::new(403, vec![json!(6), Value::Null]));
        out.push(end_of_list(1));
    }
    out.push(EventCommand::new(404, vec![]));
    out
}

pub fn change_switch(switch_id: u32, on: bool) -> EventCommand {
    // 0 = ON, 1 = OFF
    EventCommand::new(121, vec![json!(switch_id), json!(switch_id), json!(if on { 0 } else { 1 })])
}

pub fn change_variable(variable_id: u32, op: VariableOp, value: i64) -> EventCommand {
    EventCommand::new(122, vec![json!(variable_id), json!(variable_id), json!(op as u32), json!(0), json!(value)])
}

/// Conditional Branch (111). `kind`: 0 = switch, 1 = variable, 2 = self switch, ...
pub fn conditional_branch(kind: u32, param1: Value, param2: Value) -> EventCommand {
    EventCommand::new(111, vec![json!(kind), param1, param2])
}

pub fn else_branch() -> EventCommand {
    EventCommand::new(411, vec![])
}

pub fn end_branch() -> EventCommand {
    EventCommand::new(412, vec![])
}

pub fn end_of_list(indent: u32) -> EventCommand {
    EventCommand::new(0, vec![]).indented(indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_close_every_branch() {
        let cmds = show_choices(&["Yes", "No"], 1);
        let codes: Vec<u32> = cmds.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec![102, 402, 0, 402, 0, 403, 0, 404]);
        assert_eq!(cmds[2].indent, 1);
        assert_eq!(cmds[3].parameters, vec![json!(1), json!("No")]);
    }

    #[test]
    fn page_list_is_terminated() {
        let page = EventPage::with_commands(Trigger::Autorun, message("", 0, "Guide", &["Welcome".into()]));
        assert_eq!(page.trigger, 3);
        assert_eq!(page.list.iter().map(|c| c.code).collect::<Vec<_>>(), vec![101, 401, 0]);
        let v = serde_json::to_value(&page).unwrap();
        assert!(v.get("moveSpeed").is_some());
        assert!(v.get("move_speed").is_none());
    }

    #[test]
    fn switch_uses_inverted_flag() {
        assert_eq!(change_switch(4, true).parameters[2], json!(0));
        assert_eq!(change_switch(4, false).parameters[2], json!(1));
        assert_eq!(change_variable(2, VariableOp::Add, 5).parameters[2], json!(1));
    }

    #[test]
    fn switch_branch_brackets() {
        // switch 3 is ON
        let cmds = [conditional_branch(0, json!(3), json!(0)), else_branch(), end_branch()];
        let codes: Vec<u32> = cmds.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec![111, 411, 412]);
        assert_eq!(cmds[0].parameters, vec![json!(0), json!(3), json!(0)]);
        assert!(cmds[1].parameters.is_empty());
        assert!(cmds[2].parameters.is_empty());
        assert!(cmds.iter().all(|c| c.indent == 0));
    }
}
