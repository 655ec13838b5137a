use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rmz_core::{Task, TaskKind};
use serde::{Deserialize, Serialize};

/// Initial task batch, as written in a plan YAML file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanFile {
    pub tasks: Vec<PlanTask>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanTask {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}

fn default_priority() -> i32 {
    1
}

pub fn load_plan(path: &Path) -> Result<Vec<Task>> {
    let s = std::fs::read_to_string(path).with_context(|| format!("read plan: {}", path.display()))?;
    parse_plan(&s).with_context(|| format!("plan {}", path.display()))
}

pub fn parse_plan(yaml: &str) -> Result<Vec<Task>> {
    let plan: PlanFile = serde_yaml::from_str(yaml).with_context(|| "parse plan yaml")?;
    validate_plan(&plan)?;
    plan.into_tasks()
}

pub fn validate_plan(plan: &PlanFile) -> Result<()> {
    if plan.tasks.is_empty() {
        return Err(anyhow!("plan has no tasks"));
    }
    let mut seen = BTreeSet::new();
    for task in &plan.tasks {
        if task.id.trim().is_empty() {
            return Err(anyhow!("plan task with empty id"));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(anyhow!("duplicate task id `{}` in plan", task.id));
        }
        task.kind.parse::<TaskKind>().with_context(|| format!("task `{}`", task.id))?;
    }
    Ok(())
}

impl PlanFile {
    pub fn into_tasks(self) -> Result<Vec<Task>> {
        self.tasks
            .into_iter()
            .map(|p| -> Result<Task> {
                let kind: TaskKind = p.kind.parse().with_context(|| format!("task `{}`", p.id))?;
                let mut task = Task::new(p.id, kind, p.description)
                    .with_priority(p.priority)
                    .with_dependencies(p.dependencies);
                task.data = p.data;
                Ok(task)
            })
            .collect()
    }
}

/// The order the coordinator will queue `tasks` in.
pub fn queue_order(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|t| t.priority);
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_and_data() {
        let tasks = parse_plan(
            r#"
tasks:
  - id: create_harbor
    kind: map_creation
    data: { width: 30, height: 20 }
  - id: create_harbor_intro
    kind: cutscene_creation
    priority: 2
    dependencies: [create_harbor, create_harbor]
"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].priority, 1);
        assert_eq!(tasks[0].data_u32("width"), Some(30));
        assert_eq!(tasks[1].dependencies.len(), 1);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = parse_plan("tasks:\n  - id: x\n    kind: music_creation\n").unwrap_err();
        assert!(format!("{err:#}").contains("music_creation"));
    }

    #[test]
    fn rejects_duplicates_and_empty_plans() {
        assert!(parse_plan("tasks: []\n").is_err());
        let dup = "tasks:\n  - id: a\n    kind: map_creation\n  - id: a\n    kind: skill_creation\n";
        assert!(parse_plan(dup).unwrap_err().to_string().contains("duplicate"));
    }
}
