use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use rmz_agents::{Roster, Tools};
use rmz_core::{RoleKind, Stage, WorkflowState};
use rmz_store::{Family, InMemoryRecordStore};
use serde::Deserialize;

use crate::{engine::Engine, plan::load_plan, summary::RunSummary};

#[derive(Debug, Deserialize)]
pub struct ScenarioExpected {
    pub scenario_id: String,
    pub max_steps: usize,
    /// Record families that reject every read and write.
    #[serde(default)]
    pub fail_families: Vec<String>,
    pub expect: ScenarioExpectations,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioExpectations {
    pub stage: Stage,
    #[serde(default)]
    pub completed: Vec<String>,
    #[serde(default)]
    pub failed: Vec<String>,
    #[serde(default)]
    pub pending: Vec<String>,
    /// Leading role selections; later steps are unconstrained.
    #[serde(default)]
    pub first_roles: Vec<RoleKind>,
    pub progress_percent: u32,
}

#[derive(Debug)]
pub struct ScenarioResult {
    pub summary: RunSummary,
    pub selections: Vec<RoleKind>,
    pub state: WorkflowState,
}

pub fn load_expected(dir: &Path) -> Result<ScenarioExpected> {
    let p = dir.join("expected.yaml");
    let s = std::fs::read_to_string(&p).with_context(|| format!("read expected.yaml: {}", p.display()))?;
    let exp: ScenarioExpected = serde_yaml::from_str(&s).with_context(|| "parse expected.yaml")?;
    Ok(exp)
}

/// Run `plan.yaml` from a fixture directory against an in-memory store with
/// the failures `expected.yaml` asks for.
pub fn simulate(dir: &Path) -> Result<ScenarioResult> {
    let exp = load_expected(dir)?;
    let plan = load_plan(&dir.join("plan.yaml"))?;

    let store = Arc::new(InMemoryRecordStore::new());
    for name in &exp.fail_families {
        store.fail_family(parse_family(name)?);
    }

    let engine = Engine::new(Roster::build(Tools::new(store), Some(plan), rmz_agents::DEFAULT_PROGRESS_INCREMENT));
    let report = engine.run(WorkflowState::new(exp.scenario_id.clone(), ""), exp.max_steps);
    Ok(ScenarioResult { summary: RunSummary::from_report(&report), selections: report.selections, state: report.state })
}

/// Compare a result against its fixture's expectations.
pub fn check(exp: &ScenarioExpectations, res: &ScenarioResult) -> Result<()> {
    let ids = |v: &[rmz_core::TaskId]| v.iter().map(|t| t.as_str().to_string()).collect::<Vec<_>>();
    let s = &res.summary;
    if s.stage != exp.stage {
        return Err(anyhow!("stage: expected {}, got {}", exp.stage, s.stage));
    }
    if ids(&s.completed) != exp.completed {
        return Err(anyhow!("completed: expected {:?}, got {:?}", exp.completed, ids(&s.completed)));
    }
    let failed: Vec<String> = s.failed.iter().map(|f| f.id.as_str().to_string()).collect();
    if failed != exp.failed {
        return Err(anyhow!("failed: expected {:?}, got {:?}", exp.failed, failed));
    }
    if ids(&s.pending) != exp.pending {
        return Err(anyhow!("pending: expected {:?}, got {:?}", exp.pending, ids(&s.pending)));
    }
    if !res.selections.starts_with(&exp.first_roles) {
        return Err(anyhow!("route: expected prefix {:?}, got {:?}", exp.first_roles, res.selections));
    }
    if s.progress_percent != exp.progress_percent {
        return Err(anyhow!("progress: expected {}%, got {}%", exp.progress_percent, s.progress_percent));
    }
    Ok(())
}

fn parse_family(name: &str) -> Result<Family> {
    Ok(match name {
        "maps" => Family::Maps,
        "actors" => Family::Actors,
        "classes" => Family::Classes,
        "skills" => Family::Skills,
        "enemies" => Family::Enemies,
        "troops" => Family::Troops,
        "common_events" => Family::CommonEvents,
        other => return Err(anyhow!("unknown record family `{other}`")),
    })
}
