use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rmz_agents::{Roster, Tools};
use rmz_core::WorkflowState;
use rmz_store::{InMemoryRecordStore, JsonRecordStore, RecordStore};
use tracing::info;

use crate::{doctor::doctor, engine::Engine, plan::load_plan, summary::RunSummary, Config};

/// Per-invocation overrides on top of `rmz.toml`.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub max_steps: Option<usize>,
    pub plan: Option<PathBuf>,
    /// Write records to memory instead of the data directory.
    pub dry_run: bool,
}

pub struct Runner {
    pub project_root: PathBuf,
    pub cfg: Config,
    store: Option<Arc<dyn RecordStore>>,
}

impl Runner {
    pub fn open(project_root: PathBuf) -> Result<Self> {
        let cfg = load_or_create_config(&project_root)?;
        Ok(Self { project_root, cfg, store: None })
    }

    /// Use `store` for every run instead of the configured data directory.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Create `.rmz/rmz.toml` if needed and check the project is runnable.
    pub fn init_project(project_root: &Path) -> Result<Config> {
        let cfg = load_or_create_config(project_root)?;
        doctor(project_root, &cfg)?;
        Ok(cfg)
    }

    pub fn doctor(&self) -> Result<()> {
        doctor(&self.project_root, &self.cfg)
    }

    pub fn run(&self, opts: &RunOptions) -> Result<RunSummary> {
        let title = opts.title.clone().unwrap_or_else(|| self.cfg.project.title.clone());
        let description = opts.description.clone().unwrap_or_else(|| self.cfg.project.description.clone());
        let max_steps = opts.max_steps.unwrap_or(self.cfg.engine.max_steps);

        let plan_path = opts.plan.clone().or_else(|| self.cfg.plan_path(&self.project_root));
        let plan = plan_path.as_deref().map(load_plan).transpose()?;

        let store = self.store_for(opts)?;
        let roster = Roster::build(Tools::new(store), plan, self.cfg.engine.progress_increment);
        let engine = Engine::new(roster);

        info!(title = %title, max_steps, dry_run = opts.dry_run, "run starting");
        let report = engine.run(WorkflowState::new(title, description), max_steps);
        let summary = RunSummary::from_report(&report);

        self.persist(&report.state, &summary)?;
        info!(steps = report.steps, stage = %report.state.stage, progress = report.state.progress, "run finished");
        Ok(summary)
    }

    pub fn load_state(&self) -> Result<WorkflowState> {
        let path = Config::state_path(&self.project_root);
        let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
    }

    /// Summary of the last run; rebuilt from the saved state if the summary file is gone.
    pub fn status(&self) -> Result<RunSummary> {
        let path = Config::summary_path(&self.project_root);
        if path.exists() {
            let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            return serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()));
        }
        Ok(RunSummary::from_state(&self.load_state()?, &[]))
    }

    fn store_for(&self, opts: &RunOptions) -> Result<Arc<dyn RecordStore>> {
        if let Some(store) = &self.store {
            return Ok(store.clone());
        }
        if opts.dry_run {
            return Ok(Arc::new(InMemoryRecordStore::new()));
        }
        let data_dir = self.cfg.data_dir(&self.project_root);
        let store = JsonRecordStore::open(&data_dir).with_context(|| "open record store")?;
        Ok(Arc::new(store))
    }

    fn persist(&self, state: &WorkflowState, summary: &RunSummary) -> Result<()> {
        let dir = Config::rmz_dir(&self.project_root);
        std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

        let state_path = Config::state_path(&self.project_root);
        std::fs::write(&state_path, serde_json::to_vec_pretty(state)?)
            .with_context(|| format!("write {}", state_path.display()))?;
        let summary_path = Config::summary_path(&self.project_root);
        std::fs::write(&summary_path, serde_json::to_vec_pretty(summary)?)
            .with_context(|| format!("write {}", summary_path.display()))?;
        Ok(())
    }
}

/// Load `.rmz/rmz.toml`, writing the default config first if there is none.
fn load_or_create_config(project_root: &Path) -> Result<Config> {
    let cfg_path = Config::config_path(project_root);
    if cfg_path.exists() {
        return Config::load_from(&cfg_path);
    }
    let cfg = Config::default_for_project(&project_title(project_root));
    cfg.save_to(&cfg_path)?;
    Ok(cfg)
}

fn project_title(project_root: &Path) -> String {
    project_root.file_name().and_then(|s| s.to_str()).unwrap_or("Untitled Game").to_string()
}
