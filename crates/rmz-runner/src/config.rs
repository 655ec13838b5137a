use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub project: ProjectConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub plan: PlanConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Relative to the project root unless absolute; `~` is expanded.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_progress_increment")]
    pub progress_increment: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_steps: default_max_steps(), progress_increment: default_progress_increment() }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanConfig {
    #[serde(default)]
    pub path: Option<String>,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_max_steps() -> usize {
    20
}

fn default_progress_increment() -> f64 {
    rmz_agents::DEFAULT_PROGRESS_INCREMENT
}

impl Config {
    pub fn default_for_project(title: &str) -> Self {
        Self {
            project: ProjectConfig {
                title: title.to_string(),
                description: String::new(),
                data_dir: default_data_dir(),
            },
            engine: EngineConfig::default(),
            plan: PlanConfig::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| "parse rmz.toml")?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn data_dir(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.project.data_dir)
    }

    pub fn plan_path(&self, project_root: &Path) -> Option<PathBuf> {
        self.plan.path.as_deref().map(|p| resolve(project_root, p))
    }

    pub fn rmz_dir(project_root: &Path) -> PathBuf {
        project_root.join(".rmz")
    }

    pub fn config_path(project_root: &Path) -> PathBuf {
        Self::rmz_dir(project_root).join("rmz.toml")
    }

    pub fn state_path(project_root: &Path) -> PathBuf {
        Self::rmz_dir(project_root).join("state.json")
    }

    pub fn summary_path(project_root: &Path) -> PathBuf {
        Self::rmz_dir(project_root).join("summary.json")
    }
}

fn resolve(project_root: &Path, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).to_string());
    if expanded.is_absolute() {
        expanded
    } else {
        project_root.join(expanded)
    }
}
