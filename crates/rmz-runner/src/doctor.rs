use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::{plan::load_plan, Config};

/// Check that a project can run: data directory present, engine settings
/// sane, plan file (if any) loadable.
pub fn doctor(project_root: &Path, cfg: &Config) -> Result<()> {
    let data_dir = cfg.data_dir(project_root);
    if !data_dir.is_dir() {
        return Err(anyhow!(
            "data directory {} not found; create it or set project.data_dir in {}",
            data_dir.display(),
            Config::config_path(project_root).display()
        ));
    }

    if cfg.engine.max_steps == 0 {
        return Err(anyhow!("engine.max_steps must be at least 1"));
    }
    let inc = cfg.engine.progress_increment;
    if !(inc > 0.0 && inc <= 1.0) {
        return Err(anyhow!("engine.progress_increment must be in (0, 1], got {inc}"));
    }

    if let Some(plan) = cfg.plan_path(project_root) {
        load_plan(&plan).with_context(|| "plan.path")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reports_missing_data_dir_and_bad_settings() {
        let dir = tempdir().unwrap();
        let mut cfg = Config::default_for_project("Epic");
        assert!(doctor(dir.path(), &cfg).unwrap_err().to_string().contains("data directory"));

        std::fs::create_dir(dir.path().join("data")).unwrap();
        doctor(dir.path(), &cfg).unwrap();

        cfg.engine.progress_increment = 0.0;
        assert!(doctor(dir.path(), &cfg).is_err());
        cfg.engine.progress_increment = 0.25;
        cfg.plan.path = Some("missing.yaml".into());
        assert!(doctor(dir.path(), &cfg).is_err());
    }
}
