pub mod config;
pub mod doctor;
pub mod engine;
pub mod plan;
pub mod runner;
pub mod scenario;
pub mod summary;

pub use config::*;
pub use doctor::*;
pub use engine::*;
pub use plan::*;
pub use runner::*;
pub use summary::*;

#[cfg(test)]
mod fixture_tests {
    use std::path::Path;

    #[test]
    fn loads_jrpg_opening_plan() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/plans/jrpg-opening.yaml");
        let tasks = crate::load_plan(&path).unwrap();
        assert_eq!(tasks.len(), 7);
        let queued = crate::queue_order(tasks);
        let order: Vec<&str> = queued.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "create_starting_town",
                "create_intro_cutscene",
                "create_shopkeeper",
                "create_slime",
                "create_first_battle",
                "create_fire",
                "create_aria",
            ]
        );
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::scenario::*;
    use rmz_core::RoleKind;
    use std::path::Path;

    fn run(dir: &str) -> ScenarioResult {
        let p = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/scenarios").join(dir);
        let exp = load_expected(&p).unwrap();
        let res = simulate(&p).unwrap();
        if let Err(e) = check(&exp.expect, &res) {
            panic!("{dir}: {e}");
        }
        res
    }

    #[test]
    fn scenario_sc_a_single_map() {
        let res = run("SC-A-single-map");
        assert_eq!(res.selections.len(), 2);
        assert_eq!(res.state.game_document.locations[0].id, Some(1));
    }

    #[test]
    fn scenario_sc_b_dependency_order() {
        let res = run("SC-B-dependency-order");
        let cutscene = &res.state.game_document.cutscenes[0];
        assert_eq!(cutscene.lines.len(), 2);
        assert_eq!(cutscene.location_id, 1);
    }

    #[test]
    fn scenario_sc_c_store_failure_keeps_running() {
        let res = run("SC-C-store-failure");
        // the failed task is still queued, so the whole budget is spent
        assert_eq!(res.selections.len(), 6);
        assert_eq!(res.selections[5], RoleKind::Tester);
        assert!(res.summary.failed[0].error.contains("maps"));
    }

    #[test]
    fn scenario_sc_d_unsatisfiable_dependencies_terminate() {
        let res = run("SC-D-unsatisfiable");
        assert_eq!(res.selections.len(), 8);
        assert!(res.selections[2..].iter().all(|r| *r == RoleKind::Coordinator));
    }
}
