use rmz_store::{
    message, EnemySpec, EventPage, EventSpec, Family, InMemoryRecordStore, JsonRecordStore, MapSpec, RecordFile,
    RecordStore, SkillSpec, StoreError, Trigger,
};
use serde_json::{json, Value};
use tempfile::tempdir;

fn town() -> MapSpec {
    MapSpec { name: "Starting Town".into(), width: 20, height: 15, tileset_id: 1 }
}

fn greeting() -> EventSpec {
    EventSpec {
        name: "Intro".into(),
        x: 5,
        y: 5,
        pages: vec![EventPage::with_commands(Trigger::Autorun, message("", 0, "Guide", &["Welcome!".into()]))],
    }
}

#[test]
fn json_store_creates_map_and_event() {
    let dir = tempdir().unwrap();
    let store = JsonRecordStore::open(dir.path()).unwrap();

    let map_id = store.create_map(&town()).unwrap();
    assert_eq!(map_id, 1);
    assert!(dir.path().join("Map001.json").exists());

    let infos: Value = serde_json::from_str(&std::fs::read_to_string(dir.path().join("MapInfos.json")).unwrap()).unwrap();
    assert_eq!(infos["1"]["name"], json!("Starting Town"));

    let event_id = store.create_event(map_id, &greeting()).unwrap();
    assert_eq!(event_id, 1);
    let map = store.get_map(map_id).unwrap();
    assert_eq!(map["width"], json!(20));
    assert_eq!(map["data"].as_array().unwrap().len(), 20 * 15 * 6);
    assert_eq!(map["events"][1]["pages"][0]["trigger"], json!(3));
    assert_eq!(map["events"][1]["x"], json!(5));

    // the map file was overwritten, so its previous version is kept
    assert!(dir.path().join("Map001.json.bak").exists());
}

#[test]
fn event_on_missing_map_fails() {
    let store = InMemoryRecordStore::new();
    let err = store.create_event(7, &greeting()).unwrap_err();
    assert!(matches!(err, StoreError::MapNotFound(7)));
    assert!(store.read(&RecordFile::Map(7)).unwrap().is_none());
}

#[test]
fn ids_continue_from_existing_records() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("Enemies.json"), r#"[null, {"id": 1, "name": "Bat"}, {"id": 2, "name": "Rat"}]"#)
        .unwrap();
    let store = JsonRecordStore::open(dir.path()).unwrap();
    let spec = EnemySpec { name: "Slime".into(), max_hp: 100, attack: 10, defense: 10, gold: 10, exp: 10 };
    assert_eq!(store.create_enemy(&spec).unwrap(), 3);
    let troop = store.create_troop("Slimes", &[3, 3]).unwrap();
    assert_eq!(troop, 1);

    let troops = store.read(&RecordFile::Troops).unwrap().unwrap();
    assert_eq!(troops[1]["members"].as_array().unwrap().len(), 2);
}

#[test]
fn malformed_family_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("Skills.json"), "{ not json").unwrap();
    let store = JsonRecordStore::open(dir.path()).unwrap();
    let spec = SkillSpec {
        name: "Fire".into(),
        description: String::new(),
        mp_cost: 5,
        damage_type: 1,
        formula: "a.atk * 4 - b.def * 2".into(),
        icon_index: 64,
    };
    assert!(matches!(store.create_skill(&spec), Err(StoreError::Malformed { .. })));
    // the broken file is left as it was
    assert_eq!(std::fs::read_to_string(dir.path().join("Skills.json")).unwrap(), "{ not json");
}

#[test]
fn memory_store_fault_injection_per_family() {
    let store = InMemoryRecordStore::new();
    store.fail_family(Family::Maps);
    assert!(matches!(store.create_map(&town()), Err(StoreError::Unavailable(Family::Maps))));
    let class_id = store.create_class("Hero").unwrap();
    assert_eq!(store.create_actor("Aria", class_id, 1).unwrap(), 1);
    let actors = store.read(&RecordFile::Actors).unwrap().unwrap();
    assert_eq!(actors[1]["classId"], json!(class_id));
}

#[test]
fn failed_map_write_leaves_no_map_info() {
    let dir = tempdir().unwrap();
    // a directory where the map file should go makes that write fail
    std::fs::create_dir(dir.path().join("Map001.json")).unwrap();
    let store = JsonRecordStore::open(dir.path()).unwrap();

    assert!(matches!(store.create_map(&town()), Err(StoreError::Io { .. })));
    let infos = store.read(&RecordFile::MapInfos).unwrap().unwrap();
    assert_eq!(infos, json!({}));
}
