//! Record shapes as the editor writes them, and id allocation inside a family.

use rmz_core::RecordId;
use serde_json::{json, Map, Value};

use crate::{
    commands::EventCommand,
    error::StoreError,
    traits::{EnemySpec, EventSpec, MapSpec, SkillSpec},
};

/// Largest gap an array family may have between its length and the next id.
/// Anything past it is treated as a corrupt id, not grown into.
const MAX_SLOT_GAP: usize = 1024;

/// Insert a record built by `build(id)` into `container`, allocating
/// `max(existing ids) + 1`.
///
/// Arrays are indexed by id (slot 0 stays `null`), objects are keyed by the
/// id as a string. A missing file (`Null`) starts as `[null]`.
pub fn insert_record(
    container: &mut Value,
    file: &str,
    build: impl FnOnce(RecordId) -> Value,
) -> Result<RecordId, StoreError> {
    if container.is_null() {
        *container = json!([null]);
    }
    match container {
        Value::Array(items) => {
            let id = next_id(file, items.iter().enumerate().filter(|(_, v)| !v.is_null()).map(|(i, v)| record_id(v, i)))?;
            let slot = id as usize;
            if slot > items.len() + MAX_SLOT_GAP {
                return Err(StoreError::IdOutOfRange { file: file.to_string(), id: u64::from(id) });
            }
            if items.len() <= slot {
                items.resize(slot + 1, Value::Null);
            }
            items[slot] = build(id);
            Ok(id)
        }
        Value::Object(entries) => {
            let id = next_id(file, entries.keys().filter_map(|k| k.parse::<RecordId>().ok()))?;
            entries.insert(id.to_string(), build(id));
            Ok(id)
        }
        _ => Err(StoreError::Shape { file: file.to_string(), expected: "an array or object of records" }),
    }
}

fn record_id(v: &Value, index: usize) -> RecordId {
    v.get("id")
        .and_then(Value::as_u64)
        .and_then(|id| RecordId::try_from(id).ok())
        .unwrap_or(index as RecordId)
}

fn next_id(file: &str, ids: impl Iterator<Item = RecordId>) -> Result<RecordId, StoreError> {
    match ids.max() {
        None => Ok(1),
        Some(m) => m
            .checked_add(1)
            .ok_or_else(|| StoreError::IdOutOfRange { file: file.to_string(), id: u64::from(m) }),
    }
}

pub fn map_info(id: RecordId, name: &str) -> Value {
    json!({
        "id": id,
        "expanded": false,
        "name": name,
        "order": id,
        "parentId": 0,
        "scrollX": 0,
        "scrollY": 0
    })
}

/// Blank map: every layer of every tile zeroed, no events yet.
pub fn map(spec: &MapSpec) -> Value {
    let tiles = (spec.width as usize) * (spec.height as usize) * 6;
    json!({
        "autoplayBgm": false,
        "autoplayBgs": false,
        "battleback1Name": "",
        "battleback2Name": "",
        "bgm": {"name": "", "pan": 0, "pitch": 100, "volume": 90},
        "disableDashing": false,
        "displayName": spec.name,
        "encounterList": [],
        "encounterStep": 30,
        "height": spec.height,
        "note": "",
        "parallaxName": "",
        "scrollType": 0,
        "specifyBattleback": false,
        "tilesetId": spec.tileset_id,
        "width": spec.width,
        "data": vec![0; tiles],
        "events": [null]
    })
}

pub fn event(id: RecordId, spec: &EventSpec) -> Value {
    json!({
        "id": id,
        "name": spec.name,
        "note": "",
        "pages": spec.pages,
        "x": spec.x,
        "y": spec.y
    })
}

pub fn actor(id: RecordId, name: &str, class_id: RecordId, level: u32) -> Value {
    json!({
        "id": id,
        "battlerName": "",
        "characterIndex": 0,
        "characterName": "",
        "classId": class_id,
        "equips": [0, 0, 0, 0, 0],
        "faceIndex": 0,
        "faceName": "",
        "traits": [],
        "initialLevel": level,
        "maxLevel": 99,
        "name": name,
        "nickname": "",
        "note": "",
        "profile": ""
    })
}

pub fn class(id: RecordId, name: &str) -> Value {
    json!({
        "id": id,
        "expParams": [30, 20, 30, 30],
        "traits": [],
        "learnings": [],
        "name": name,
        "note": "",
        // mhp, mmp, atk, def, mat, mdf, agi, luk at levels 1 and 99
        "params": [
            [450, 5000], [90, 1000], [15, 250], [15, 250],
            [15, 250], [15, 250], [15, 250], [15, 250]
        ]
    })
}

pub fn skill(id: RecordId, spec: &SkillSpec) -> Value {
    json!({
        "id": id,
        "animationId": -1,
        "damage": {
            "critical": false,
            "elementId": 0,
            "formula": spec.formula,
            "type": spec.damage_type,
            "variance": 20
        },
        "description": spec.description,
        "effects": [],
        "hitType": 1,
        "iconIndex": spec.icon_index,
        "message1": format!(" casts {}!", spec.name),
        "message2": "",
        "mpCost": spec.mp_cost,
        "name": spec.name,
        "note": "",
        "occasion": 1,
        "repeats": 1,
        "scope": 1,
        "speed": 0,
        "stypeId": 1,
        "successRate": 100,
        "tpCost": 0,
        "tpGain": 0
    })
}

pub fn enemy(id: RecordId, spec: &EnemySpec) -> Value {
    json!({
        "id": id,
        "actions": [{"conditionParam1": 0, "conditionParam2": 0, "conditionType": 0, "rating": 5, "skillId": 1}],
        "battlerHue": 0,
        "battlerName": "",
        "dropItems": [
            {"dataId": 1, "denominator": 1, "kind": 0},
            {"dataId": 1, "denominator": 1, "kind": 0},
            {"dataId": 1, "denominator": 1, "kind": 0}
        ],
        "exp": spec.exp,
        "gold": spec.gold,
        "name": spec.name,
        "note": "",
        // mhp, mmp, atk, def, mat, mdf, agi, luk
        "params": [spec.max_hp, 0, spec.attack, spec.defense, spec.attack, spec.defense, 10, 10],
        "traits": []
    })
}

pub fn troop(id: RecordId, name: &str, members: &[RecordId]) -> Value {
    let members: Vec<Value> = members
        .iter()
        .enumerate()
        .map(|(i, enemy_id)| json!({"enemyId": enemy_id, "x": 300 + (i as i64) * 120, "y": 436, "hidden": false}))
        .collect();
    json!({
        "id": id,
        "members": members,
        "name": name,
        "pages": [{
            "conditions": {
                "actorHp": 50, "actorId": 1, "actorValid": false,
                "enemyHp": 50, "enemyIndex": 0, "enemyValid": false,
                "switchId": 1, "switchValid": false,
                "turnA": 0, "turnB": 0, "turnEnding": false, "turnValid": false
            },
            "list": [{"code": 0, "indent": 0, "parameters": []}],
            "span": 0
        }]
    })
}

pub fn common_event(id: RecordId, name: &str, trigger: u32, commands: &[EventCommand]) -> Value {
    let mut list: Vec<Value> = commands.iter().map(|c| json!(c)).collect();
    if commands.last().map(|c| c.code) != Some(0) {
        list.push(json!({"code": 0, "indent": 0, "parameters": []}));
    }
    let mut fields = Map::new();
    fields.insert("id".into(), json!(id));
    fields.insert("list".into(), Value::Array(list));
    fields.insert("name".into(), json!(name));
    fields.insert("switchId".into(), json!(1));
    fields.insert("trigger".into(), json!(trigger));
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_container_starts_at_one() {
        let mut v = Value::Null;
        let id = insert_record(&mut v, "Actors.json", |id| json!({"id": id})).unwrap();
        assert_eq!(id, 1);
        assert_eq!(v, json!([null, {"id": 1}]));
    }

    #[test]
    fn next_id_follows_max_not_len() {
        let mut v = json!([null, {"id": 1}, null, null, {"id": 4}]);
        let id = insert_record(&mut v, "Skills.json", |id| json!({"id": id})).unwrap();
        assert_eq!(id, 5);
        assert_eq!(v.as_array().unwrap().len(), 6);

        let mut infos = json!({"2": {"id": 2}, "9": {"id": 9}});
        assert_eq!(insert_record(&mut infos, "MapInfos.json", |id| json!({"id": id})).unwrap(), 10);
        assert!(infos.get("10").is_some());
    }

    #[test]
    fn scalar_container_is_a_shape_error() {
        let mut v = json!(3);
        let err = insert_record(&mut v, "Enemies.json", |id| json!({"id": id})).unwrap_err();
        assert!(matches!(err, StoreError::Shape { .. }));
        assert_eq!(v, json!(3));
    }

    #[test]
    fn exhausted_id_space_is_refused() {
        let mut v = json!([null, {"id": u32::MAX}]);
        let err = insert_record(&mut v, "Skills.json", |id| json!({"id": id})).unwrap_err();
        assert!(matches!(err, StoreError::IdOutOfRange { id, .. } if id == u64::from(u32::MAX)));
        assert_eq!(v, json!([null, {"id": u32::MAX}]));

        let mut infos = json!({"4294967295": {"id": u32::MAX}});
        assert!(insert_record(&mut infos, "MapInfos.json", |id| json!({"id": id})).is_err());
    }

    #[test]
    fn far_away_array_id_is_not_grown_into() {
        let mut v = json!([null, {"id": 2_000_000_000u32}]);
        let err = insert_record(&mut v, "Enemies.json", |id| json!({"id": id})).unwrap_err();
        assert!(matches!(err, StoreError::IdOutOfRange { .. }));
        assert_eq!(v.as_array().unwrap().len(), 2);

        // a small gap is still filled with nulls
        let mut v = json!([null, {"id": 3}]);
        assert_eq!(insert_record(&mut v, "Enemies.json", |id| json!({"id": id})).unwrap(), 4);
        assert_eq!(v.as_array().unwrap().len(), 5);
    }

    #[test]
    fn common_event_list_is_terminated_once() {
        let ev = common_event(1, "Greeting", 0, &[crate::commands::text_line("hi")]);
        let codes: Vec<u64> = ev["list"].as_array().unwrap().iter().map(|c| c["code"].as_u64().unwrap()).collect();
        assert_eq!(codes, vec![401, 0]);
    }
}
