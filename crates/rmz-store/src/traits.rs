use rmz_core::RecordId;
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    commands::{EventCommand, EventPage},
    error::{Family, StoreError},
    records,
};

/// One file in the data directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordFile {
    MapInfos,
    Map(RecordId),
    Actors,
    Classes,
    Skills,
    Enemies,
    Troops,
    CommonEvents,
}

impl RecordFile {
    pub fn file_name(&self) -> String {
        match self {
            RecordFile::MapInfos => "MapInfos.json".to_string(),
            RecordFile::Map(id) => format!("Map{id:03}.json"),
            RecordFile::Actors => "Actors.json".to_string(),
            RecordFile::Classes => "Classes.json".to_string(),
            RecordFile::Skills => "Skills.json".to_string(),
            RecordFile::Enemies => "Enemies.json".to_string(),
            RecordFile::Troops => "Troops.json".to_string(),
            RecordFile::CommonEvents => "CommonEvents.json".to_string(),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            RecordFile::MapInfos | RecordFile::Map(_) => Family::Maps,
            RecordFile::Actors => Family::Actors,
            RecordFile::Classes => Family::Classes,
            RecordFile::Skills => Family::Skills,
            RecordFile::Enemies => Family::Enemies,
            RecordFile::Troops => Family::Troops,
            RecordFile::CommonEvents => Family::CommonEvents,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tileset_id: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventSpec {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub pages: Vec<EventPage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillSpec {
    pub name: String,
    pub description: String,
    pub mp_cost: u32,
    pub damage_type: u32,
    pub formula: String,
    pub icon_index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySpec {
    pub name: String,
    pub max_hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub gold: i64,
    pub exp: i64,
}

/// CRUD facade over the game's record files. Ids are allocated as
/// `max(existing) + 1`, or 1 for an empty family.
///
/// Implementations provide raw file access; the creation helpers are shared.
pub trait RecordStore: Send + Sync {
    /// Current contents of `file`, `None` if it does not exist yet.
    fn read(&self, file: &RecordFile) -> Result<Option<Value>, StoreError>;

    /// Read-modify-write of one file. `edit` sees `Value::Null` for a missing
    /// file. Nothing is written when `edit` fails.
    fn update(
        &self,
        file: &RecordFile,
        edit: &mut dyn FnMut(&mut Value) -> Result<RecordId, StoreError>,
    ) -> Result<RecordId, StoreError>;

    fn create_map(&self, spec: &MapSpec) -> Result<RecordId, StoreError> {
        let id = self.update(&RecordFile::MapInfos, &mut |infos| {
            if infos.is_null() {
                *infos = json!({});
            }
            records::insert_record(infos, "MapInfos.json", |id| records::map_info(id, &spec.name))
        })?;
        let map = records::map(spec);
        let written = self.update(&RecordFile::Map(id), &mut |slot| {
            *slot = map.clone();
            Ok(id)
        });
        if let Err(e) = written {
            // no MapInfos entry may point at a map file that was never written
            let key = id.to_string();
            let rollback = self.update(&RecordFile::MapInfos, &mut |infos| {
                if let Value::Object(entries) = infos {
                    entries.remove(&key);
                }
                Ok(id)
            });
            if let Err(rollback) = rollback {
                warn!(map_id = id, error = %rollback, "could not remove map info after failed map write");
            }
            return Err(e);
        }
        Ok(id)
    }

    fn get_map(&self, map_id: RecordId) -> Result<Value, StoreError> {
        self.read(&RecordFile::Map(map_id))?.ok_or(StoreError::MapNotFound(map_id))
    }

    fn create_event(&self, map_id: RecordId, spec: &EventSpec) -> Result<RecordId, StoreError> {
        let file = RecordFile::Map(map_id);
        self.update(&file, &mut |map| {
            let Value::Object(fields) = map else {
                return Err(StoreError::MapNotFound(map_id));
            };
            let events = fields.entry("events").or_insert(json!([null]));
            records::insert_record(events, &file.file_name(), |id| records::event(id, spec))
        })
    }

    fn create_actor(&self, name: &str, class_id: RecordId, level: u32) -> Result<RecordId, StoreError> {
        self.update(&RecordFile::Actors, &mut |actors| {
            records::insert_record(actors, "Actors.json", |id| records::actor(id, name, class_id, level))
        })
    }

    fn create_class(&self, name: &str) -> Result<RecordId, StoreError> {
        self.update(&RecordFile::Classes, &mut |classes| {
            records::insert_record(classes, "Classes.json", |id| records::class(id, name))
        })
    }

    fn create_skill(&self, spec: &SkillSpec) -> Result<RecordId, StoreError> {
        self.update(&RecordFile::Skills, &mut |skills| {
            records::insert_record(skills, "Skills.json", |id| records::skill(id, spec))
        })
    }

    fn create_enemy(&self, spec: &EnemySpec) -> Result<RecordId, StoreError> {
        self.update(&RecordFile::Enemies, &mut |enemies| {
            records::insert_record(enemies, "Enemies.json", |id| records::enemy(id, spec))
        })
    }

    fn create_troop(&self, name: &str, members: &[RecordId]) -> Result<RecordId, StoreError> {
        self.update(&RecordFile::Troops, &mut |troops| {
            records::insert_record(troops, "Troops.json", |id| records::troop(id, name, members))
        })
    }

    fn create_common_event(&self, name: &str, trigger: u32, commands: &[EventCommand]) -> Result<RecordId, StoreError> {
        self.update(&RecordFile::CommonEvents, &mut |events| {
            records::insert_record(events, "CommonEvents.json", |id| records::common_event(id, name, trigger, commands))
        })
    }
}
