use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::CoreError, ids::RecordId};

/// Anything in the document that is identified by a (case-insensitive) name.
pub trait Named {
    const ENTITY: &'static str;
    fn name(&self) -> &str;
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self { width: 816, height: 624 }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameMetadata {
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resolution: Resolution,
}

impl GameMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: default_version(),
            creator: "rmz".to_string(),
            description: description.into(),
            resolution: Resolution::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameLocation {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub tileset_id: u32,
    pub encounter_rate: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl GameLocation {
    /// Stub used when a task names a location the document does not have yet.
    pub fn stub(name: &str) -> Self {
        let name = title_case(name);
        Self {
            id: None,
            description: format!("A location called {name}"),
            name,
            width: 20,
            height: 15,
            tileset_id: 1,
            encounter_rate: 30,
            features: vec![],
            notes: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Player,
    #[default]
    Npc,
    Enemy,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameCharacter {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default, rename = "type")]
    pub character_type: CharacterType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub class_id: Option<RecordId>,
    pub level: u32,
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub backstory: String,
}

impl GameCharacter {
    pub fn stub(name: &str, character_type: CharacterType) -> Self {
        let name = title_case(name);
        Self {
            id: None,
            description: format!("A character called {name}"),
            name,
            character_type,
            class_id: None,
            level: 1,
            stats: BTreeMap::new(),
            personality: String::new(),
            backstory: String::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameQuest {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub start_location: String,
    #[serde(default)]
    pub prerequisite_quests: Vec<RecordId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogueData {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub speaker: String,
    pub text: Vec<String>,
    #[serde(default)]
    pub face_name: String,
    #[serde(default)]
    pub face_index: u32,
}

impl DialogueData {
    pub fn stub(speaker: &str) -> Self {
        let speaker = title_case(speaker);
        Self {
            id: None,
            text: vec![format!("Hello, I am {speaker}.")],
            speaker,
            face_name: String::new(),
            face_index: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CutsceneData {
    /// Event id once the cutscene has been placed on a map.
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location_id: RecordId,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl CutsceneData {
    pub fn stub(name: &str, location_id: RecordId) -> Self {
        let name = title_case(name);
        Self {
            id: None,
            description: format!("A cutscene for {name}"),
            name,
            location_id,
            lines: vec![],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleEncounter {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub troop_id: Option<RecordId>,
    #[serde(default)]
    pub enemies: Vec<RecordId>,
    #[serde(default)]
    pub background: String,
}

impl BattleEncounter {
    pub fn stub(name: &str) -> Self {
        Self {
            id: None,
            name: title_case(name),
            troop_id: None,
            enemies: vec![],
            background: String::new(),
        }
    }
}

macro_rules! named {
    ($ty:ty, $entity:literal, $field:ident) => {
        impl Named for $ty {
            const ENTITY: &'static str = $entity;
            fn name(&self) -> &str {
                &self.$field
            }
        }
    };
}

named!(GameLocation, "location", name);
named!(GameCharacter, "character", name);
named!(GameQuest, "quest", name);
named!(DialogueData, "dialogue", speaker);
named!(CutsceneData, "cutscene", name);
named!(BattleEncounter, "battle", name);

/// The shared design document workers populate. Entities are append-only:
/// resolving a name that already exists returns the existing entity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameDocument {
    pub metadata: GameMetadata,
    #[serde(default)]
    pub locations: Vec<GameLocation>,
    #[serde(default)]
    pub characters: Vec<GameCharacter>,
    #[serde(default)]
    pub quests: Vec<GameQuest>,
    #[serde(default)]
    pub dialogues: Vec<DialogueData>,
    #[serde(default)]
    pub cutscenes: Vec<CutsceneData>,
    #[serde(default)]
    pub battles: Vec<BattleEncounter>,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default)]
    pub switches: BTreeMap<String, Value>,
}

/// Result of resolving a named entity: the entity plus whether a stub was created.
pub struct Resolved<'a, T> {
    pub entity: &'a mut T,
    pub created: bool,
}

impl GameDocument {
    pub fn new(metadata: GameMetadata) -> Self {
        Self {
            metadata,
            locations: vec![],
            characters: vec![],
            quests: vec![],
            dialogues: vec![],
            cutscenes: vec![],
            battles: vec![],
            variables: BTreeMap::new(),
            switches: BTreeMap::new(),
        }
    }

    /// Map id of the first location, if it has been built.
    pub fn first_map_id(&self) -> Option<RecordId> {
        self.locations.first().and_then(|l| l.id)
    }

    pub fn find_location(&self, name: &str) -> Option<&GameLocation> {
        find(&self.locations, name)
    }

    pub fn find_character(&self, name: &str) -> Option<&GameCharacter> {
        find(&self.characters, name)
    }

    pub fn resolve_location(&mut self, name: &str) -> Resolved<'_, GameLocation> {
        resolve(&mut self.locations, name, || GameLocation::stub(name))
    }

    pub fn resolve_character(&mut self, name: &str, character_type: CharacterType) -> Resolved<'_, GameCharacter> {
        resolve(&mut self.characters, name, || GameCharacter::stub(name, character_type))
    }

    pub fn resolve_dialogue(&mut self, speaker: &str) -> Resolved<'_, DialogueData> {
        resolve(&mut self.dialogues, speaker, || DialogueData::stub(speaker))
    }

    /// Stub cutscenes are placed on the first location's map, else map 1.
    pub fn resolve_cutscene(&mut self, name: &str) -> Resolved<'_, CutsceneData> {
        let location_id = self.first_map_id().unwrap_or(1);
        resolve(&mut self.cutscenes, name, || CutsceneData::stub(name, location_id))
    }

    pub fn resolve_battle(&mut self, name: &str) -> Resolved<'_, BattleEncounter> {
        resolve(&mut self.battles, name, || BattleEncounter::stub(name))
    }

    pub fn attach_location(&mut self, location: GameLocation) -> Result<(), CoreError> {
        attach(&mut self.locations, location)
    }

    pub fn attach_character(&mut self, character: GameCharacter) -> Result<(), CoreError> {
        attach(&mut self.characters, character)
    }

    pub fn attach_quest(&mut self, quest: GameQuest) -> Result<(), CoreError> {
        attach(&mut self.quests, quest)
    }

    pub fn attach_cutscene(&mut self, cutscene: CutsceneData) -> Result<(), CoreError> {
        attach(&mut self.cutscenes, cutscene)
    }

    pub fn attach_battle(&mut self, battle: BattleEncounter) -> Result<(), CoreError> {
        attach(&mut self.battles, battle)
    }
}

fn find<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a T> {
    let key = name_key(name);
    items.iter().find(|i| name_key(i.name()) == key)
}

fn resolve<'a, T: Named>(items: &'a mut Vec<T>, name: &str, make: impl FnOnce() -> T) -> Resolved<'a, T> {
    let key = name_key(name);
    match items.iter().position(|i| name_key(i.name()) == key) {
        Some(idx) => Resolved { entity: &mut items[idx], created: false },
        None => {
            items.push(make());
            let last = items.len() - 1;
            Resolved { entity: &mut items[last], created: true }
        }
    }
}

/// Identity of an entity name: whitespace runs collapsed, Unicode lowercase.
/// Agrees with `title_case`, so a stub is always found by the name it was made from.
fn name_key(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn attach<T: Named>(items: &mut Vec<T>, entity: T) -> Result<(), CoreError> {
    if find(items, entity.name()).is_some() {
        return Err(CoreError::DuplicateEntity { entity: T::ENTITY, name: entity.name().to_string() });
    }
    items.push(entity);
    Ok(())
}

/// `starting town` -> `Starting Town`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> GameDocument {
        GameDocument::new(GameMetadata::new("Epic", "a test"))
    }

    #[test]
    fn lookup_matches_normalized_names() {
        let mut d = doc();
        assert!(d.resolve_location("élan village").created);
        assert_eq!(d.locations[0].name, "Élan Village");
        assert!(!d.resolve_location("ÉLAN VILLAGE").created);

        assert!(d.resolve_location("dark  forest").created);
        assert!(!d.resolve_location(" Dark\tForest ").created);
        assert_eq!(d.locations.len(), 2);
        assert!(d.find_location("dark forest").is_some());
    }

    #[test]
    fn resolve_creates_stub_once() {
        let mut d = doc();
        let r = d.resolve_location("starting town");
        assert!(r.created);
        assert_eq!(r.entity.name, "Starting Town");
        assert_eq!((r.entity.width, r.entity.height, r.entity.tileset_id), (20, 15, 1));
        r.entity.id = Some(4);

        let again = d.resolve_location("STARTING TOWN");
        assert!(!again.created);
        assert_eq!(again.entity.id, Some(4));
        assert_eq!(d.locations.len(), 1);
    }

    #[test]
    fn attach_never_overwrites() {
        let mut d = doc();
        d.attach_location(GameLocation::stub("harbor")).unwrap();
        let mut other = GameLocation::stub("Harbor");
        other.width = 99;
        let err = d.attach_location(other).unwrap_err();
        assert_eq!(err, CoreError::DuplicateEntity { entity: "location", name: "Harbor".into() });
        assert_eq!(d.locations[0].width, 20);
    }

    #[test]
    fn cutscene_stub_uses_first_map() {
        let mut d = doc();
        assert_eq!(d.resolve_cutscene("intro cutscene").entity.location_id, 1);

        let mut d = doc();
        d.resolve_location("town").entity.id = Some(7);
        let c = d.resolve_cutscene("intro cutscene");
        assert_eq!(c.entity.location_id, 7);
        assert_eq!(c.entity.description, "A cutscene for Intro Cutscene");
    }

    #[test]
    fn title_case_matches_words() {
        assert_eq!(title_case("starting town"), "Starting Town");
        assert_eq!(title_case("  dark   FOREST "), "Dark Forest");
        assert_eq!(title_case(""), "");
    }
}
