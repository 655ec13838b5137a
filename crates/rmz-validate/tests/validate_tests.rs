use rmz_core::{CharacterType, GameCharacter, GameDocument, GameLocation, GameMetadata, GameQuest};
use rmz_validate::{validate, Severity};

#[test]
fn findings_cover_every_default_rule() {
    let mut doc = GameDocument::new(GameMetadata::new("Epic", ""));
    doc.locations.push(GameLocation::stub("unbuilt cave"));
    doc.characters.push(GameCharacter::stub("aria", CharacterType::Player));
    doc.characters.push(GameCharacter::stub("shopkeeper", CharacterType::Npc));
    doc.quests.push(GameQuest {
        id: Some(1),
        name: "Lost Ring".into(),
        description: String::new(),
        objectives: vec![],
        start_location: "Unbuilt Cave".into(),
        prerequisite_quests: vec![1, 9],
    });

    let findings = validate(&doc);
    let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["location_has_map", "quest_prerequisites", "character_class"]);
    assert!(findings.iter().all(|f| f.severity == Severity::Warn));

    let json = serde_json::to_value(&findings[0]).unwrap();
    assert_eq!(json["severity"], "warn");
    assert_eq!(json["category"], "structural");
}
