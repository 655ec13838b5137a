use std::collections::BTreeSet;

use rmz_core::{CharacterType, GameDocument, RecordId};

use crate::types::{Finding, Severity, ValidationCategory};

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn category(&self) -> ValidationCategory;
    fn eval(&self, doc: &GameDocument) -> Vec<Finding>;

    fn finding(&self, severity: Severity, subject: &str, message: String) -> Finding {
        Finding {
            rule_id: self.id().to_string(),
            category: self.category(),
            severity,
            message,
            subject: Some(subject.to_string()),
        }
    }
}

/// Warns about locations that were never turned into a map record.
pub struct LocationHasMapRule;

impl Rule for LocationHasMapRule {
    fn id(&self) -> &str {
        "location_has_map"
    }

    fn category(&self) -> ValidationCategory {
        ValidationCategory::Structural
    }

    fn eval(&self, doc: &GameDocument) -> Vec<Finding> {
        doc.locations
            .iter()
            .filter(|l| l.id.is_none())
            .map(|l| self.finding(Severity::Warn, &l.name, format!("location `{}` has no map yet", l.name)))
            .collect()
    }
}

/// Fails cutscenes placed on a map no location owns.
pub struct CutsceneMapKnownRule;

impl Rule for CutsceneMapKnownRule {
    fn id(&self) -> &str {
        "cutscene_map_known"
    }

    fn category(&self) -> ValidationCategory {
        ValidationCategory::Reference
    }

    fn eval(&self, doc: &GameDocument) -> Vec<Finding> {
        let maps: BTreeSet<RecordId> = doc.locations.iter().filter_map(|l| l.id).collect();
        doc.cutscenes
            .iter()
            .filter(|c| !maps.contains(&c.location_id))
            .map(|c| {
                self.finding(
                    Severity::Fail,
                    &c.name,
                    format!("cutscene `{}` points at unknown map {}", c.name, c.location_id),
                )
            })
            .collect()
    }
}

pub struct UniqueLocationNamesRule;

impl Rule for UniqueLocationNamesRule {
    fn id(&self) -> &str {
        "unique_location_names"
    }

    fn category(&self) -> ValidationCategory {
        ValidationCategory::Naming
    }

    fn eval(&self, doc: &GameDocument) -> Vec<Finding> {
        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        let mut out = vec![];
        for loc in &doc.locations {
            let key = loc.name.to_lowercase();
            if !seen.insert(key.clone()) && reported.insert(key) {
                out.push(self.finding(Severity::Fail, &loc.name, format!("location name `{}` is used twice", loc.name)));
            }
        }
        out
    }
}

pub struct QuestPrerequisitesRule;

impl Rule for QuestPrerequisitesRule {
    fn id(&self) -> &str {
        "quest_prerequisites"
    }

    fn category(&self) -> ValidationCategory {
        ValidationCategory::Reference
    }

    fn eval(&self, doc: &GameDocument) -> Vec<Finding> {
        let known: BTreeSet<RecordId> = doc.quests.iter().filter_map(|q| q.id).collect();
        let mut out = vec![];
        for quest in &doc.quests {
            for prereq in quest.prerequisite_quests.iter().filter(|p| !known.contains(*p)) {
                out.push(self.finding(
                    Severity::Warn,
                    &quest.name,
                    format!("quest `{}` requires unknown quest {}", quest.name, prereq),
                ));
            }
        }
        out
    }
}

/// Playable characters need a class before they can become actors.
pub struct CharacterClassRule;

impl Rule for CharacterClassRule {
    fn id(&self) -> &str {
        "character_class"
    }

    fn category(&self) -> ValidationCategory {
        ValidationCategory::Structural
    }

    fn eval(&self, doc: &GameDocument) -> Vec<Finding> {
        doc.characters
            .iter()
            .filter(|c| c.character_type == CharacterType::Player && c.class_id.is_none())
            .map(|c| self.finding(Severity::Warn, &c.name, format!("character `{}` has no class", c.name)))
            .collect()
    }
}

pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(LocationHasMapRule),
        Box::new(CutsceneMapKnownRule),
        Box::new(UniqueLocationNamesRule),
        Box::new(QuestPrerequisitesRule),
        Box::new(CharacterClassRule),
    ]
}

pub fn validate_with(rules: &[Box<dyn Rule>], doc: &GameDocument) -> Vec<Finding> {
    rules.iter().flat_map(|r| r.eval(doc)).collect()
}

pub fn validate(doc: &GameDocument) -> Vec<Finding> {
    validate_with(&default_rules(), doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmz_core::{CutsceneData, GameLocation, GameMetadata};

    fn doc() -> GameDocument {
        GameDocument::new(GameMetadata::new("Epic", ""))
    }

    #[test]
    fn clean_document_has_no_findings() {
        let mut d = doc();
        let mut town = GameLocation::stub("town");
        town.id = Some(1);
        d.locations.push(town);
        d.cutscenes.push(CutsceneData::stub("intro", 1));
        assert!(validate(&d).is_empty());
    }

    #[test]
    fn cutscene_on_unknown_map_fails() {
        let mut d = doc();
        d.cutscenes.push(CutsceneData::stub("intro", 4));
        let findings = CutsceneMapKnownRule.eval(&d);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_failure());
        assert_eq!(findings[0].subject.as_deref(), Some("Intro"));
    }

    #[test]
    fn duplicate_names_reported_once() {
        let mut d = doc();
        // bypasses attach, which would refuse the duplicates
        for _ in 0..3 {
            d.locations.push(GameLocation::stub("harbor"));
        }
        let findings = UniqueLocationNamesRule.eval(&d);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "unique_location_names");
    }
}
