//! The character aggregate: assembly, validation, racial modifiers, and
//! JSON import/export.
//!
//! A character is assembled once from creation parameters and mutated in
//! place afterwards. Mutators re-run the relevant recalculation pass before
//! returning, so derived values never go stale.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::abilities::{Ability, AbilityScores, GenerationMethod};
use crate::class_data::{BabProgression, ClassSource, CoreClasses, SaveProgression};
use crate::dice::now_millis;
use crate::equipment::Equipment;
use crate::race_data::{RaceData, Size};
use crate::validation::{self, ValidationReport};

/// Schema version stamped on every serialized character.
pub const SCHEMA_VERSION: &str = "1.1.0";

/// The nine alignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Alignment {
    #[serde(rename = "Lawful Good")]
    LawfulGood,
    #[serde(rename = "Neutral Good")]
    NeutralGood,
    #[serde(rename = "Chaotic Good")]
    ChaoticGood,
    #[serde(rename = "Lawful Neutral")]
    LawfulNeutral,
    #[default]
    #[serde(rename = "True Neutral")]
    TrueNeutral,
    #[serde(rename = "Chaotic Neutral")]
    ChaoticNeutral,
    #[serde(rename = "Lawful Evil")]
    LawfulEvil,
    #[serde(rename = "Neutral Evil")]
    NeutralEvil,
    #[serde(rename = "Chaotic Evil")]
    ChaoticEvil,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alignment::LawfulGood => "Lawful Good",
            Alignment::NeutralGood => "Neutral Good",
            Alignment::ChaoticGood => "Chaotic Good",
            Alignment::LawfulNeutral => "Lawful Neutral",
            Alignment::TrueNeutral => "True Neutral",
            Alignment::ChaoticNeutral => "Chaotic Neutral",
            Alignment::LawfulEvil => "Lawful Evil",
            Alignment::NeutralEvil => "Neutral Evil",
            Alignment::ChaoticEvil => "Chaotic Evil",
        };
        write!(f, "{name}")
    }
}

/// Identity and biography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub player: String,
    pub race: RaceData,
    pub size: Size,
    pub alignment: Alignment,
    #[serde(default)]
    pub deity: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub hair: String,
    #[serde(default)]
    pub eyes: String,
    #[serde(default)]
    pub skin: String,
    #[serde(default)]
    pub homeland: String,
    #[serde(default)]
    pub campaign: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub notes: String,
}

/// A class feature the character has gained (or will gain at a later level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFeature {
    pub name: String,
    pub description: String,
    pub level: u32,
}

/// One class the character has levels in. Derived wholesale from class
/// reference data; changing class replaces the entry rather than patching
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    pub level: u32,
    pub hit_die_size: u32,
    /// One rolled result per level. Level 1 takes the die maximum.
    pub hit_die_results: Vec<u32>,
    /// Skill ranks gained per level.
    pub skill_ranks: u32,
    pub class_skills: Vec<String>,
    pub bab_progression: BabProgression,
    pub fort_progression: SaveProgression,
    pub ref_progression: SaveProgression,
    pub will_progression: SaveProgression,
    pub class_features: Vec<ClassFeature>,
}

impl ClassEntry {
    /// A level-1 entry for the named class. Unknown class names are not an
    /// error: they fall back to a plain d8 class with no skills or
    /// features so character creation never fails on reference data.
    pub fn level_one(class_name: &str, source: &impl ClassSource) -> ClassEntry {
        match source.class(class_name) {
            Some(data) => ClassEntry {
                name: data.name.to_string(),
                level: 1,
                hit_die_size: data.hit_die,
                hit_die_results: vec![data.hit_die],
                skill_ranks: data.skill_ranks_per_level,
                class_skills: data.class_skills.iter().map(|s| s.to_string()).collect(),
                bab_progression: data.bab_progression,
                fort_progression: data.fort_progression,
                ref_progression: data.ref_progression,
                will_progression: data.will_progression,
                class_features: data
                    .features_at_level(1)
                    .map(|f| ClassFeature {
                        name: f.name.to_string(),
                        description: f.description.to_string(),
                        level: f.level,
                    })
                    .collect(),
            },
            None => ClassEntry {
                name: class_name.to_string(),
                level: 1,
                hit_die_size: 8,
                hit_die_results: vec![8],
                skill_ranks: 2,
                class_skills: Vec::new(),
                bab_progression: BabProgression::Medium,
                fort_progression: SaveProgression::Poor,
                ref_progression: SaveProgression::Poor,
                will_progression: SaveProgression::Poor,
                class_features: Vec::new(),
            },
        }
    }
}

/// All class entries plus the cached total level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CharacterClasses {
    pub classes: Vec<ClassEntry>,
    pub total_level: u32,
}

impl CharacterClasses {
    /// Human-readable summary, e.g. "Fighter 3/Wizard 2".
    pub fn summary(&self) -> String {
        self.classes
            .iter()
            .map(|entry| format!("{} {}", entry.name, entry.level))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// A trained skill. Kept as plain data; skill totals are not derived here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRank {
    pub name: String,
    pub ability: Ability,
    pub ranks: u32,
}

/// A taken feat. Plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feat {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub current: u64,
    pub next_level: u64,
}

impl Default for Experience {
    fn default() -> Self {
        Experience {
            current: 0,
            next_level: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Currency {
    pub platinum: u64,
    pub gold: u64,
    pub silver: u64,
    pub copper: u64,
}

/// Parameters for assembling a new character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCharacterParams {
    pub name: String,
    pub race: RaceData,
    pub class_name: String,
    pub method: GenerationMethod,
    /// Base values in STR..CHA order.
    pub ability_scores: [i32; 6],
    pub alignment: Alignment,
    pub deity: Option<String>,
}

/// The aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub info: CharacterInfo,
    pub ability_scores: AbilityScores,
    pub classes: CharacterClasses,
    pub equipment: Equipment,
    #[serde(default)]
    pub skills: Vec<SkillRank>,
    #[serde(default)]
    pub feats: Vec<Feat>,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub currency: Currency,
    pub schema_version: String,
    /// Epoch milliseconds of the last mutation.
    pub last_updated: u64,
}

/// Hard failures from the JSON import path.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to import character: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid character data: {0}")]
    Invalid(String),
}

impl Character {
    /// Assemble a new character from creation parameters.
    ///
    /// A blank name defaults to "New Character" and a missing deity to "".
    /// The selected class resolves against the injected class table, with
    /// fallback defaults for unknown names. Racial modifiers are applied
    /// as part of assembly.
    pub fn create(params: CreateCharacterParams, classes: &impl ClassSource) -> Character {
        let name = if params.name.trim().is_empty() {
            "New Character".to_string()
        } else {
            params.name.clone()
        };

        let entry = ClassEntry::level_one(&params.class_name, classes);

        let mut character = Character {
            info: CharacterInfo {
                id: generate_character_id(),
                name,
                player: String::new(),
                size: params.race.size,
                race: params.race,
                alignment: params.alignment,
                deity: params.deity.unwrap_or_default(),
                gender: String::new(),
                age: 0,
                height: String::new(),
                weight: String::new(),
                hair: String::new(),
                eyes: String::new(),
                skin: String::new(),
                homeland: String::new(),
                campaign: String::new(),
                background: String::new(),
                notes: String::new(),
            },
            ability_scores: AbilityScores::from_bases(params.ability_scores),
            classes: CharacterClasses {
                classes: vec![entry],
                total_level: 1,
            },
            equipment: Equipment::default(),
            skills: Vec::new(),
            feats: Vec::new(),
            experience: Experience::default(),
            currency: Currency::default(),
            schema_version: SCHEMA_VERSION.to_string(),
            last_updated: now_millis(),
        };

        character.apply_racial_modifiers();
        character
    }

    /// Full character validation. Problems surface as messages, never as
    /// panics.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.info.name.trim().is_empty() {
            report.error("Character name is required");
        }
        if self.info.name.chars().count() > 100 {
            report.warning("Character name is very long");
        }

        for ability in Ability::all() {
            let score = self.ability_scores.get(ability);
            if !(1..=25).contains(&score.base) {
                report.error(format!(
                    "{} base score {} is outside valid range (1-25)",
                    ability.abbreviation(),
                    score.base
                ));
            }
            match ability {
                Ability::Constitution => {
                    // Two independent death checks: a non-positive base and
                    // a temp total dragged to zero by damage or drain.
                    if score.base <= 0 {
                        report.error(
                            "Constitution cannot be 0 or negative (character would be dead)",
                        );
                    }
                    if score.temp_total <= 0 {
                        report.error("Constitution cannot be reduced to 0 or below");
                    }
                }
                _ => {
                    if score.temp_total == 0 {
                        report.warning(format!(
                            "{} reduced to 0 - character is severely impaired",
                            ability.abbreviation()
                        ));
                    }
                }
            }
        }

        if self.classes.classes.is_empty() {
            report.error("Character must have at least one class");
        } else {
            let calculated: u32 = self.classes.classes.iter().map(|c| c.level).sum();
            if calculated != self.classes.total_level {
                report.error(format!(
                    "Total level mismatch: {} vs calculated {}",
                    self.classes.total_level, calculated
                ));
            }
        }

        if self.schema_version != SCHEMA_VERSION {
            report.warning(format!(
                "Character uses old schema version: {}",
                self.schema_version
            ));
        }

        report
    }

    /// Re-run the ability recalculation pass (see
    /// [`AbilityScore::recalculate`](crate::abilities::AbilityScore::recalculate)).
    pub fn recalculate_abilities(&mut self) {
        self.ability_scores.recalculate_all();
    }

    /// Write the race's modifiers onto the ability scores and update size.
    ///
    /// Every ability's `racial` field is replaced from the race map,
    /// including zeroes, so re-applying a different race never stacks with
    /// the previous one.
    pub fn apply_racial_modifiers(&mut self) {
        for ability in Ability::all() {
            self.ability_scores.get_mut(ability).racial =
                self.info.race.ability_modifiers.get(ability);
        }
        self.recalculate_abilities();
        self.info.size = self.info.race.size;
    }

    /// Replace the race and re-derive everything racial.
    pub fn change_race(&mut self, race: RaceData) {
        self.info.race = race;
        self.apply_racial_modifiers();
        self.touch();
    }

    /// Replace the class selection by re-deriving the level-1 entry.
    pub fn change_class(&mut self, class_name: &str, classes: &impl ClassSource) {
        self.classes.classes = vec![ClassEntry::level_one(class_name, classes)];
        self.classes.total_level = 1;
        self.touch();
    }

    /// Stamp `last_updated`.
    pub fn touch(&mut self) {
        self.last_updated = now_millis();
    }

    /// Serialize to pretty JSON.
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse, re-validate, and normalize a serialized character.
    ///
    /// Fails loudly on malformed JSON and on characters that do not pass
    /// [`validate`](Self::validate); never returns a partially-valid
    /// character. A stale schema version is normalized to the current one
    /// and `last_updated` is restamped.
    pub fn import_from_json(json: &str) -> Result<Character, ImportError> {
        let mut character: Character = serde_json::from_str(json)?;

        let report = character.validate();
        if !report.is_valid {
            return Err(ImportError::Invalid(report.errors.join(", ")));
        }

        if character.schema_version != SCHEMA_VERSION {
            character.schema_version = SCHEMA_VERSION.to_string();
            character.touch();
        }

        Ok(character)
    }

    /// Name validation via the shared rules in [`crate::validation`].
    pub fn validate_name(&self) -> ValidationReport {
        validation::validate_character_name(&self.info.name)
    }
}

/// Generate a character id of the shape `char_<epoch-ms>_<9-char-base36>`.
/// The time component plus the random suffix keeps rapid repeated calls
/// collision-resistant.
pub fn generate_character_id() -> String {
    generate_character_id_with_rng(&mut rand::thread_rng())
}

pub fn generate_character_id_with_rng<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..9)
        .map(|_| char::from_digit(rng.gen_range(0..36), 36).unwrap())
        .collect();
    format!("char_{}_{}", now_millis(), suffix)
}

/// A ready-made dwarf fighter for tests and examples.
pub fn create_sample_character(name: &str) -> Character {
    let dwarf = crate::race_data::race_by_name("Dwarf")
        .expect("core race table includes Dwarf")
        .clone();
    Character::create(
        CreateCharacterParams {
            name: name.to_string(),
            race: dwarf,
            class_name: "Fighter".to_string(),
            method: GenerationMethod::PointBuy,
            ability_scores: [16, 12, 14, 10, 12, 8],
            alignment: Alignment::LawfulGood,
            deity: None,
        },
        &CoreClasses,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_data::{BabProgression, CoreClasses};
    use crate::race_data::{race_by_name, Size};
    use std::collections::HashSet;

    #[test]
    fn test_create_dwarf_fighter_end_to_end() {
        let character = create_sample_character("Thorin");

        // Dwarf: CON +2, WIS +2, CHA -2 over the point-buy bases.
        assert_eq!(character.ability_scores.con.total, 16);
        assert_eq!(character.ability_scores.con.modifier, 3);
        assert_eq!(character.ability_scores.wis.total, 14);
        assert_eq!(character.ability_scores.wis.modifier, 2);
        assert_eq!(character.ability_scores.cha.total, 6);
        assert_eq!(character.ability_scores.cha.modifier, -2);
        assert_eq!(character.info.size, Size::Medium);

        let entry = &character.classes.classes[0];
        assert_eq!(entry.name, "Fighter");
        assert_eq!(entry.level, 1);
        assert_eq!(entry.hit_die_size, 10);
        assert_eq!(entry.bab_progression, BabProgression::Full);
        // Max HP at level 1.
        assert_eq!(entry.hit_die_results, vec![10]);

        assert!(character.validate().is_valid);
    }

    #[test]
    fn test_blank_name_and_deity_defaults() {
        let mut params = CreateCharacterParams {
            name: "   ".to_string(),
            race: race_by_name("Human").unwrap().clone(),
            class_name: "Wizard".to_string(),
            method: GenerationMethod::PointBuy,
            ability_scores: [10, 12, 12, 16, 12, 10],
            alignment: Alignment::TrueNeutral,
            deity: None,
        };
        let character = Character::create(params.clone(), &CoreClasses);
        assert_eq!(character.info.name, "New Character");
        assert_eq!(character.info.deity, "");

        params.deity = Some("Desna".to_string());
        let character = Character::create(params, &CoreClasses);
        assert_eq!(character.info.deity, "Desna");
    }

    #[test]
    fn test_unknown_class_falls_back_without_failing() {
        let params = CreateCharacterParams {
            name: "Mysterious Stranger".to_string(),
            race: race_by_name("Human").unwrap().clone(),
            class_name: "Spellsword".to_string(),
            method: GenerationMethod::Roll4d6DropLowest,
            ability_scores: [12, 12, 12, 12, 12, 12],
            alignment: Alignment::ChaoticNeutral,
            deity: None,
        };
        let character = Character::create(params, &CoreClasses);

        let entry = &character.classes.classes[0];
        assert_eq!(entry.name, "Spellsword");
        assert_eq!(entry.hit_die_size, 8);
        assert_eq!(entry.skill_ranks, 2);
        assert_eq!(entry.bab_progression, BabProgression::Medium);
        assert!(entry.class_skills.is_empty());
        assert!(entry.class_features.is_empty());
        assert!(character.validate().is_valid);
    }

    #[test]
    fn test_level_one_features_only() {
        let entry = ClassEntry::level_one("Rogue", &CoreClasses);
        assert!(entry.class_features.iter().all(|f| f.level == 1));
        assert!(entry
            .class_features
            .iter()
            .any(|f| f.name == "Sneak Attack"));
    }

    #[test]
    fn test_racial_modifiers_replace_not_stack() {
        let mut character = Character::create(
            CreateCharacterParams {
                name: "Shapeshifter".to_string(),
                race: race_by_name("Elf").unwrap().clone(),
                class_name: "Fighter".to_string(),
                method: GenerationMethod::PointBuy,
                ability_scores: [10, 10, 10, 10, 10, 10],
                alignment: Alignment::TrueNeutral,
                deity: None,
            },
            &CoreClasses,
        );

        // Elf: DEX +2, INT +2, CON -2.
        assert_eq!(character.ability_scores.dex.racial, 2);
        assert_eq!(character.ability_scores.int.racial, 2);
        assert_eq!(character.ability_scores.con.racial, -2);

        character.change_race(race_by_name("Dwarf").unwrap().clone());

        // Dwarf values replace the elf values entirely.
        assert_eq!(character.ability_scores.dex.racial, 0);
        assert_eq!(character.ability_scores.int.racial, 0);
        assert_eq!(character.ability_scores.con.racial, 2);
        assert_eq!(character.ability_scores.wis.racial, 2);
        assert_eq!(character.ability_scores.cha.racial, -2);
        assert_eq!(character.ability_scores.con.total, 12);
    }

    #[test]
    fn test_validate_catches_level_mismatch() {
        let mut character = create_sample_character("Test Subject");
        character.classes.total_level = 3;
        let report = character.validate();
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("Total level mismatch: 3 vs calculated 1")));
    }

    #[test]
    fn test_validate_requires_a_class() {
        let mut character = create_sample_character("Classless");
        character.classes.classes.clear();
        character.classes.total_level = 0;
        let report = character.validate();
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("at least one class")));
    }

    #[test]
    fn test_validate_both_constitution_checks_fire() {
        let mut character = create_sample_character("Doomed");
        character.ability_scores.con.base = 0;
        character.ability_scores.con.racial = 0;
        character.ability_scores.con.recalculate();

        let report = character.validate();
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("character would be dead")));
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("reduced to 0 or below")));
    }

    #[test]
    fn test_validate_drained_constitution_is_fatal_even_with_valid_base() {
        let mut character = create_sample_character("Drained");
        character.ability_scores.con.drain = 30;
        character.ability_scores.con.recalculate();

        let report = character.validate();
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("reduced to 0 or below")));
        // The base is still fine, so only the temp-total check fires.
        assert!(!report
            .errors
            .iter()
            .any(|e| e.contains("character would be dead")));
    }

    #[test]
    fn test_validate_zero_other_ability_is_a_warning() {
        let mut character = create_sample_character("Paralyzed");
        character.ability_scores.dex.damage = 20;
        character.ability_scores.dex.recalculate();

        let report = character.validate();
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("DEX reduced to 0")));
    }

    #[test]
    fn test_schema_version_mismatch_is_a_warning() {
        let mut character = create_sample_character("Old Timer");
        character.schema_version = "1.0.0".to_string();
        let report = character.validate();
        assert!(report.is_valid);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("old schema version: 1.0.0")));
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut character = create_sample_character("Roundtrip");
        let id = character.add_item(crate::catalog::template_by_id("leather").unwrap());
        assert!(character
            .equip_item(&id, crate::equipment::EquipmentSlot::Body)
            .is_valid);

        let json = character.export_to_json().unwrap();
        let imported = Character::import_from_json(&json).unwrap();

        assert_eq!(imported, character);
    }

    #[test]
    fn test_import_rejects_garbage_and_invalid_characters() {
        assert!(matches!(
            Character::import_from_json("not json at all"),
            Err(ImportError::Parse(_))
        ));

        let mut invalid = create_sample_character("Invalid");
        invalid.info.name = String::new();
        let json = invalid.export_to_json().unwrap();
        let error = Character::import_from_json(&json).unwrap_err();
        assert!(matches!(&error, ImportError::Invalid(_)));
        assert!(error.to_string().contains("Character name is required"));
    }

    #[test]
    fn test_import_normalizes_schema_version() {
        let mut character = create_sample_character("Migrant");
        character.schema_version = "1.0.0".to_string();
        let stale_timestamp = character.last_updated;
        let json = character.export_to_json().unwrap();

        let imported = Character::import_from_json(&json).unwrap();
        assert_eq!(imported.schema_version, SCHEMA_VERSION);
        assert!(imported.last_updated >= stale_timestamp);
    }

    #[test]
    fn test_character_id_shape_and_uniqueness() {
        let id = generate_character_id();
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "char");
        assert!(parts[1].parse::<u64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));

        let ids: HashSet<String> = (0..200).map(|_| generate_character_id()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_class_summary() {
        let mut character = create_sample_character("Multi");
        assert_eq!(character.classes.summary(), "Fighter 1");

        let mut wizard = ClassEntry::level_one("Wizard", &CoreClasses);
        wizard.level = 2;
        character.classes.classes.push(wizard);
        character.classes.total_level = 3;
        assert_eq!(character.classes.summary(), "Fighter 1/Wizard 2");
    }

    #[test]
    fn test_change_class_replaces_entry() {
        let mut character = create_sample_character("Career Change");
        character.change_class("Wizard", &CoreClasses);
        assert_eq!(character.classes.classes.len(), 1);
        assert_eq!(character.classes.classes[0].name, "Wizard");
        assert_eq!(character.classes.classes[0].hit_die_size, 6);
        assert!(character.validate().is_valid);
    }
}
