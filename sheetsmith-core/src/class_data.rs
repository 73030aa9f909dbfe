//! Class reference data for the eleven core classes.
//!
//! Hit dice, progression tiers, skill ranks, class skill lists, and
//! level-gated features. Lookup goes through the [`ClassSource`] trait so
//! tests can substitute fixture tables.

use serde::{Deserialize, Serialize};

/// Base attack bonus progression tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BabProgression {
    /// +1 per level (fighter).
    Full,
    /// +3/4 per level (cleric).
    #[default]
    Medium,
    /// +1/2 per level (wizard).
    Low,
}

/// Saving throw progression tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SaveProgression {
    /// 2 + 1/2 per level.
    Good,
    /// 0 + 1/3 per level.
    #[default]
    Poor,
}

/// A class feature gained at a specific level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassFeatureDef {
    pub name: &'static str,
    pub description: &'static str,
    pub level: u32,
}

/// Static reference data for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassData {
    pub name: &'static str,
    pub hit_die: u32,
    pub skill_ranks_per_level: u32,
    pub class_skills: &'static [&'static str],
    pub bab_progression: BabProgression,
    pub fort_progression: SaveProgression,
    pub ref_progression: SaveProgression,
    pub will_progression: SaveProgression,
    pub features: &'static [ClassFeatureDef],
}

impl ClassData {
    /// Features gained at exactly the given level.
    pub fn features_at_level(&self, level: u32) -> impl Iterator<Item = &ClassFeatureDef> {
        self.features.iter().filter(move |f| f.level == level)
    }
}

/// Injected read-only class lookup.
pub trait ClassSource {
    fn class(&self, name: &str) -> Option<&ClassData>;
}

/// The built-in core class table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreClasses;

impl ClassSource for CoreClasses {
    fn class(&self, name: &str) -> Option<&ClassData> {
        class_by_name(name)
    }
}

/// Case-insensitive lookup in the core class table.
pub fn class_by_name(name: &str) -> Option<&'static ClassData> {
    CORE_CLASSES
        .iter()
        .find(|class| class.name.eq_ignore_ascii_case(name))
}

pub fn class_names() -> Vec<&'static str> {
    CORE_CLASSES.iter().map(|class| class.name).collect()
}

pub const CORE_CLASSES: [ClassData; 11] = [
    ClassData {
        name: "Barbarian",
        hit_die: 12,
        skill_ranks_per_level: 4,
        class_skills: &[
            "Acrobatics",
            "Climb",
            "Handle Animal",
            "Intimidate",
            "Knowledge (nature)",
            "Perception",
            "Ride",
            "Survival",
            "Swim",
        ],
        bab_progression: BabProgression::Full,
        fort_progression: SaveProgression::Good,
        ref_progression: SaveProgression::Poor,
        will_progression: SaveProgression::Poor,
        features: &[
            ClassFeatureDef {
                name: "Fast Movement",
                description: "+10 feet to base speed in light or medium armor.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Rage",
                description: "Enter a rage for bonus STR, CON, and Will saves at the cost of AC.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Uncanny Dodge",
                description: "Cannot be caught flat-footed.",
                level: 2,
            },
        ],
    },
    ClassData {
        name: "Bard",
        hit_die: 8,
        skill_ranks_per_level: 6,
        class_skills: &[
            "Acrobatics",
            "Appraise",
            "Bluff",
            "Diplomacy",
            "Disguise",
            "Escape Artist",
            "Intimidate",
            "Knowledge (all)",
            "Linguistics",
            "Perception",
            "Perform",
            "Sense Motive",
            "Sleight of Hand",
            "Spellcraft",
            "Stealth",
            "Use Magic Device",
        ],
        bab_progression: BabProgression::Medium,
        fort_progression: SaveProgression::Poor,
        ref_progression: SaveProgression::Good,
        will_progression: SaveProgression::Good,
        features: &[
            ClassFeatureDef {
                name: "Bardic Knowledge",
                description: "Add half bard level to all Knowledge checks.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Bardic Performance",
                description: "Use performance to produce magical effects on allies and enemies.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Cantrips",
                description: "Cast known 0-level spells at will.",
                level: 1,
            },
        ],
    },
    ClassData {
        name: "Cleric",
        hit_die: 8,
        skill_ranks_per_level: 2,
        class_skills: &[
            "Appraise",
            "Diplomacy",
            "Heal",
            "Knowledge (arcana)",
            "Knowledge (history)",
            "Knowledge (nobility)",
            "Knowledge (planes)",
            "Knowledge (religion)",
            "Linguistics",
            "Sense Motive",
            "Spellcraft",
        ],
        bab_progression: BabProgression::Medium,
        fort_progression: SaveProgression::Good,
        ref_progression: SaveProgression::Poor,
        will_progression: SaveProgression::Good,
        features: &[
            ClassFeatureDef {
                name: "Channel Energy",
                description: "Release a burst of divine energy to heal or harm.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Domains",
                description: "Choose two domains granting powers and bonus spells.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Orisons",
                description: "Cast prepared 0-level spells at will.",
                level: 1,
            },
        ],
    },
    ClassData {
        name: "Druid",
        hit_die: 8,
        skill_ranks_per_level: 4,
        class_skills: &[
            "Climb",
            "Fly",
            "Handle Animal",
            "Heal",
            "Knowledge (geography)",
            "Knowledge (nature)",
            "Perception",
            "Ride",
            "Spellcraft",
            "Survival",
            "Swim",
        ],
        bab_progression: BabProgression::Medium,
        fort_progression: SaveProgression::Good,
        ref_progression: SaveProgression::Poor,
        will_progression: SaveProgression::Good,
        features: &[
            ClassFeatureDef {
                name: "Nature Bond",
                description: "Gain an animal companion or a cleric domain tied to nature.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Nature Sense",
                description: "+2 on Knowledge (nature) and Survival checks.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Wild Empathy",
                description: "Improve the attitude of animals as if using Diplomacy.",
                level: 1,
            },
        ],
    },
    ClassData {
        name: "Fighter",
        hit_die: 10,
        skill_ranks_per_level: 2,
        class_skills: &[
            "Climb",
            "Handle Animal",
            "Intimidate",
            "Knowledge (dungeoneering)",
            "Knowledge (engineering)",
            "Ride",
            "Survival",
            "Swim",
        ],
        bab_progression: BabProgression::Full,
        fort_progression: SaveProgression::Good,
        ref_progression: SaveProgression::Poor,
        will_progression: SaveProgression::Poor,
        features: &[
            ClassFeatureDef {
                name: "Bonus Feat",
                description: "Gain a bonus combat feat at 1st level and every even level.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Bravery",
                description: "+1 on Will saves against fear per four fighter levels.",
                level: 2,
            },
        ],
    },
    ClassData {
        name: "Monk",
        hit_die: 8,
        skill_ranks_per_level: 4,
        class_skills: &[
            "Acrobatics",
            "Climb",
            "Escape Artist",
            "Intimidate",
            "Knowledge (history)",
            "Knowledge (religion)",
            "Perception",
            "Perform",
            "Ride",
            "Sense Motive",
            "Stealth",
            "Swim",
        ],
        bab_progression: BabProgression::Medium,
        fort_progression: SaveProgression::Good,
        ref_progression: SaveProgression::Good,
        will_progression: SaveProgression::Good,
        features: &[
            ClassFeatureDef {
                name: "AC Bonus",
                description: "Add Wisdom bonus to AC while unarmored.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Flurry of Blows",
                description: "Make an extra attack at a penalty when using monk weapons.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Unarmed Strike",
                description: "Unarmed strikes deal 1d6 damage and count as armed.",
                level: 1,
            },
        ],
    },
    ClassData {
        name: "Paladin",
        hit_die: 10,
        skill_ranks_per_level: 2,
        class_skills: &[
            "Diplomacy",
            "Handle Animal",
            "Heal",
            "Knowledge (nobility)",
            "Knowledge (religion)",
            "Ride",
            "Sense Motive",
            "Spellcraft",
        ],
        bab_progression: BabProgression::Full,
        fort_progression: SaveProgression::Good,
        ref_progression: SaveProgression::Poor,
        will_progression: SaveProgression::Good,
        features: &[
            ClassFeatureDef {
                name: "Aura of Good",
                description: "Radiate an aura of good equal to paladin level.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Detect Evil",
                description: "Use detect evil at will.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Smite Evil",
                description: "Add Charisma bonus to attacks and level to damage against evil foes.",
                level: 1,
            },
        ],
    },
    ClassData {
        name: "Ranger",
        hit_die: 10,
        skill_ranks_per_level: 6,
        class_skills: &[
            "Climb",
            "Handle Animal",
            "Heal",
            "Intimidate",
            "Knowledge (dungeoneering)",
            "Knowledge (geography)",
            "Knowledge (nature)",
            "Perception",
            "Ride",
            "Spellcraft",
            "Stealth",
            "Survival",
            "Swim",
        ],
        bab_progression: BabProgression::Full,
        fort_progression: SaveProgression::Good,
        ref_progression: SaveProgression::Good,
        will_progression: SaveProgression::Poor,
        features: &[
            ClassFeatureDef {
                name: "Favored Enemy",
                description: "+2 on attacks, damage, and key skills against a chosen creature type.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Track",
                description: "Add half ranger level on Survival checks to follow tracks.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Wild Empathy",
                description: "Improve the attitude of animals as if using Diplomacy.",
                level: 1,
            },
        ],
    },
    ClassData {
        name: "Rogue",
        hit_die: 8,
        skill_ranks_per_level: 8,
        class_skills: &[
            "Acrobatics",
            "Appraise",
            "Bluff",
            "Climb",
            "Diplomacy",
            "Disable Device",
            "Disguise",
            "Escape Artist",
            "Intimidate",
            "Knowledge (local)",
            "Linguistics",
            "Perception",
            "Perform",
            "Sense Motive",
            "Sleight of Hand",
            "Stealth",
            "Swim",
            "Use Magic Device",
        ],
        bab_progression: BabProgression::Medium,
        fort_progression: SaveProgression::Poor,
        ref_progression: SaveProgression::Good,
        will_progression: SaveProgression::Poor,
        features: &[
            ClassFeatureDef {
                name: "Sneak Attack",
                description: "Deal +1d6 damage when the target is denied its Dexterity bonus.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Trapfinding",
                description: "Add half rogue level on Perception and Disable Device against traps.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Evasion",
                description: "Take no damage on a successful Reflex save for half.",
                level: 2,
            },
        ],
    },
    ClassData {
        name: "Sorcerer",
        hit_die: 6,
        skill_ranks_per_level: 2,
        class_skills: &[
            "Appraise",
            "Bluff",
            "Fly",
            "Intimidate",
            "Knowledge (arcana)",
            "Spellcraft",
            "Use Magic Device",
        ],
        bab_progression: BabProgression::Low,
        fort_progression: SaveProgression::Poor,
        ref_progression: SaveProgression::Poor,
        will_progression: SaveProgression::Good,
        features: &[
            ClassFeatureDef {
                name: "Bloodline",
                description: "An arcane bloodline grants bonus spells, feats, and powers.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Cantrips",
                description: "Cast known 0-level spells at will.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Eschew Materials",
                description: "Cast spells without most material components.",
                level: 1,
            },
        ],
    },
    ClassData {
        name: "Wizard",
        hit_die: 6,
        skill_ranks_per_level: 2,
        class_skills: &[
            "Appraise",
            "Fly",
            "Knowledge (all)",
            "Linguistics",
            "Spellcraft",
        ],
        bab_progression: BabProgression::Low,
        fort_progression: SaveProgression::Poor,
        ref_progression: SaveProgression::Poor,
        will_progression: SaveProgression::Good,
        features: &[
            ClassFeatureDef {
                name: "Arcane Bond",
                description: "Form a bond with a familiar or an object.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Arcane School",
                description: "Specialize in a school of magic for extra spells and powers.",
                level: 1,
            },
            ClassFeatureDef {
                name: "Scribe Scroll",
                description: "Gain Scribe Scroll as a bonus feat.",
                level: 1,
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_classes_have_data() {
        assert_eq!(CORE_CLASSES.len(), 11);
        for class in &CORE_CLASSES {
            assert!(class.hit_die >= 6);
            assert!(class.skill_ranks_per_level >= 2);
            assert!(!class.class_skills.is_empty());
            assert!(class.features_at_level(1).count() > 0);
        }
    }

    #[test]
    fn test_fighter_data() {
        let fighter = class_by_name("Fighter").unwrap();
        assert_eq!(fighter.hit_die, 10);
        assert_eq!(fighter.bab_progression, BabProgression::Full);
        assert_eq!(fighter.fort_progression, SaveProgression::Good);
        assert_eq!(fighter.will_progression, SaveProgression::Poor);
        assert_eq!(fighter.skill_ranks_per_level, 2);
    }

    #[test]
    fn test_wizard_data() {
        let wizard = class_by_name("Wizard").unwrap();
        assert_eq!(wizard.hit_die, 6);
        assert_eq!(wizard.bab_progression, BabProgression::Low);
        assert_eq!(wizard.will_progression, SaveProgression::Good);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(class_by_name("rogue").is_some());
        assert!(class_by_name("ROGUE").is_some());
        assert!(class_by_name("Spellsword").is_none());
    }

    #[test]
    fn test_features_are_level_gated() {
        let rogue = class_by_name("Rogue").unwrap();
        assert!(rogue.features_at_level(1).any(|f| f.name == "Sneak Attack"));
        assert!(rogue.features_at_level(2).any(|f| f.name == "Evasion"));
        assert!(!rogue.features_at_level(1).any(|f| f.name == "Evasion"));
    }

    #[test]
    fn test_core_classes_implements_source() {
        let source = CoreClasses;
        assert_eq!(source.class("Monk").unwrap().hit_die, 8);
    }
}
