//! Race reference data for the seven core races.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::abilities::Ability;

/// Creature size categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Size {
    Fine,
    Diminutive,
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
    Colossal,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Signed racial ability modifiers, one per ability (0 = none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AbilityModifiers {
    #[serde(default)]
    pub str: i32,
    #[serde(default)]
    pub dex: i32,
    #[serde(default)]
    pub con: i32,
    #[serde(default)]
    pub int: i32,
    #[serde(default)]
    pub wis: i32,
    #[serde(default)]
    pub cha: i32,
}

impl AbilityModifiers {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.str,
            Ability::Dexterity => self.dex,
            Ability::Constitution => self.con,
            Ability::Intelligence => self.int,
            Ability::Wisdom => self.wis,
            Ability::Charisma => self.cha,
        }
    }
}

/// Static reference data for one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceData {
    pub name: String,
    pub size: Size,
    /// Base land speed in feet.
    pub speed: u32,
    pub ability_modifiers: AbilityModifiers,
    pub traits: Vec<String>,
    pub languages: Vec<String>,
    pub vision: String,
}

impl Default for RaceData {
    fn default() -> Self {
        RaceData {
            name: String::new(),
            size: Size::Medium,
            speed: 30,
            ability_modifiers: AbilityModifiers::default(),
            traits: Vec::new(),
            languages: Vec::new(),
            vision: "Normal".to_string(),
        }
    }
}

/// Injected read-only race lookup. An unknown race name resolves to `None`;
/// there is no zero-modifier fallback, so callers must handle the miss.
pub trait RaceSource {
    fn race(&self, name: &str) -> Option<&RaceData>;
}

/// The built-in core race table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreRaces;

impl RaceSource for CoreRaces {
    fn race(&self, name: &str) -> Option<&RaceData> {
        race_by_name(name)
    }
}

/// Case-insensitive lookup in the core race table.
pub fn race_by_name(name: &str) -> Option<&'static RaceData> {
    CORE_RACES
        .iter()
        .find(|race| race.name.eq_ignore_ascii_case(name))
}

pub fn race_names() -> Vec<&'static str> {
    CORE_RACES.iter().map(|race| race.name.as_str()).collect()
}

/// Races that take +2 to one ability of the player's choice instead of
/// fixed modifiers.
pub const FLEXIBLE_ABILITY_RACES: [&str; 3] = ["Human", "Half-Elf", "Half-Orc"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

lazy_static! {
    /// The seven core races.
    pub static ref CORE_RACES: Vec<RaceData> = vec![
        RaceData {
            name: "Human".to_string(),
            size: Size::Medium,
            speed: 30,
            // +2 to one ability of choice, applied separately.
            ability_modifiers: AbilityModifiers::default(),
            traits: strings(&[
                "Bonus Feat: one extra feat at 1st level",
                "Skilled: one additional skill rank per level",
            ]),
            languages: strings(&["Common"]),
            vision: "Normal".to_string(),
        },
        RaceData {
            name: "Dwarf".to_string(),
            size: Size::Medium,
            speed: 20,
            ability_modifiers: AbilityModifiers { con: 2, wis: 2, cha: -2, ..Default::default() },
            traits: strings(&[
                "Darkvision 60 ft.",
                "Defensive Training: +4 dodge bonus to AC against giants",
                "Greed: +2 on Appraise checks for precious metals or gems",
                "Hardy: +2 on saves against poison, spells, and spell-like abilities",
                "Stability: +4 to CMD against bull rush or trip",
                "Stonecunning: +2 on Perception checks for unusual stonework",
                "Weapon Familiarity: battleaxes, heavy picks, and warhammers",
            ]),
            languages: strings(&["Common", "Dwarven"]),
            vision: "Darkvision 60 ft.".to_string(),
        },
        RaceData {
            name: "Elf".to_string(),
            size: Size::Medium,
            speed: 30,
            ability_modifiers: AbilityModifiers { dex: 2, int: 2, con: -2, ..Default::default() },
            traits: strings(&[
                "Low-Light Vision",
                "Elven Immunities: immune to magic sleep; +2 on saves against enchantment",
                "Elven Magic: +2 on caster level checks against spell resistance",
                "Keen Senses: +2 on Perception checks",
                "Weapon Familiarity: longbows, longswords, rapiers, and shortbows",
            ]),
            languages: strings(&["Common", "Elven"]),
            vision: "Low-Light Vision".to_string(),
        },
        RaceData {
            name: "Gnome".to_string(),
            size: Size::Small,
            speed: 20,
            ability_modifiers: AbilityModifiers { con: 2, cha: 2, str: -2, ..Default::default() },
            traits: strings(&[
                "Low-Light Vision",
                "Defensive Training: +4 dodge bonus to AC against giants",
                "Gnome Magic: +1 to DC of illusion spells cast",
                "Illusion Resistance: +2 on saves against illusions",
                "Keen Senses: +2 on Perception checks",
                "Obsessive: +2 on a chosen Craft or Profession",
            ]),
            languages: strings(&["Common", "Gnome", "Sylvan"]),
            vision: "Low-Light Vision".to_string(),
        },
        RaceData {
            name: "Half-Elf".to_string(),
            size: Size::Medium,
            speed: 30,
            // +2 to one ability of choice, applied separately.
            ability_modifiers: AbilityModifiers::default(),
            traits: strings(&[
                "Low-Light Vision",
                "Adaptability: Skill Focus as a bonus feat at 1st level",
                "Elf Blood: counts as both elf and human",
                "Elven Immunities: immune to magic sleep; +2 on saves against enchantment",
                "Keen Senses: +2 on Perception checks",
                "Multitalented: two favored classes",
            ]),
            languages: strings(&["Common", "Elven"]),
            vision: "Low-Light Vision".to_string(),
        },
        RaceData {
            name: "Half-Orc".to_string(),
            size: Size::Medium,
            speed: 30,
            // +2 to one ability of choice, applied separately.
            ability_modifiers: AbilityModifiers::default(),
            traits: strings(&[
                "Darkvision 60 ft.",
                "Intimidating: +2 on Intimidate checks",
                "Orc Blood: counts as both orc and human",
                "Orc Ferocity: once per day, fight one more round at 0 HP",
                "Weapon Familiarity: greataxes and falchions",
            ]),
            languages: strings(&["Common", "Orc"]),
            vision: "Darkvision 60 ft.".to_string(),
        },
        RaceData {
            name: "Halfling".to_string(),
            size: Size::Small,
            speed: 20,
            ability_modifiers: AbilityModifiers { dex: 2, cha: 2, str: -2, ..Default::default() },
            traits: strings(&[
                "Fearless: +2 on saves against fear",
                "Halfling Luck: +1 on all saving throws",
                "Keen Senses: +2 on Perception checks",
                "Sure-Footed: +2 on Acrobatics and Climb checks",
                "Weapon Familiarity: slings",
            ]),
            languages: strings(&["Common", "Halfling"]),
            vision: "Normal".to_string(),
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_core_races() {
        assert_eq!(CORE_RACES.len(), 7);
    }

    #[test]
    fn test_dwarf_modifiers() {
        let dwarf = race_by_name("Dwarf").unwrap();
        assert_eq!(dwarf.ability_modifiers.con, 2);
        assert_eq!(dwarf.ability_modifiers.wis, 2);
        assert_eq!(dwarf.ability_modifiers.cha, -2);
        assert_eq!(dwarf.ability_modifiers.str, 0);
        assert_eq!(dwarf.speed, 20);
        assert_eq!(dwarf.size, Size::Medium);
    }

    #[test]
    fn test_small_races() {
        assert_eq!(race_by_name("Gnome").unwrap().size, Size::Small);
        assert_eq!(race_by_name("Halfling").unwrap().size, Size::Small);
    }

    #[test]
    fn test_flexible_races_have_no_fixed_modifiers() {
        for name in FLEXIBLE_ABILITY_RACES {
            let race = race_by_name(name).unwrap();
            assert_eq!(race.ability_modifiers, AbilityModifiers::default());
        }
    }

    #[test]
    fn test_unknown_race_is_a_miss() {
        assert!(race_by_name("Tiefling").is_none());
        assert!(CoreRaces.race("Tiefling").is_none());
    }

    #[test]
    fn test_modifier_accessor() {
        let elf = race_by_name("Elf").unwrap();
        assert_eq!(elf.ability_modifiers.get(Ability::Dexterity), 2);
        assert_eq!(elf.ability_modifiers.get(Ability::Constitution), -2);
        assert_eq!(elf.ability_modifiers.get(Ability::Strength), 0);
    }
}
