//! Typed bonuses and their stacking rules.
//!
//! Bonuses of the same type do not stack: only the highest active bonus of
//! each type applies. Untyped bonuses always stack.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Bonus types recognized by the stacking rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BonusType {
    Alchemical,
    Armor,
    Circumstance,
    Competence,
    Deflection,
    Dodge,
    Enhancement,
    Inherent,
    Insight,
    Luck,
    Morale,
    Natural,
    Profane,
    Racial,
    Resistance,
    Sacred,
    Shield,
    Size,
    Trait,
    Untyped,
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BonusType::Alchemical => "alchemical",
            BonusType::Armor => "armor",
            BonusType::Circumstance => "circumstance",
            BonusType::Competence => "competence",
            BonusType::Deflection => "deflection",
            BonusType::Dodge => "dodge",
            BonusType::Enhancement => "enhancement",
            BonusType::Inherent => "inherent",
            BonusType::Insight => "insight",
            BonusType::Luck => "luck",
            BonusType::Morale => "morale",
            BonusType::Natural => "natural",
            BonusType::Profane => "profane",
            BonusType::Racial => "racial",
            BonusType::Resistance => "resistance",
            BonusType::Sacred => "sacred",
            BonusType::Shield => "shield",
            BonusType::Size => "size",
            BonusType::Trait => "trait",
            BonusType::Untyped => "untyped",
        };
        write!(f, "{name}")
    }
}

/// A single tracked bonus with its source and activation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    #[serde(rename = "type")]
    pub bonus_type: BonusType,
    pub value: i32,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Bonus {
    pub fn new(bonus_type: BonusType, value: i32, source: impl Into<String>) -> Self {
        Bonus {
            bonus_type,
            value,
            source: source.into(),
            condition: None,
            active: true,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Aggregate a list of bonuses under the stacking rules: untyped bonuses
/// sum, every other type contributes only its single highest active value.
/// Inactive bonuses never count.
pub fn stacked_total(bonuses: &[Bonus]) -> i32 {
    let mut untyped = 0;
    let mut highest: BTreeMap<BonusType, i32> = BTreeMap::new();

    for bonus in bonuses.iter().filter(|b| b.active) {
        if bonus.bonus_type == BonusType::Untyped {
            untyped += bonus.value;
        } else {
            let entry = highest.entry(bonus.bonus_type).or_insert(0);
            *entry = (*entry).max(bonus.value);
        }
    }

    untyped + highest.values().sum::<i32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped_bonuses_stack() {
        let bonuses = vec![
            Bonus::new(BonusType::Untyped, 1, "trait"),
            Bonus::new(BonusType::Untyped, 2, "feat"),
        ];
        assert_eq!(stacked_total(&bonuses), 3);
    }

    #[test]
    fn test_typed_bonuses_take_highest() {
        let bonuses = vec![
            Bonus::new(BonusType::Enhancement, 2, "bull's strength"),
            Bonus::new(BonusType::Enhancement, 4, "belt of giant strength"),
        ];
        assert_eq!(stacked_total(&bonuses), 4);
    }

    #[test]
    fn test_distinct_types_stack_with_each_other() {
        let bonuses = vec![
            Bonus::new(BonusType::Enhancement, 2, "magic weapon"),
            Bonus::new(BonusType::Morale, 1, "heroism"),
            Bonus::new(BonusType::Untyped, 1, "misc"),
        ];
        assert_eq!(stacked_total(&bonuses), 4);
    }

    #[test]
    fn test_inactive_bonuses_ignored() {
        let mut suppressed = Bonus::new(BonusType::Enhancement, 6, "dispelled item");
        suppressed.active = false;
        let bonuses = vec![suppressed, Bonus::new(BonusType::Enhancement, 2, "weapon")];
        assert_eq!(stacked_total(&bonuses), 2);
    }

    #[test]
    fn test_bonus_active_defaults_true_on_deserialize() {
        let bonus: Bonus =
            serde_json::from_str(r#"{"type":"luck","value":1,"source":"stone"}"#).unwrap();
        assert!(bonus.active);
        assert_eq!(bonus.bonus_type, BonusType::Luck);
    }
}
