//! Ability scores: generation methods, point buy, and the recalculation
//! pass that keeps derived totals consistent.
//!
//! An [`AbilityScore`] is never updated incrementally. Mutate its inputs
//! (base, racial, damage, tracked bonuses) and run
//! [`AbilityScore::recalculate`]; the pass is idempotent and safe to repeat
//! after any change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::bonus::{stacked_total, Bonus, BonusType};
use crate::validation::ValidationReport;

/// The six abilities, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

/// How a character's ability scores were generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GenerationMethod {
    #[default]
    PointBuy,
    Roll3d6,
    Roll4d6DropLowest,
    CustomDice,
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationMethod::PointBuy => "Point Buy",
            GenerationMethod::Roll3d6 => "3d6 Straight",
            GenerationMethod::Roll4d6DropLowest => "4d6 Drop Lowest",
            GenerationMethod::CustomDice => "Custom Dice",
        };
        write!(f, "{name}")
    }
}

/// The modifier for a total score: floor((score - 10) / 2).
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// One tracked ability score with all of its inputs and derived values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityScore {
    /// Generation input (point buy or roll total).
    pub base: i32,
    /// Signed racial modifier. Set wholesale on race (re)application.
    pub racial: i32,
    /// Inherent bonuses (wishes, tomes).
    pub inherent: i32,
    /// Temporary ability damage.
    pub damage: i32,
    /// Ability drain (persists until healed).
    pub drain: i32,
    /// Tracked bonuses, bucketed by type.
    #[serde(default)]
    pub bonuses: BTreeMap<BonusType, Vec<Bonus>>,

    // Derived by `recalculate`, never edited directly.
    pub total: i32,
    pub modifier: i32,
    pub temp_total: i32,
    pub temp_modifier: i32,
}

impl AbilityScore {
    /// A fresh score with the given base and everything else zeroed.
    pub fn with_base(base: i32) -> Self {
        let mut score = AbilityScore {
            base,
            racial: 0,
            inherent: 0,
            damage: 0,
            drain: 0,
            bonuses: BTreeMap::new(),
            total: 0,
            modifier: 0,
            temp_total: 0,
            temp_modifier: 0,
        };
        score.recalculate();
        score
    }

    /// Track a bonus under its type bucket. Call [`recalculate`](Self::recalculate)
    /// (or the owning character's recalculation pass) afterwards.
    pub fn add_bonus(&mut self, bonus: Bonus) {
        self.bonuses.entry(bonus.bonus_type).or_default().push(bonus);
    }

    /// Recompute every derived field from the inputs.
    ///
    /// total = base + racial + inherent + stacked bonuses;
    /// temp_total = max(0, total - damage - drain).
    pub fn recalculate(&mut self) {
        let mut total = self.base + self.racial + self.inherent;
        for bonuses in self.bonuses.values() {
            total += stacked_total(bonuses);
        }

        self.total = total;
        self.temp_total = (total - self.damage - self.drain).max(0);
        self.modifier = ability_modifier(self.total);
        self.temp_modifier = ability_modifier(self.temp_total);
    }
}

impl Default for AbilityScore {
    fn default() -> Self {
        AbilityScore::with_base(10)
    }
}

/// The full six-score block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AbilityScores {
    pub str: AbilityScore,
    pub dex: AbilityScore,
    pub con: AbilityScore,
    pub int: AbilityScore,
    pub wis: AbilityScore,
    pub cha: AbilityScore,
}

impl AbilityScores {
    /// Build from six base values in STR..CHA order.
    pub fn from_bases(bases: [i32; 6]) -> Self {
        let mut scores = AbilityScores::default();
        for (ability, base) in Ability::all().into_iter().zip(bases) {
            *scores.get_mut(ability) = AbilityScore::with_base(base);
        }
        scores
    }

    pub fn get(&self, ability: Ability) -> &AbilityScore {
        match ability {
            Ability::Strength => &self.str,
            Ability::Dexterity => &self.dex,
            Ability::Constitution => &self.con,
            Ability::Intelligence => &self.int,
            Ability::Wisdom => &self.wis,
            Ability::Charisma => &self.cha,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut AbilityScore {
        match ability {
            Ability::Strength => &mut self.str,
            Ability::Dexterity => &mut self.dex,
            Ability::Constitution => &mut self.con,
            Ability::Intelligence => &mut self.int,
            Ability::Wisdom => &mut self.wis,
            Ability::Charisma => &mut self.cha,
        }
    }

    /// Run the recalculation pass over all six scores.
    pub fn recalculate_all(&mut self) {
        for ability in Ability::all() {
            self.get_mut(ability).recalculate();
        }
    }
}

/// Named point-buy budget presets.
pub const POINT_BUY_PRESETS: [(&str, i32); 3] = [
    ("Low Fantasy", 15),
    ("Standard Fantasy", 20),
    ("High Fantasy", 25),
];

/// Smallest allowed custom point-buy budget.
pub const MIN_CUSTOM_POINTS: i32 = 5;
/// Largest allowed custom point-buy budget.
pub const MAX_CUSTOM_POINTS: i32 = 50;

/// Point cost of buying a score. Only 7..=18 have a defined cost; callers
/// must range-check first.
pub fn point_cost(score: i32) -> Option<i32> {
    match score {
        7 => Some(-4),
        8 => Some(-2),
        9 => Some(-1),
        10 => Some(0),
        11 => Some(1),
        12 => Some(2),
        13 => Some(3),
        14 => Some(5),
        15 => Some(7),
        16 => Some(10),
        17 => Some(13),
        18 => Some(17),
        _ => None,
    }
}

/// Validate a point-buy allocation against a budget. Each out-of-range score
/// is its own error; leaving more than 2 points unspent is a warning.
pub fn validate_point_buy(scores: &AbilityScores, total_points: i32) -> ValidationReport {
    let mut report = ValidationReport::new();
    let mut total_cost = 0;

    for ability in Ability::all() {
        let base = scores.get(ability).base;
        match point_cost(base) {
            Some(cost) => total_cost += cost,
            None => report.error(format!(
                "{} score {} is outside valid range (7-18)",
                ability.abbreviation(),
                base
            )),
        }
    }

    if total_cost > total_points {
        report.error(format!(
            "Point buy exceeds limit: {total_cost}/{total_points} points used"
        ));
    } else if total_cost < total_points - 2 {
        report.warning(format!(
            "{} unused points remaining",
            total_points - total_cost
        ));
    }

    report
}

/// Validate a custom point-buy budget: hard bounds 5..=50, with warnings for
/// budgets that are legal but likely to produce weak (<15) or overpowered
/// (>30) characters.
pub fn validate_custom_point_buy(total_points: i32) -> ValidationReport {
    let mut report = ValidationReport::new();

    if total_points < MIN_CUSTOM_POINTS {
        report.error(format!(
            "Custom point buy too low: {total_points} (minimum: {MIN_CUSTOM_POINTS})"
        ));
    } else if total_points > MAX_CUSTOM_POINTS {
        report.error(format!(
            "Custom point buy too high: {total_points} (maximum: {MAX_CUSTOM_POINTS})"
        ));
    } else if total_points < 15 {
        report.warning("Very low point buy may result in weak characters");
    } else if total_points > 30 {
        report.warning("Very high point buy may result in overpowered characters");
    }

    report
}
