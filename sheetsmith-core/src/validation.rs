//! Cross-cutting rule checks.
//!
//! Every validator returns a [`ValidationReport`]. Errors mean the data
//! cannot be accepted as-is; warnings mean accepted-but-flagged. Nothing in
//! this module panics on bad input.

use serde::{Deserialize, Serialize};

use crate::abilities::{self, Ability, AbilityScores, GenerationMethod};
use crate::dice::DiceRoll;
use crate::race_data::RaceData;

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        ValidationReport {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.is_valid = self.is_valid && other.is_valid;
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        ValidationReport::new()
    }
}

/// Valid base-score ranges per generation method, plus the universal
/// warnings for extreme scores.
pub fn validate_ability_scores(
    scores: &AbilityScores,
    method: GenerationMethod,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    for ability in Ability::all() {
        let score = scores.get(ability).base;
        let abbr = ability.abbreviation();

        if score < 1 {
            report.error(format!("{abbr} cannot be less than 1"));
        } else if score > 25 {
            report.error(format!("{abbr} cannot be greater than 25"));
        }

        match method {
            GenerationMethod::PointBuy => {
                if !(7..=18).contains(&score) {
                    report.error(format!(
                        "{abbr} must be between 7-18 for point buy (got {score})"
                    ));
                }
            }
            GenerationMethod::Roll3d6 => {
                if !(3..=18).contains(&score) {
                    report.error(format!(
                        "{abbr} must be between 3-18 for 3d6 rolls (got {score})"
                    ));
                }
            }
            GenerationMethod::Roll4d6DropLowest => {
                if !(3..=18).contains(&score) {
                    report.error(format!(
                        "{abbr} must be between 3-18 for 4d6 drop lowest (got {score})"
                    ));
                }
            }
            GenerationMethod::CustomDice => {}
        }

        if score <= 6 {
            report.warning(format!(
                "{abbr} of {score} is very low and may severely impact gameplay"
            ));
        }
        if score >= 18 && method != GenerationMethod::PointBuy {
            report.warning(format!("{abbr} of {score} is very high"));
        }
    }

    if scores.con.base <= 0 {
        report.error("Constitution cannot be 0 or negative (character would be dead)");
    }

    report
}

/// Service-level point-buy validation. Agrees with
/// [`abilities::validate_point_buy`] on the valid/invalid outcome, with
/// extra build-quality warnings on top.
pub fn validate_point_buy(scores: &AbilityScores, points: i32) -> ValidationReport {
    let mut report = ValidationReport::new();

    if !(0..=100).contains(&points) {
        report.error(format!("Invalid point buy total: {points}"));
        return report;
    }

    let mut total_cost = 0;
    for ability in Ability::all() {
        let score = scores.get(ability).base;
        match abilities::point_cost(score) {
            Some(cost) => total_cost += cost,
            None => report.error(format!(
                "{} score {} is outside point buy range (7-18)",
                ability.abbreviation(),
                score
            )),
        }
    }

    if total_cost > points {
        report.error(format!(
            "Point buy exceeds limit: {total_cost}/{points} points used"
        ));
    } else if total_cost < points - 3 {
        report.warning(format!(
            "{} unused points remaining (consider optimizing allocation)",
            points - total_cost
        ));
    }

    let bases: Vec<i32> = Ability::all()
        .iter()
        .map(|&a| scores.get(a).base)
        .collect();
    let max = bases.iter().copied().max().unwrap_or(0);
    let min = bases.iter().copied().min().unwrap_or(0);
    if max - min > 11 {
        report.warning("Very unbalanced ability spread detected");
    }

    for ability in Ability::all() {
        let score = scores.get(ability).base;
        if score <= 8 {
            report.warning(format!(
                "{} is very low ({score}) - consider if this fits your character concept",
                ability.abbreviation()
            ));
        }
    }

    report
}

/// Cross-check rolled base scores against their recorded roll history.
/// An empty history is valid but cannot be verified.
pub fn validate_rolled_stats(scores: &AbilityScores, roll_history: &[DiceRoll]) -> ValidationReport {
    let mut report = ValidationReport::new();

    if roll_history.is_empty() {
        report.warning("No roll history provided - cannot verify legitimacy of rolled stats");
        return report;
    }

    let missing: Vec<&str> = Ability::all()
        .iter()
        .map(|a| a.abbreviation())
        .filter(|abbr| !roll_history.iter().any(|r| r.ability == *abbr))
        .collect();
    if !missing.is_empty() {
        report.error(format!("Missing roll history for: {}", missing.join(", ")));
    }

    for ability in Ability::all() {
        let abbr = ability.abbreviation();
        let Some(roll) = roll_history.iter().find(|r| r.ability == abbr) else {
            continue;
        };
        let score = scores.get(ability).base;

        if roll.total != score {
            report.error(format!(
                "{abbr} score {score} doesn't match roll total {}",
                roll.total
            ));
        }

        if !roll_is_consistent(roll) {
            report.error(format!("Invalid roll data for {abbr}: {:?}", roll.rolls));
        }
    }

    // Statistical sanity: ability rolls keep three d6.
    let totals: Vec<i32> = roll_history.iter().map(|r| r.total).collect();
    let average = totals.iter().sum::<i32>() as f64 / totals.len() as f64;
    if average > 10.5 + 2.0 {
        report.warning(format!(
            "Average roll ({average:.1}) is higher than expected (10.5)"
        ));
    }

    let impossible: Vec<String> = roll_history
        .iter()
        .filter(|r| r.total < 3 || r.total > 18)
        .map(|r| format!("{}:{}", r.ability, r.total))
        .collect();
    if !impossible.is_empty() {
        report.error(format!(
            "Impossible roll totals detected: {}",
            impossible.join(", ")
        ));
    }

    report
}

/// Kept dice must be real d6 results summing to the reported total.
fn roll_is_consistent(roll: &DiceRoll) -> bool {
    if roll.rolls.is_empty() {
        return false;
    }
    if !roll.rolls.iter().all(|&r| (1..=6).contains(&r)) {
        return false;
    }
    roll.rolls.iter().map(|&r| r as i32).sum::<i32>() == roll.total
}

/// Characters that are never allowed in a character name.
const INVALID_NAME_CHARS: &str = "<>{}[]\\/|`~!@#$%^&*()+=";

/// Name rules: required, bounded length, restricted character set, plus
/// heuristics for names that look like placeholders.
pub fn validate_character_name(name: &str) -> ValidationReport {
    let mut report = ValidationReport::new();

    if name.trim().is_empty() {
        report.error("Character name is required");
        return report;
    }

    let length = name.chars().count();
    if length > 50 {
        report.error("Character name must be 50 characters or less");
    } else if length > 30 {
        report.warning("Character name is quite long");
    }
    if length < 2 {
        report.warning("Character name is very short");
    }

    let mut offending: Vec<char> = Vec::new();
    for c in name.chars().filter(|c| INVALID_NAME_CHARS.contains(*c)) {
        if !offending.contains(&c) {
            offending.push(c);
        }
    }
    if !offending.is_empty() {
        report.error(format!(
            "Character name contains invalid characters: {}",
            offending.iter().collect::<String>()
        ));
    }

    let lower = name.to_lowercase();
    if lower.contains("test") || lower.contains("temp") {
        report.warning("Name suggests this might be a test character");
    }

    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        report.warning("Name is only numbers");
    }

    if name.trim() != name {
        report.warning("Name has leading or trailing whitespace");
    }

    report
}

/// Dice formula syntax check with structured errors, mirroring the grammar
/// of [`crate::dice::DiceFormula::parse`] but reporting what went wrong
/// instead of returning a sentinel.
pub fn validate_dice_formula(formula: &str) -> ValidationReport {
    let mut report = ValidationReport::new();

    if formula.trim().is_empty() {
        report.error("Dice formula is required");
        return report;
    }

    let Some((count, sides, keep, modifier)) = split_formula(formula) else {
        report.error(format!(
            "Invalid dice formula format: \"{formula}\". Expected format: XdY[kZ][+/-N] (e.g., 4d6k3, 3d6+1)"
        ));
        return report;
    };

    if !(1..=20).contains(&count) {
        report.error(format!("Number of dice must be between 1-20 (got {count})"));
    }
    if !(2..=100).contains(&sides) {
        report.error(format!("Die size must be between 2-100 (got {sides})"));
    }

    if let Some(keep) = keep {
        if keep < 1 {
            report.error(format!("Keep value must be at least 1 (got {keep})"));
        } else if keep > count {
            report.error(format!(
                "Cannot keep more dice ({keep}) than rolled ({count})"
            ));
        } else if keep == count {
            report.warning(format!(
                "Keeping all dice ({keep}/{count}) - consider removing 'k' modifier"
            ));
        }
    }

    if let Some(modifier) = modifier {
        if modifier.abs() > 50 {
            report.warning(format!("Large modifier ({modifier}) detected"));
        }
    }

    if ![4, 6, 8, 10, 12, 20].contains(&sides) && (2..=100).contains(&sides) {
        report.warning(format!("Unusual die size: d{sides}"));
    }
    if count > 10 && count <= 20 {
        report.warning(format!("Rolling many dice ({count}) - this may be slow"));
    }

    report
}

/// Structural split of `XdY[kZ][+/-N]` with no bounds checking; bounds are
/// reported separately by `validate_dice_formula`.
fn split_formula(formula: &str) -> Option<(u64, u64, Option<u64>, Option<i64>)> {
    let clean: String = formula
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let d_pos = clean.find('d')?;
    let count: u64 = clean[..d_pos].parse().ok()?;
    let rest = &clean[d_pos + 1..];

    let (dice_part, modifier) = match rest.rfind(['+', '-']) {
        Some(pos) => (&rest[..pos], Some(rest[pos..].parse::<i64>().ok()?)),
        None => (rest, None),
    };

    let (sides_str, keep) = match dice_part.find('k') {
        Some(pos) => (
            &dice_part[..pos],
            Some(dice_part[pos + 1..].parse::<u64>().ok()?),
        ),
        None => (dice_part, None),
    };
    let sides: u64 = sides_str.parse().ok()?;

    Some((count, sides, keep, modifier))
}

/// Curated good-fit classes per race. Humans fit anything.
fn race_synergies(race_name: &str) -> &'static [&'static str] {
    match race_name {
        "Elf" => &["Wizard", "Ranger", "Fighter"],
        "Dwarf" => &["Fighter", "Cleric", "Barbarian"],
        "Halfling" => &["Rogue", "Ranger", "Bard"],
        "Half-Orc" => &["Barbarian", "Fighter", "Ranger"],
        "Human" => &["Any"],
        _ => &[],
    }
}

/// Abilities a class depends on, for penalty warnings.
fn class_key_abilities(class_name: &str) -> &'static [Ability] {
    match class_name {
        "Fighter" => &[Ability::Strength, Ability::Constitution],
        "Wizard" => &[Ability::Intelligence],
        "Cleric" => &[Ability::Wisdom],
        "Rogue" => &[Ability::Dexterity],
        "Ranger" => &[Ability::Dexterity, Ability::Wisdom],
        "Barbarian" => &[Ability::Strength, Ability::Constitution],
        "Bard" => &[Ability::Charisma],
        "Sorcerer" => &[Ability::Charisma],
        "Paladin" => &[Ability::Strength, Ability::Charisma],
        "Monk" => &[Ability::Dexterity, Ability::Wisdom],
        _ => &[],
    }
}

/// Race/class combinations are never forbidden, but unusual pairings and
/// racial penalties to a class's key ability are flagged.
pub fn validate_race_class_combination(race: &RaceData, class_name: &str) -> ValidationReport {
    let mut report = ValidationReport::new();

    if race.name.trim().is_empty() {
        report.error("Race is required");
    }
    if class_name.trim().is_empty() {
        report.error("Class is required");
    }
    if !report.is_valid {
        return report;
    }

    let good_classes = race_synergies(&race.name);
    if !good_classes.is_empty()
        && !good_classes.contains(&"Any")
        && !good_classes.contains(&class_name)
    {
        report.warning(format!(
            "{} and {} is an unusual combination. Consider: {}",
            race.name,
            class_name,
            good_classes.join(", ")
        ));
    }

    for &ability in class_key_abilities(class_name) {
        if race.ability_modifiers.get(ability) < 0 {
            report.warning(format!(
                "{} has a penalty to {}, which is important for {}",
                race.name,
                ability.abbreviation(),
                class_name
            ));
        }
    }

    report
}
