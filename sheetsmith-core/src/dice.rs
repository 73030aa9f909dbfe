//! Dice rolling for ability score generation.
//!
//! Supports the classic generation rolls (3d6, 4d6 drop lowest) and custom
//! formulas in `XdY[kZ][+/-N]` notation (e.g. `4d6k3+2`).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::abilities::{Ability, GenerationMethod};

/// Error type for dice parsing and rolling.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Invalid dice formula: {0}")]
    InvalidFormula(String),
    #[error("{0} is not a rolling method")]
    UnsupportedMethod(GenerationMethod),
}

/// A recorded dice roll, optionally tagged with the ability it was rolled for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Ability abbreviation ("STR".."CHA"), or empty for untagged rolls.
    #[serde(default)]
    pub ability: String,
    /// The kept dice only. Dropped dice are not recorded.
    pub rolls: Vec<u32>,
    pub total: i32,
    /// Epoch milliseconds at roll time.
    pub timestamp: u64,
}

impl DiceRoll {
    fn from_kept(rolls: Vec<u32>, modifier: i32) -> Self {
        let total = rolls.iter().map(|&r| r as i32).sum::<i32>() + modifier;
        DiceRoll {
            ability: String::new(),
            rolls,
            total,
            timestamp: now_millis(),
        }
    }
}

/// Epoch milliseconds. Time only enters the core through this helper
/// (roll timestamps, `last_updated`, character ids).
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Roll 3d6 straight.
pub fn roll_3d6() -> DiceRoll {
    roll_3d6_with_rng(&mut rand::thread_rng())
}

pub fn roll_3d6_with_rng<R: Rng>(rng: &mut R) -> DiceRoll {
    let rolls: Vec<u32> = (0..3).map(|_| rng.gen_range(1..=6)).collect();
    DiceRoll::from_kept(rolls, 0)
}

/// Roll 4d6, sort descending, keep the top three.
pub fn roll_4d6_drop_lowest() -> DiceRoll {
    roll_4d6_drop_lowest_with_rng(&mut rand::thread_rng())
}

pub fn roll_4d6_drop_lowest_with_rng<R: Rng>(rng: &mut R) -> DiceRoll {
    let mut rolls: Vec<u32> = (0..4).map(|_| rng.gen_range(1..=6)).collect();
    rolls.sort_by(|a, b| b.cmp(a));
    rolls.truncate(3);
    DiceRoll::from_kept(rolls, 0)
}

/// Roll one set of six ability scores, one roll per ability in STR..CHA
/// order, each tagged with the ability abbreviation.
pub fn roll_all_abilities(method: GenerationMethod) -> Result<Vec<DiceRoll>, DiceError> {
    roll_all_abilities_with_rng(method, &mut rand::thread_rng())
}

pub fn roll_all_abilities_with_rng<R: Rng>(
    method: GenerationMethod,
    rng: &mut R,
) -> Result<Vec<DiceRoll>, DiceError> {
    Ability::all()
        .iter()
        .map(|ability| {
            let mut roll = match method {
                GenerationMethod::Roll3d6 => roll_3d6_with_rng(rng),
                GenerationMethod::Roll4d6DropLowest => roll_4d6_drop_lowest_with_rng(rng),
                other => return Err(DiceError::UnsupportedMethod(other)),
            };
            roll.ability = ability.abbreviation().to_string();
            Ok(roll)
        })
        .collect()
}

/// A parsed custom dice formula: `XdY[kZ][+/-N]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceFormula {
    pub count: u32,
    pub sides: u32,
    pub keep: Option<u32>,
    pub modifier: Option<i32>,
}

impl DiceFormula {
    /// Parse a formula string. Whitespace is ignored and the notation is
    /// case-insensitive. Returns `None` for anything malformed or out of
    /// bounds (count 1-20, sides 2-100, keep 1..=count); the `None` is a
    /// parse-failure sentinel, not an error value.
    pub fn parse(formula: &str) -> Option<DiceFormula> {
        let clean: String = formula
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        let d_pos = clean.find('d')?;
        let count: u32 = clean[..d_pos].parse().ok()?;
        let rest = &clean[d_pos + 1..];

        // Split off a trailing +N / -N modifier first.
        let (dice_part, modifier) = match rest.rfind(['+', '-']) {
            Some(pos) => {
                let modifier: i32 = rest[pos..].parse().ok()?;
                (&rest[..pos], Some(modifier))
            }
            None => (rest, None),
        };

        let (sides_str, keep) = match dice_part.find('k') {
            Some(pos) => {
                let keep: u32 = dice_part[pos + 1..].parse().ok()?;
                (&dice_part[..pos], Some(keep))
            }
            None => (dice_part, None),
        };
        let sides: u32 = sides_str.parse().ok()?;

        if !(1..=20).contains(&count) || !(2..=100).contains(&sides) {
            return None;
        }
        if let Some(keep) = keep {
            if keep < 1 || keep > count {
                return None;
            }
        }

        Some(DiceFormula {
            count,
            sides,
            keep,
            modifier,
        })
    }

    /// Roll this formula: `count` dice of `sides`, keep-highest truncation
    /// if `keep` is set, then the flat modifier.
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> DiceRoll {
        let mut rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();

        if let Some(keep) = self.keep {
            if (keep as usize) < rolls.len() {
                rolls.sort_by(|a, b| b.cmp(a));
                rolls.truncate(keep as usize);
            }
        }

        DiceRoll::from_kept(rolls, self.modifier.unwrap_or(0))
    }
}

impl FromStr for DiceFormula {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceFormula::parse(s).ok_or_else(|| DiceError::InvalidFormula(s.to_string()))
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if let Some(keep) = self.keep {
            write!(f, "k{keep}")?;
        }
        if let Some(modifier) = self.modifier {
            write!(f, "{modifier:+}")?;
        }
        Ok(())
    }
}

/// Roll a custom formula string. Unlike [`DiceFormula::parse`], a malformed
/// formula here is a hard error.
pub fn roll_formula(formula: &str) -> Result<DiceRoll, DiceError> {
    roll_formula_with_rng(formula, &mut rand::thread_rng())
}

pub fn roll_formula_with_rng<R: Rng>(formula: &str, rng: &mut R) -> Result<DiceRoll, DiceError> {
    let parsed = formula.parse::<DiceFormula>()?;
    Ok(parsed.roll_with_rng(rng))
}

/// Summary statistics over a set of roll totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollStatistics {
    pub min: i32,
    pub max: i32,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Compute min/max/mean/standard deviation of roll totals. Empty input
/// yields the all-zero statistics rather than an error.
pub fn roll_statistics(rolls: &[DiceRoll]) -> RollStatistics {
    if rolls.is_empty() {
        return RollStatistics {
            min: 0,
            max: 0,
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let totals: Vec<i32> = rolls.iter().map(|r| r.total).collect();
    let min = *totals.iter().min().unwrap();
    let max = *totals.iter().max().unwrap();
    let mean = totals.iter().sum::<i32>() as f64 / totals.len() as f64;
    let variance = totals
        .iter()
        .map(|&t| (t as f64 - mean).powi(2))
        .sum::<f64>()
        / totals.len() as f64;

    RollStatistics {
        min,
        max,
        mean,
        std_dev: variance.sqrt(),
    }
}
