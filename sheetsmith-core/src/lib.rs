//! Pathfinder-style character sheet engine.
//!
//! This crate provides:
//! - Ability score generation (point buy, 3d6, 4d6 drop lowest, custom dice)
//! - Character assembly with racial modifiers and class reference data
//! - An equipment engine with slot management, bonus aggregation, and
//!   encumbrance
//! - Cross-cutting validation with returned error/warning reports
//! - A pluggable character store with a file-backed implementation
//!
//! # Quick Start
//!
//! ```
//! use sheetsmith_core::{
//!     Alignment, Character, CoreClasses, CreateCharacterParams, GenerationMethod,
//! };
//! use sheetsmith_core::race_data::race_by_name;
//!
//! let params = CreateCharacterParams {
//!     name: "Thorin".to_string(),
//!     race: race_by_name("Dwarf").unwrap().clone(),
//!     class_name: "Fighter".to_string(),
//!     method: GenerationMethod::PointBuy,
//!     ability_scores: [16, 12, 14, 10, 12, 8],
//!     alignment: Alignment::LawfulGood,
//!     deity: None,
//! };
//!
//! let character = Character::create(params, &CoreClasses);
//! assert_eq!(character.ability_scores.con.total, 16);
//! assert!(character.validate().is_valid);
//! ```

pub mod abilities;
pub mod bonus;
pub mod catalog;
pub mod character;
pub mod class_data;
pub mod dice;
pub mod equipment;
pub mod race_data;
pub mod store;
pub mod validation;

// Primary public API
pub use abilities::{Ability, AbilityScore, AbilityScores, GenerationMethod};
pub use bonus::{Bonus, BonusType};
pub use catalog::{EquipmentKind, EquipmentTemplate};
pub use character::{Alignment, Character, CreateCharacterParams, ImportError, SCHEMA_VERSION};
pub use class_data::{BabProgression, ClassSource, CoreClasses, SaveProgression};
pub use dice::{DiceError, DiceFormula, DiceRoll};
pub use equipment::{EncumbranceLevel, EncumbranceVariant, Equipment, EquipmentSlot};
pub use race_data::{CoreRaces, RaceData, RaceSource, Size};
pub use store::{CharacterStore, CharacterSummary, FileCharacterStore, StoreError};
pub use validation::ValidationReport;
