//! Equipment template catalog.
//!
//! Immutable reference entries used only to stamp out item instances.
//! Every template carries a typed payload for its kind, so item
//! discrimination is explicit, never inferred from which fields happen to
//! be present.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::bonus::BonusType;

/// The five equipment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Weapon,
    Armor,
    Shield,
    MagicItem,
    Gear,
}

/// A continuous magic-item effect, e.g. a ring's deflection bonus to AC.
/// `target` names the category it applies to (`ac`, `saves`, `skills`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEffect {
    pub target: String,
    pub bonus_type: BonusType,
    pub value: i32,
    pub source: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProps {
    /// simple, martial, or exotic.
    pub weapon_class: String,
    pub weapon_group: Vec<String>,
    /// light, one-handed, or two-handed.
    pub handedness: String,
    /// Damage for small wielders.
    pub damage_s: String,
    /// Damage for medium wielders.
    pub damage_m: String,
    /// e.g. "19-20/x2".
    pub critical: String,
    pub damage_types: Vec<String>,
    pub special: Vec<String>,
    pub is_ranged: bool,
    pub is_thrown: bool,
    /// Feet per range increment; 0 for pure melee weapons.
    pub range_increment: u32,
    pub uses_ammunition: bool,
    pub ammunition_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorProps {
    /// light, medium, or heavy.
    pub armor_class: String,
    pub ac_bonus: i32,
    pub max_dex_bonus: i32,
    /// Stored as a penalty (zero or negative).
    pub check_penalty: i32,
    /// Arcane spell failure percentage.
    pub spell_failure: i32,
    pub speed_30: u32,
    pub speed_20: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldProps {
    /// light, heavy, or tower.
    pub shield_class: String,
    pub ac_bonus: i32,
    pub check_penalty: i32,
    pub spell_failure: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicItemProps {
    /// wondrous, ring, staff, etc.
    pub item_class: String,
    pub slot: String,
    pub caster_level: u32,
    pub aura: String,
    pub continuous_effects: Vec<ItemEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearProps {
    /// adventuring, alchemical, tool, etc.
    pub gear_class: String,
    pub is_consumable: bool,
    pub uses_remaining: Option<u32>,
}

/// Kind tag plus the matching typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "properties", rename_all = "snake_case")]
pub enum TemplateKind {
    Weapon(WeaponProps),
    Armor(ArmorProps),
    Shield(ShieldProps),
    MagicItem(MagicItemProps),
    Gear(GearProps),
}

impl TemplateKind {
    pub fn kind(&self) -> EquipmentKind {
        match self {
            TemplateKind::Weapon(_) => EquipmentKind::Weapon,
            TemplateKind::Armor(_) => EquipmentKind::Armor,
            TemplateKind::Shield(_) => EquipmentKind::Shield,
            TemplateKind::MagicItem(_) => EquipmentKind::MagicItem,
            TemplateKind::Gear(_) => EquipmentKind::Gear,
        }
    }
}

/// One immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentTemplate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub source: String,
    /// Gold pieces.
    pub base_price: f64,
    /// Pounds.
    pub base_weight: f64,
    pub description: String,
    #[serde(flatten)]
    pub template: TemplateKind,
}

impl EquipmentTemplate {
    pub fn kind(&self) -> EquipmentKind {
        self.template.kind()
    }
}

/// Optional filters for [`search`].
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub source: Option<String>,
    pub max_price: Option<f64>,
    pub max_weight: Option<f64>,
}

/// Every template in the catalog.
pub fn all_templates() -> Vec<&'static EquipmentTemplate> {
    CATALOG.iter().collect()
}

/// Templates in a category ("Weapons", "Armor", "Shields", "Gear"),
/// case-insensitively.
pub fn templates_by_category(category: &str) -> Vec<&'static EquipmentTemplate> {
    CATALOG
        .iter()
        .filter(|t| t.category.eq_ignore_ascii_case(category))
        .collect()
}

pub fn template_by_id(id: &str) -> Option<&'static EquipmentTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Substring search over name/description/subcategory, narrowed by filters,
/// sorted by name.
pub fn search(query: &str, filters: &SearchFilters) -> Vec<&'static EquipmentTemplate> {
    let term = query.trim().to_lowercase();

    let mut results: Vec<&'static EquipmentTemplate> = CATALOG
        .iter()
        .filter(|t| {
            term.is_empty()
                || t.name.to_lowercase().contains(&term)
                || t.description.to_lowercase().contains(&term)
                || t.subcategory.to_lowercase().contains(&term)
        })
        .filter(|t| match &filters.category {
            Some(category) => t.category.eq_ignore_ascii_case(category),
            None => true,
        })
        .filter(|t| match &filters.subcategory {
            Some(subcategory) => t.subcategory.eq_ignore_ascii_case(subcategory),
            None => true,
        })
        .filter(|t| match &filters.source {
            Some(source) => t.source.eq_ignore_ascii_case(source),
            None => true,
        })
        .filter(|t| filters.max_price.is_none_or(|max| t.base_price <= max))
        .filter(|t| filters.max_weight.is_none_or(|max| t.base_weight <= max))
        .collect();

    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn weapon(
    id: &str,
    name: &str,
    subcategory: &str,
    price: f64,
    weight: f64,
    description: &str,
    props: WeaponProps,
) -> EquipmentTemplate {
    EquipmentTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category: "Weapons".to_string(),
        subcategory: subcategory.to_string(),
        source: "Core Rulebook".to_string(),
        base_price: price,
        base_weight: weight,
        description: description.to_string(),
        template: TemplateKind::Weapon(props),
    }
}

fn armor(
    id: &str,
    name: &str,
    subcategory: &str,
    price: f64,
    weight: f64,
    description: &str,
    props: ArmorProps,
) -> EquipmentTemplate {
    EquipmentTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category: "Armor".to_string(),
        subcategory: subcategory.to_string(),
        source: "Core Rulebook".to_string(),
        base_price: price,
        base_weight: weight,
        description: description.to_string(),
        template: TemplateKind::Armor(props),
    }
}

fn shield(
    id: &str,
    name: &str,
    subcategory: &str,
    price: f64,
    weight: f64,
    description: &str,
    props: ShieldProps,
) -> EquipmentTemplate {
    EquipmentTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category: "Shields".to_string(),
        subcategory: subcategory.to_string(),
        source: "Core Rulebook".to_string(),
        base_price: price,
        base_weight: weight,
        description: description.to_string(),
        template: TemplateKind::Shield(props),
    }
}

fn gear(
    id: &str,
    name: &str,
    price: f64,
    weight: f64,
    description: &str,
    props: GearProps,
) -> EquipmentTemplate {
    EquipmentTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category: "Gear".to_string(),
        subcategory: "Adventuring Gear".to_string(),
        source: "Core Rulebook".to_string(),
        base_price: price,
        base_weight: weight,
        description: description.to_string(),
        template: TemplateKind::Gear(props),
    }
}

fn melee(weapon_class: &str, group: &str, handedness: &str, damage_s: &str, damage_m: &str, critical: &str, damage_types: &[&str]) -> WeaponProps {
    WeaponProps {
        weapon_class: weapon_class.to_string(),
        weapon_group: strings(&[group]),
        handedness: handedness.to_string(),
        damage_s: damage_s.to_string(),
        damage_m: damage_m.to_string(),
        critical: critical.to_string(),
        damage_types: strings(damage_types),
        special: Vec::new(),
        is_ranged: false,
        is_thrown: false,
        range_increment: 0,
        uses_ammunition: false,
        ammunition_type: String::new(),
    }
}

lazy_static! {
    /// The built-in equipment catalog.
    pub static ref CATALOG: Vec<EquipmentTemplate> = vec![
        // Simple melee
        weapon(
            "club", "Club", "Simple Melee", 0.0, 3.0, "A simple wooden club.",
            melee("simple", "clubs", "one-handed", "1d4", "1d6", "20/x2", &["bludgeoning"]),
        ),
        weapon(
            "dagger", "Dagger", "Simple Melee", 2.0, 1.0, "A sharp, pointed blade.",
            WeaponProps {
                is_thrown: true,
                range_increment: 10,
                ..melee("simple", "light blades", "light", "1d3", "1d4", "19-20/x2", &["piercing", "slashing"])
            },
        ),
        weapon(
            "spear", "Spear", "Simple Melee", 2.0, 6.0,
            "A long wooden shaft with a sharp metal point.",
            WeaponProps {
                special: strings(&["brace", "reach"]),
                is_thrown: true,
                range_increment: 20,
                ..melee("simple", "spears", "two-handed", "1d6", "1d8", "20/x3", &["piercing"])
            },
        ),
        // Martial melee
        weapon(
            "longsword", "Longsword", "Martial Melee", 15.0, 4.0, "A versatile one-handed sword.",
            melee("martial", "heavy blades", "one-handed", "1d6", "1d8", "19-20/x2", &["slashing"]),
        ),
        weapon(
            "greatsword", "Greatsword", "Martial Melee", 50.0, 8.0, "A massive two-handed sword.",
            melee("martial", "heavy blades", "two-handed", "1d12", "2d6", "19-20/x2", &["slashing"]),
        ),
        // Martial ranged
        weapon(
            "shortbow", "Shortbow", "Martial Ranged", 30.0, 2.0, "A small, curved bow.",
            WeaponProps {
                is_ranged: true,
                range_increment: 60,
                uses_ammunition: true,
                ammunition_type: "arrows".to_string(),
                ..melee("martial", "bows", "two-handed", "1d4", "1d6", "20/x3", &["piercing"])
            },
        ),
        weapon(
            "longbow", "Longbow", "Martial Ranged", 100.0, 3.0, "A large, powerful bow.",
            WeaponProps {
                is_ranged: true,
                range_increment: 100,
                uses_ammunition: true,
                ammunition_type: "arrows".to_string(),
                ..melee("martial", "bows", "two-handed", "1d6", "1d8", "20/x3", &["piercing"])
            },
        ),
        // Light armor
        armor(
            "padded", "Padded", "Light Armor", 5.0, 10.0, "Quilted cloth armor.",
            ArmorProps { armor_class: "light".to_string(), ac_bonus: 1, max_dex_bonus: 8, check_penalty: 0, spell_failure: 5, speed_30: 30, speed_20: 20 },
        ),
        armor(
            "leather", "Leather", "Light Armor", 10.0, 15.0, "Soft leather armor.",
            ArmorProps { armor_class: "light".to_string(), ac_bonus: 2, max_dex_bonus: 6, check_penalty: 0, spell_failure: 10, speed_30: 30, speed_20: 20 },
        ),
        armor(
            "studded_leather", "Studded Leather", "Light Armor", 25.0, 20.0,
            "Leather armor with metal studs.",
            ArmorProps { armor_class: "light".to_string(), ac_bonus: 3, max_dex_bonus: 5, check_penalty: -1, spell_failure: 15, speed_30: 30, speed_20: 20 },
        ),
        // Medium armor
        armor(
            "chain_shirt", "Chain Shirt", "Medium Armor", 100.0, 25.0, "A shirt of chain mail.",
            ArmorProps { armor_class: "medium".to_string(), ac_bonus: 4, max_dex_bonus: 4, check_penalty: -2, spell_failure: 20, speed_30: 30, speed_20: 20 },
        ),
        armor(
            "scale_mail", "Scale Mail", "Medium Armor", 50.0, 30.0,
            "Armor made of overlapping metal scales.",
            ArmorProps { armor_class: "medium".to_string(), ac_bonus: 5, max_dex_bonus: 3, check_penalty: -4, spell_failure: 25, speed_30: 20, speed_20: 15 },
        ),
        // Heavy armor
        armor(
            "splint_mail", "Splint Mail", "Heavy Armor", 200.0, 45.0,
            "Metal strips sewn to a leather backing.",
            ArmorProps { armor_class: "heavy".to_string(), ac_bonus: 7, max_dex_bonus: 0, check_penalty: -7, spell_failure: 40, speed_30: 20, speed_20: 15 },
        ),
        armor(
            "full_plate", "Full Plate", "Heavy Armor", 1500.0, 50.0,
            "Complete suit of fitted metal plates.",
            ArmorProps { armor_class: "heavy".to_string(), ac_bonus: 9, max_dex_bonus: 1, check_penalty: -6, spell_failure: 35, speed_30: 20, speed_20: 15 },
        ),
        // Shields
        shield(
            "buckler", "Buckler", "Light Shield", 5.0, 5.0, "A small, round shield.",
            ShieldProps { shield_class: "light".to_string(), ac_bonus: 1, check_penalty: -1, spell_failure: 5 },
        ),
        shield(
            "light_shield", "Light Shield", "Light Shield", 3.0, 6.0,
            "A small shield made of wood or metal.",
            ShieldProps { shield_class: "light".to_string(), ac_bonus: 1, check_penalty: -1, spell_failure: 5 },
        ),
        shield(
            "heavy_shield", "Heavy Shield", "Heavy Shield", 7.0, 15.0,
            "A large shield that covers most of the torso.",
            ShieldProps { shield_class: "heavy".to_string(), ac_bonus: 2, check_penalty: -2, spell_failure: 15 },
        ),
        // Gear
        gear(
            "backpack", "Backpack", 2.0, 2.0, "A leather pack worn on the back.",
            GearProps { gear_class: "adventuring".to_string(), is_consumable: false, uses_remaining: None },
        ),
        gear(
            "rope_silk", "Rope, Silk (50 ft.)", 10.0, 5.0, "Strong silk rope.",
            GearProps { gear_class: "adventuring".to_string(), is_consumable: false, uses_remaining: None },
        ),
        gear(
            "torch", "Torch", 0.01, 1.0, "A wooden torch that burns for 1 hour.",
            GearProps { gear_class: "adventuring".to_string(), is_consumable: true, uses_remaining: Some(1) },
        ),
        gear(
            "rations_trail", "Trail Rations (per day)", 0.5, 1.0,
            "Dried and preserved food for travel.",
            GearProps { gear_class: "adventuring".to_string(), is_consumable: true, uses_remaining: Some(1) },
        ),
    ];
}
