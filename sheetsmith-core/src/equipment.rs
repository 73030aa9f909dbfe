//! Inventory and equip-state engine.
//!
//! Items are stamped out from catalog templates, live in per-kind
//! collections, and change equip state only through the slot-assignment
//! operations here. Every mutating operation ends with the recalculation
//! pass so derived weights, penalties, and encumbrance stay consistent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::bonus::{Bonus, BonusType};
use crate::catalog::{
    ArmorProps, EquipmentKind, EquipmentTemplate, GearProps, ItemEffect, MagicItemProps,
    ShieldProps, TemplateKind, WeaponProps,
};
use crate::character::Character;
use crate::validation::ValidationReport;

/// Equipment slots. Serialized as plain snake_case strings so the slot map
/// round-trips as an ordinary key-value object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Neck,
    Chest,
    Body,
    Belt,
    Wrists,
    Hands,
    RingLeft,
    RingRight,
    Feet,
    MainHand,
    OffHand,
    TwoHanded,
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquipmentSlot::Head => "head",
            EquipmentSlot::Neck => "neck",
            EquipmentSlot::Chest => "chest",
            EquipmentSlot::Body => "body",
            EquipmentSlot::Belt => "belt",
            EquipmentSlot::Wrists => "wrists",
            EquipmentSlot::Hands => "hands",
            EquipmentSlot::RingLeft => "ring_left",
            EquipmentSlot::RingRight => "ring_right",
            EquipmentSlot::Feet => "feet",
            EquipmentSlot::MainHand => "main_hand",
            EquipmentSlot::OffHand => "off_hand",
            EquipmentSlot::TwoHanded => "two_handed",
        };
        write!(f, "{name}")
    }
}

/// Slots a weapon may occupy.
const HAND_SLOTS: [EquipmentSlot; 3] = [
    EquipmentSlot::MainHand,
    EquipmentSlot::OffHand,
    EquipmentSlot::TwoHanded,
];

/// Fields shared by every item instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBase {
    /// Unique per instance; fresh on every instantiation.
    pub id: String,
    pub name: String,
    /// Pounds per unit.
    pub weight: f64,
    pub quantity: u32,
    /// Gold pieces.
    pub cost: f64,
    pub description: String,
}

impl ItemBase {
    fn from_template(template: &EquipmentTemplate) -> Self {
        ItemBase {
            id: format!("{}_{}", template.id, Uuid::new_v4()),
            name: template.name.clone(),
            weight: template.base_weight,
            quantity: 1,
            cost: template.base_price,
            description: template.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub base: ItemBase,
    pub props: WeaponProps,
    pub equipped: bool,
    pub masterwork: bool,
    pub enhancement: i32,
}

impl Weapon {
    pub fn from_template(template: &EquipmentTemplate, props: &WeaponProps) -> Self {
        Weapon {
            base: ItemBase::from_template(template),
            props: props.clone(),
            equipped: false,
            masterwork: false,
            enhancement: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub base: ItemBase,
    pub props: ArmorProps,
    pub equipped: bool,
    pub masterwork: bool,
    pub enhancement: i32,
}

impl Armor {
    pub fn from_template(template: &EquipmentTemplate, props: &ArmorProps) -> Self {
        Armor {
            base: ItemBase::from_template(template),
            props: props.clone(),
            equipped: false,
            masterwork: false,
            enhancement: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub base: ItemBase,
    pub props: ShieldProps,
    pub equipped: bool,
    pub masterwork: bool,
    pub enhancement: i32,
}

impl Shield {
    pub fn from_template(template: &EquipmentTemplate, props: &ShieldProps) -> Self {
        Shield {
            base: ItemBase::from_template(template),
            props: props.clone(),
            equipped: false,
            masterwork: false,
            enhancement: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicItem {
    pub base: ItemBase,
    pub props: MagicItemProps,
    pub equipped: bool,
    pub active: bool,
}

impl MagicItem {
    pub fn from_template(template: &EquipmentTemplate, props: &MagicItemProps) -> Self {
        MagicItem {
            base: ItemBase::from_template(template),
            props: props.clone(),
            equipped: false,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gear {
    pub base: ItemBase,
    pub props: GearProps,
}

impl Gear {
    pub fn from_template(template: &EquipmentTemplate, props: &GearProps) -> Self {
        Gear {
            base: ItemBase::from_template(template),
            props: props.clone(),
        }
    }
}

/// A borrowed item of known kind. Discrimination is carried, not probed.
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    Weapon(&'a Weapon),
    Armor(&'a Armor),
    Shield(&'a Shield),
    MagicItem(&'a MagicItem),
    Gear(&'a Gear),
}

impl ItemRef<'_> {
    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn kind(&self) -> EquipmentKind {
        match self {
            ItemRef::Weapon(_) => EquipmentKind::Weapon,
            ItemRef::Armor(_) => EquipmentKind::Armor,
            ItemRef::Shield(_) => EquipmentKind::Shield,
            ItemRef::MagicItem(_) => EquipmentKind::MagicItem,
            ItemRef::Gear(_) => EquipmentKind::Gear,
        }
    }

    pub fn base(&self) -> &ItemBase {
        match self {
            ItemRef::Weapon(w) => &w.base,
            ItemRef::Armor(a) => &a.base,
            ItemRef::Shield(s) => &s.base,
            ItemRef::MagicItem(m) => &m.base,
            ItemRef::Gear(g) => &g.base,
        }
    }
}

/// How encumbrance is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncumbranceVariant {
    #[default]
    CoreRules,
    Simplified,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncumbranceLevel {
    Light,
    Medium,
    Heavy,
    Overloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EncumbranceSettings {
    pub enabled: bool,
    pub variant: EncumbranceVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_carrying_capacity: Option<f64>,
}

/// Load thresholds in pounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarryingCapacity {
    pub light: f64,
    pub medium: f64,
    pub heavy: f64,
    pub max: f64,
}

/// When no equipped armor caps Dexterity, the cap is effectively unbounded.
pub const UNCAPPED_DEX_BONUS: i32 = 99;

/// A character's full equipment state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapons: Vec<Weapon>,
    pub armor: Vec<Armor>,
    pub shields: Vec<Shield>,
    pub magic_items: Vec<MagicItem>,
    pub gear: Vec<Gear>,

    /// Each slot holds at most one item id. An item's `equipped` flag is
    /// true iff it occupies some slot.
    pub equipped_slots: BTreeMap<EquipmentSlot, String>,

    pub encumbrance_settings: EncumbranceSettings,

    // Derived by the recalculation pass.
    pub total_weight: f64,
    pub light_load: f64,
    pub medium_load: f64,
    pub heavy_load: f64,
    pub encumbrance_level: Option<EncumbranceLevel>,
    pub ac_penalty: i32,
    pub max_dex_bonus: i32,
    pub spell_failure: i32,
}

impl Default for Equipment {
    fn default() -> Self {
        Equipment {
            weapons: Vec::new(),
            armor: Vec::new(),
            shields: Vec::new(),
            magic_items: Vec::new(),
            gear: Vec::new(),
            equipped_slots: BTreeMap::new(),
            encumbrance_settings: EncumbranceSettings::default(),
            total_weight: 0.0,
            light_load: 0.0,
            medium_load: 0.0,
            heavy_load: 0.0,
            encumbrance_level: None,
            ac_penalty: 0,
            max_dex_bonus: UNCAPPED_DEX_BONUS,
            spell_failure: 0,
        }
    }
}

impl Equipment {
    pub fn find_item(&self, item_id: &str) -> Option<ItemRef<'_>> {
        if let Some(w) = self.weapons.iter().find(|w| w.base.id == item_id) {
            return Some(ItemRef::Weapon(w));
        }
        if let Some(a) = self.armor.iter().find(|a| a.base.id == item_id) {
            return Some(ItemRef::Armor(a));
        }
        if let Some(s) = self.shields.iter().find(|s| s.base.id == item_id) {
            return Some(ItemRef::Shield(s));
        }
        if let Some(m) = self.magic_items.iter().find(|m| m.base.id == item_id) {
            return Some(ItemRef::MagicItem(m));
        }
        if let Some(g) = self.gear.iter().find(|g| g.base.id == item_id) {
            return Some(ItemRef::Gear(g));
        }
        None
    }

    /// Items currently occupying a slot, in slot order.
    pub fn equipped_items(&self) -> Vec<ItemRef<'_>> {
        self.equipped_slots
            .values()
            .filter_map(|id| self.find_item(id))
            .collect()
    }

    fn set_equipped(&mut self, item_id: &str, equipped: bool) {
        if let Some(w) = self.weapons.iter_mut().find(|w| w.base.id == item_id) {
            w.equipped = equipped;
        }
        if let Some(a) = self.armor.iter_mut().find(|a| a.base.id == item_id) {
            a.equipped = equipped;
        }
        if let Some(s) = self.shields.iter_mut().find(|s| s.base.id == item_id) {
            s.equipped = equipped;
        }
        if let Some(m) = self.magic_items.iter_mut().find(|m| m.base.id == item_id) {
            m.equipped = equipped;
        }
        // Gear has no equip state.
    }

    fn clear_slot(&mut self, slot: EquipmentSlot) {
        if let Some(item_id) = self.equipped_slots.remove(&slot) {
            // The flag follows slot occupancy, unless the item still holds
            // another slot (rings, paired hand slots).
            if !self.equipped_slots.values().any(|id| *id == item_id) {
                self.set_equipped(&item_id, false);
            }
        }
    }
}

/// Aggregated bonuses from currently equipped items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentBonuses {
    pub attack: Vec<Bonus>,
    pub damage: Vec<Bonus>,
    pub ac: Vec<Bonus>,
    pub saves: Vec<Bonus>,
    pub skills: Vec<Bonus>,
}

impl Character {
    /// Instantiate an item from a catalog template and add it to the
    /// matching collection. Returns the fresh item id.
    pub fn add_item(&mut self, template: &EquipmentTemplate) -> String {
        let id = match &template.template {
            TemplateKind::Weapon(props) => {
                let weapon = Weapon::from_template(template, props);
                let id = weapon.base.id.clone();
                self.equipment.weapons.push(weapon);
                id
            }
            TemplateKind::Armor(props) => {
                let armor = Armor::from_template(template, props);
                let id = armor.base.id.clone();
                self.equipment.armor.push(armor);
                id
            }
            TemplateKind::Shield(props) => {
                let shield = Shield::from_template(template, props);
                let id = shield.base.id.clone();
                self.equipment.shields.push(shield);
                id
            }
            TemplateKind::MagicItem(props) => {
                let item = MagicItem::from_template(template, props);
                let id = item.base.id.clone();
                self.equipment.magic_items.push(item);
                id
            }
            TemplateKind::Gear(props) => {
                let gear = Gear::from_template(template, props);
                let id = gear.base.id.clone();
                self.equipment.gear.push(gear);
                id
            }
        };
        self.recalculate_equipment();
        id
    }

    /// Remove an item by id from whichever collection holds it, clearing
    /// any slot it occupies.
    pub fn remove_item(&mut self, item_id: &str) {
        let equipment = &mut self.equipment;
        equipment.weapons.retain(|w| w.base.id != item_id);
        equipment.armor.retain(|a| a.base.id != item_id);
        equipment.shields.retain(|s| s.base.id != item_id);
        equipment.magic_items.retain(|m| m.base.id != item_id);
        equipment.gear.retain(|g| g.base.id != item_id);
        equipment.equipped_slots.retain(|_, id| id != item_id);
        self.recalculate_equipment();
    }

    /// Assign an item to a slot. On any error the character is returned
    /// unmodified; validation happens before mutation.
    ///
    /// Two-handed occupancy is mutually exclusive with the one-hand slots:
    /// assigning to `TwoHanded` clears `MainHand` and `OffHand`, and vice
    /// versa.
    pub fn equip_item(&mut self, item_id: &str, slot: EquipmentSlot) -> ValidationReport {
        let mut report = ValidationReport::new();

        let Some(item) = self.equipment.find_item(item_id) else {
            report.error("Item not found");
            return report;
        };

        if item.kind() == EquipmentKind::Weapon && !HAND_SLOTS.contains(&slot) {
            report.error("Weapons can only be equipped to hand slots");
            return report;
        }

        if let Some(occupant) = self.equipment.equipped_slots.get(&slot) {
            if occupant != item_id {
                report.error(format!(
                    "Slot {slot} is already occupied. Unequip the current item first."
                ));
                return report;
            }
        }

        if slot == EquipmentSlot::TwoHanded {
            self.equipment.clear_slot(EquipmentSlot::MainHand);
            self.equipment.clear_slot(EquipmentSlot::OffHand);
        } else if slot == EquipmentSlot::MainHand || slot == EquipmentSlot::OffHand {
            self.equipment.clear_slot(EquipmentSlot::TwoHanded);
        }

        self.equipment
            .equipped_slots
            .insert(slot, item_id.to_string());
        self.equipment.set_equipped(item_id, true);
        self.recalculate_equipment();

        report
    }

    /// Clear a slot. Not an error if the slot was already empty.
    pub fn unequip_item(&mut self, slot: EquipmentSlot) {
        self.equipment.clear_slot(slot);
        self.recalculate_equipment();
    }

    /// Aggregate attack/damage/AC/save/skill bonuses from equipped items
    /// only. Same-typed entries from different sources are all reported;
    /// applying them is subject to the take-highest-per-type stacking rule.
    pub fn equipment_bonuses(&self) -> EquipmentBonuses {
        let mut bonuses = EquipmentBonuses::default();

        for item in self.equipment.equipped_items() {
            match item {
                ItemRef::Weapon(weapon) => {
                    if weapon.enhancement > 0 {
                        bonuses.attack.push(
                            Bonus::new(
                                BonusType::Enhancement,
                                weapon.enhancement,
                                weapon.base.name.clone(),
                            )
                            .with_condition("attack rolls"),
                        );
                        bonuses.damage.push(
                            Bonus::new(
                                BonusType::Enhancement,
                                weapon.enhancement,
                                weapon.base.name.clone(),
                            )
                            .with_condition("damage rolls"),
                        );
                    } else if weapon.masterwork {
                        // Masterwork is subsumed once any enhancement exists.
                        bonuses.attack.push(
                            Bonus::new(
                                BonusType::Enhancement,
                                1,
                                format!("{} (masterwork)", weapon.base.name),
                            )
                            .with_condition("attack rolls"),
                        );
                    }
                }
                ItemRef::Armor(armor) => {
                    bonuses.ac.push(
                        Bonus::new(
                            BonusType::Armor,
                            armor.props.ac_bonus + armor.enhancement,
                            armor.base.name.clone(),
                        )
                        .with_condition("AC"),
                    );
                }
                ItemRef::Shield(shield) => {
                    bonuses.ac.push(
                        Bonus::new(
                            BonusType::Shield,
                            shield.props.ac_bonus + shield.enhancement,
                            shield.base.name.clone(),
                        )
                        .with_condition("AC"),
                    );
                }
                ItemRef::MagicItem(item) => {
                    bonuses
                        .ac
                        .extend(effect_bonuses(&item.props.continuous_effects, "ac"));
                    bonuses
                        .saves
                        .extend(effect_bonuses(&item.props.continuous_effects, "saves"));
                    bonuses
                        .skills
                        .extend(effect_bonuses(&item.props.continuous_effects, "skills"));
                }
                ItemRef::Gear(_) => {}
            }
        }

        bonuses
    }

    /// Recompute every derived equipment value. Run after each mutating
    /// operation; idempotent.
    pub fn recalculate_equipment(&mut self) {
        let total_weight = total_weight(&self.equipment);
        let ac_penalty = armor_check_penalty(&self.equipment);
        let max_dex_bonus = max_dex_bonus(&self.equipment);
        let spell_failure = spell_failure(&self.equipment);

        let equipment = &mut self.equipment;
        equipment.total_weight = total_weight;
        equipment.ac_penalty = ac_penalty;
        equipment.max_dex_bonus = max_dex_bonus;
        equipment.spell_failure = spell_failure;

        if self.equipment.encumbrance_settings.enabled {
            let capacity = self.carrying_capacity();
            self.equipment.light_load = capacity.light;
            self.equipment.medium_load = capacity.medium;
            self.equipment.heavy_load = capacity.heavy;
            self.equipment.encumbrance_level = self.encumbrance_level();
        } else {
            self.equipment.encumbrance_level = None;
        }
    }

    /// Load thresholds from total Strength, as multiples (x1/x2/x3/x5) of
    /// the base capacity. A configured custom capacity replaces the
    /// computed base.
    pub fn carrying_capacity(&self) -> CarryingCapacity {
        let strength = self.ability_scores.str.total;

        let mut base = if strength <= 10 {
            (strength * 10) as f64
        } else if strength <= 20 {
            ((strength - 10) * 15 + 100) as f64
        } else {
            let excess = strength - 20;
            let doublings = 2f64.powi(excess / 10);
            250.0 * doublings + (excess % 10) as f64 * 15.0 * doublings
        };

        if let Some(custom) = self.equipment.encumbrance_settings.custom_carrying_capacity {
            base = custom;
        }

        CarryingCapacity {
            light: base,
            medium: base * 2.0,
            heavy: base * 3.0,
            max: base * 5.0,
        }
    }

    /// Current encumbrance tier, or `None` when tracking is disabled or the
    /// variant is `None`.
    pub fn encumbrance_level(&self) -> Option<EncumbranceLevel> {
        let settings = &self.equipment.encumbrance_settings;
        if !settings.enabled {
            return None;
        }

        let weight = self.equipment.total_weight;
        let capacity = self.carrying_capacity();

        match settings.variant {
            EncumbranceVariant::None => None,
            EncumbranceVariant::Simplified => {
                if weight <= capacity.light {
                    Some(EncumbranceLevel::Light)
                } else {
                    Some(EncumbranceLevel::Heavy)
                }
            }
            EncumbranceVariant::CoreRules => {
                if weight <= capacity.light {
                    Some(EncumbranceLevel::Light)
                } else if weight <= capacity.medium {
                    Some(EncumbranceLevel::Medium)
                } else if weight <= capacity.heavy {
                    Some(EncumbranceLevel::Heavy)
                } else {
                    Some(EncumbranceLevel::Overloaded)
                }
            }
        }
    }
}

fn effect_bonuses(effects: &[ItemEffect], category: &str) -> Vec<Bonus> {
    effects
        .iter()
        .filter(|effect| effect.target.contains(category))
        .map(|effect| {
            let mut bonus = Bonus::new(effect.bonus_type, effect.value, effect.source.clone());
            bonus.active = effect.active;
            bonus
        })
        .collect()
}

/// Sum of weight x quantity over every item, equipped or not.
fn total_weight(equipment: &Equipment) -> f64 {
    let weapons = equipment
        .weapons
        .iter()
        .map(|w| w.base.weight * w.base.quantity as f64);
    let armor = equipment
        .armor
        .iter()
        .map(|a| a.base.weight * a.base.quantity as f64);
    let shields = equipment
        .shields
        .iter()
        .map(|s| s.base.weight * s.base.quantity as f64);
    let magic_items = equipment
        .magic_items
        .iter()
        .map(|m| m.base.weight * m.base.quantity as f64);
    let gear = equipment
        .gear
        .iter()
        .map(|g| g.base.weight * g.base.quantity as f64);

    weapons
        .chain(armor)
        .chain(shields)
        .chain(magic_items)
        .chain(gear)
        .sum()
}

/// Armor check penalties of equipped armor and shields. Masterwork reduces
/// each contributing penalty by 1, floored at 0.
fn armor_check_penalty(equipment: &Equipment) -> i32 {
    let armor = equipment.armor.iter().filter(|a| a.equipped).map(|a| {
        let penalty = a.props.check_penalty.abs();
        if a.masterwork {
            (penalty - 1).max(0)
        } else {
            penalty
        }
    });
    let shields = equipment.shields.iter().filter(|s| s.equipped).map(|s| {
        let penalty = s.props.check_penalty.abs();
        if s.masterwork {
            (penalty - 1).max(0)
        } else {
            penalty
        }
    });
    armor.chain(shields).sum()
}

/// The lowest max-Dex cap among equipped armor, or unbounded without any.
fn max_dex_bonus(equipment: &Equipment) -> i32 {
    equipment
        .armor
        .iter()
        .filter(|a| a.equipped)
        .map(|a| a.props.max_dex_bonus)
        .min()
        .unwrap_or(UNCAPPED_DEX_BONUS)
}

/// Total arcane spell failure of equipped armor and shields.
fn spell_failure(equipment: &Equipment) -> i32 {
    let armor = equipment
        .armor
        .iter()
        .filter(|a| a.equipped)
        .map(|a| a.props.spell_failure);
    let shields = equipment
        .shields
        .iter()
        .filter(|s| s.equipped)
        .map(|s| s.props.spell_failure);
    armor.chain(shields).sum()
}

/// Attack penalty for firing or throwing beyond the first range increment.
pub fn range_penalty(weapon: &Weapon, distance: u32) -> i32 {
    let increment = weapon.props.range_increment;
    if increment == 0 || (!weapon.props.is_ranged && !weapon.props.is_thrown) {
        return 0;
    }
    if distance <= increment {
        return 0;
    }
    let increments = distance.div_ceil(increment) as i32;
    -2 * (increments - 1)
}

/// Maximum effective distance: ten range increments.
pub fn effective_range(weapon: &Weapon) -> u32 {
    weapon.props.range_increment * 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::template_by_id;
    use crate::character::create_sample_character;

    fn sample_character() -> crate::character::Character {
        create_sample_character("Gearhead")
    }

    #[test]
    fn test_add_item_is_a_fresh_instance() {
        let mut character = sample_character();
        let longsword = template_by_id("longsword").unwrap();
        let first = character.add_item(longsword);
        let second = character.add_item(longsword);
        assert_ne!(first, second);
        assert_eq!(character.equipment.weapons.len(), 2);
        assert!(character.equipment.find_item(&first).is_some());
    }

    #[test]
    fn test_remove_item_also_unequips() {
        let mut character = sample_character();
        let id = character.add_item(template_by_id("leather").unwrap());
        assert!(character.equip_item(&id, EquipmentSlot::Body).is_valid);

        character.remove_item(&id);
        assert!(character.equipment.find_item(&id).is_none());
        assert!(character.equipment.equipped_slots.is_empty());
        assert_eq!(character.equipment.total_weight, 0.0);
    }

    #[test]
    fn test_equip_missing_item() {
        let mut character = sample_character();
        let report = character.equip_item("no_such_item", EquipmentSlot::MainHand);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["Item not found"]);
    }

    #[test]
    fn test_weapons_only_fit_hand_slots() {
        let mut character = sample_character();
        let id = character.add_item(template_by_id("longsword").unwrap());
        let report = character.equip_item(&id, EquipmentSlot::Head);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("hand slots"));
        assert!(character.equipment.equipped_slots.is_empty());
    }

    #[test]
    fn test_occupied_slot_rejected_and_state_unchanged() {
        let mut character = sample_character();
        let leather = character.add_item(template_by_id("leather").unwrap());
        let plate = character.add_item(template_by_id("full_plate").unwrap());

        assert!(character.equip_item(&leather, EquipmentSlot::Body).is_valid);
        let report = character.equip_item(&plate, EquipmentSlot::Body);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("already occupied"));
        assert_eq!(
            character.equipment.equipped_slots.get(&EquipmentSlot::Body),
            Some(&leather)
        );

        // Unequip first, then the swap succeeds.
        character.unequip_item(EquipmentSlot::Body);
        assert!(character.equip_item(&plate, EquipmentSlot::Body).is_valid);
    }

    #[test]
    fn test_re_equipping_same_item_to_its_slot_is_ok() {
        let mut character = sample_character();
        let id = character.add_item(template_by_id("leather").unwrap());
        assert!(character.equip_item(&id, EquipmentSlot::Body).is_valid);
        assert!(character.equip_item(&id, EquipmentSlot::Body).is_valid);
    }

    #[test]
    fn test_two_handed_clears_hand_slots() {
        let mut character = sample_character();
        let sword = character.add_item(template_by_id("longsword").unwrap());
        let dagger = character.add_item(template_by_id("dagger").unwrap());
        let greatsword = character.add_item(template_by_id("greatsword").unwrap());

        assert!(character.equip_item(&sword, EquipmentSlot::MainHand).is_valid);
        assert!(character.equip_item(&dagger, EquipmentSlot::OffHand).is_valid);

        assert!(character
            .equip_item(&greatsword, EquipmentSlot::TwoHanded)
            .is_valid);
        let slots = &character.equipment.equipped_slots;
        assert!(!slots.contains_key(&EquipmentSlot::MainHand));
        assert!(!slots.contains_key(&EquipmentSlot::OffHand));
        assert_eq!(slots.get(&EquipmentSlot::TwoHanded), Some(&greatsword));
        // Displaced weapons lose their equipped flag.
        assert!(!character.equipment.weapons[0].equipped);
        assert!(!character.equipment.weapons[1].equipped);

        // And the other direction: a one-hander evicts the two-hander.
        assert!(character.equip_item(&sword, EquipmentSlot::MainHand).is_valid);
        assert!(!character
            .equipment
            .equipped_slots
            .contains_key(&EquipmentSlot::TwoHanded));
    }

    #[test]
    fn test_unequip_empty_slot_is_a_no_op() {
        let mut character = sample_character();
        character.unequip_item(EquipmentSlot::Neck);
        assert!(character.equipment.equipped_slots.is_empty());
    }

    #[test]
    fn test_masterwork_and_enhancement_never_stack() {
        let mut character = sample_character();
        let id = character.add_item(template_by_id("longsword").unwrap());
        character.equipment.weapons[0].masterwork = true;
        assert!(character.equip_item(&id, EquipmentSlot::MainHand).is_valid);

        let bonuses = character.equipment_bonuses();
        assert_eq!(bonuses.attack.len(), 1);
        assert_eq!(bonuses.attack[0].value, 1);
        assert_eq!(bonuses.attack[0].bonus_type, BonusType::Enhancement);
        assert!(bonuses.attack[0].source.ends_with("(masterwork)"));
        assert!(bonuses.damage.is_empty());

        // A real enhancement supersedes the masterwork bonus entirely.
        character.equipment.weapons[0].enhancement = 2;
        let bonuses = character.equipment_bonuses();
        assert_eq!(bonuses.attack.len(), 1);
        assert_eq!(bonuses.attack[0].value, 2);
        assert!(!bonuses.attack[0].source.contains("masterwork"));
        assert_eq!(bonuses.damage.len(), 1);
        assert_eq!(bonuses.damage[0].value, 2);
    }

    #[test]
    fn test_armor_and_shield_bonuses_are_single_combined_entries() {
        let mut character = sample_character();
        let armor_id = character.add_item(template_by_id("chain_shirt").unwrap());
        let shield_id = character.add_item(template_by_id("heavy_shield").unwrap());
        character.equipment.armor[0].enhancement = 1;
        assert!(character.equip_item(&armor_id, EquipmentSlot::Body).is_valid);
        assert!(character
            .equip_item(&shield_id, EquipmentSlot::OffHand)
            .is_valid);

        let bonuses = character.equipment_bonuses();
        assert_eq!(bonuses.ac.len(), 2);
        let armor_bonus = bonuses
            .ac
            .iter()
            .find(|b| b.bonus_type == BonusType::Armor)
            .unwrap();
        assert_eq!(armor_bonus.value, 5); // 4 base + 1 enhancement, one entry
        let shield_bonus = bonuses
            .ac
            .iter()
            .find(|b| b.bonus_type == BonusType::Shield)
            .unwrap();
        assert_eq!(shield_bonus.value, 2);
    }

    #[test]
    fn test_unequipped_items_contribute_no_bonuses_but_full_weight() {
        let mut character = sample_character();
        character.add_item(template_by_id("chain_shirt").unwrap());
        character.add_item(template_by_id("longsword").unwrap());

        let bonuses = character.equipment_bonuses();
        assert!(bonuses.ac.is_empty());
        assert!(bonuses.attack.is_empty());
        assert_eq!(character.equipment.total_weight, 29.0);
    }

    #[test]
    fn test_armor_check_penalty_and_masterwork() {
        let mut character = sample_character();
        let armor_id = character.add_item(template_by_id("scale_mail").unwrap());
        let shield_id = character.add_item(template_by_id("heavy_shield").unwrap());
        assert!(character.equip_item(&armor_id, EquipmentSlot::Body).is_valid);
        assert!(character
            .equip_item(&shield_id, EquipmentSlot::OffHand)
            .is_valid);
        assert_eq!(character.equipment.ac_penalty, 6); // 4 + 2

        character.equipment.armor[0].masterwork = true;
        character.recalculate_equipment();
        assert_eq!(character.equipment.ac_penalty, 5); // 3 + 2
    }

    #[test]
    fn test_max_dex_and_spell_failure() {
        let mut character = sample_character();
        assert_eq!(character.equipment.max_dex_bonus, UNCAPPED_DEX_BONUS);

        let armor_id = character.add_item(template_by_id("full_plate").unwrap());
        assert!(character.equip_item(&armor_id, EquipmentSlot::Body).is_valid);
        assert_eq!(character.equipment.max_dex_bonus, 1);
        assert_eq!(character.equipment.spell_failure, 35);
    }

    #[test]
    fn test_carrying_capacity_tiers() {
        let mut character = sample_character();

        character.ability_scores.str = crate::abilities::AbilityScore::with_base(8);
        assert_eq!(character.carrying_capacity().light, 80.0);

        character.ability_scores.str = crate::abilities::AbilityScore::with_base(15);
        let capacity = character.carrying_capacity();
        assert_eq!(capacity.light, 175.0);
        assert_eq!(capacity.medium, 350.0);
        assert_eq!(capacity.heavy, 525.0);
        assert_eq!(capacity.max, 875.0);

        // Above 20 the base doubles every 10 points.
        character.ability_scores.str = crate::abilities::AbilityScore::with_base(23);
        assert_eq!(character.carrying_capacity().light, 250.0 + 3.0 * 15.0);

        character.equipment.encumbrance_settings.custom_carrying_capacity = Some(400.0);
        assert_eq!(character.carrying_capacity().light, 400.0);
        assert_eq!(character.carrying_capacity().max, 2000.0);
    }

    #[test]
    fn test_encumbrance_levels_core_rules() {
        let mut character = sample_character();
        character.ability_scores.str = crate::abilities::AbilityScore::with_base(15);
        character.equipment.encumbrance_settings.enabled = true;

        for (weight, expected) in [
            (100.0, EncumbranceLevel::Light),
            (300.0, EncumbranceLevel::Medium),
            (400.0, EncumbranceLevel::Heavy),
            (550.0, EncumbranceLevel::Overloaded),
        ] {
            character.equipment.total_weight = weight;
            assert_eq!(character.encumbrance_level(), Some(expected));
        }
    }

    #[test]
    fn test_encumbrance_disabled_or_none_variant() {
        let mut character = sample_character();
        character.equipment.total_weight = 10_000.0;
        assert_eq!(character.encumbrance_level(), None);

        character.equipment.encumbrance_settings.enabled = true;
        character.equipment.encumbrance_settings.variant = EncumbranceVariant::None;
        assert_eq!(character.encumbrance_level(), None);
    }

    #[test]
    fn test_encumbrance_simplified_is_binary() {
        let mut character = sample_character();
        character.ability_scores.str = crate::abilities::AbilityScore::with_base(15);
        character.equipment.encumbrance_settings.enabled = true;
        character.equipment.encumbrance_settings.variant = EncumbranceVariant::Simplified;

        character.equipment.total_weight = 100.0;
        assert_eq!(character.encumbrance_level(), Some(EncumbranceLevel::Light));
        character.equipment.total_weight = 300.0;
        assert_eq!(character.encumbrance_level(), Some(EncumbranceLevel::Heavy));
    }

    #[test]
    fn test_range_penalty() {
        let longbow_template = template_by_id("longbow").unwrap();
        let TemplateKind::Weapon(props) = &longbow_template.template else {
            panic!("longbow is a weapon");
        };
        let longbow = Weapon::from_template(longbow_template, props);

        assert_eq!(range_penalty(&longbow, 50), 0);
        assert_eq!(range_penalty(&longbow, 100), 0);
        assert_eq!(range_penalty(&longbow, 101), -2);
        assert_eq!(range_penalty(&longbow, 250), -4);
        assert_eq!(effective_range(&longbow), 1000);

        let club_template = template_by_id("club").unwrap();
        let TemplateKind::Weapon(props) = &club_template.template else {
            panic!("club is a weapon");
        };
        let club = Weapon::from_template(club_template, props);
        assert_eq!(range_penalty(&club, 500), 0);
        assert_eq!(effective_range(&club), 0);
    }

    #[test]
    fn test_slot_map_serializes_as_plain_object() {
        let mut character = sample_character();
        let id = character.add_item(template_by_id("leather").unwrap());
        assert!(character.equip_item(&id, EquipmentSlot::Body).is_valid);

        let json = serde_json::to_value(&character.equipment).unwrap();
        let slots = json.get("equipped_slots").unwrap().as_object().unwrap();
        assert_eq!(slots.get("body").unwrap().as_str().unwrap(), id);

        let back: Equipment = serde_json::from_value(json).unwrap();
        assert_eq!(
            back.equipped_slots.get(&EquipmentSlot::Body),
            Some(&id)
        );
    }
}
