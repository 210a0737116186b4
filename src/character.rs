//! Aetherweave character types.
//!
//! Contains the data model shared by the progression, spellcasting,
//! experience, advancement, and psionics engines: ability scores, hit dice,
//! resource pools, class features, and per-class character entries.

use crate::class_data::{ClassArchetype, SpellcastingInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
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

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i8 {
        let score = self.get(ability) as i8;
        // Floor division handles scores below 10: 8-9 = -1, 10-11 = 0, 12-13 = +1.
        (score - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Hit Dice and Rests
// ============================================================================

/// Class hit dice. Every class uses exactly one of these four sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitDie {
    D6,
    D8,
    D10,
    D12,
}

impl HitDie {
    pub fn sides(&self) -> i32 {
        match self {
            HitDie::D6 => 6,
            HitDie::D8 => 8,
            HitDie::D10 => 10,
            HitDie::D12 => 12,
        }
    }

    pub fn from_sides(sides: i32) -> Option<HitDie> {
        match sides {
            6 => Some(HitDie::D6),
            8 => Some(HitDie::D8),
            10 => Some(HitDie::D10),
            12 => Some(HitDie::D12),
            _ => None,
        }
    }
}

impl fmt::Display for HitDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Rest lengths. Resources declare which rest restores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestType {
    Short,
    Long,
}

impl RestType {
    pub fn name(&self) -> &'static str {
        match self {
            RestType::Short => "short rest",
            RestType::Long => "long rest",
        }
    }
}

// ============================================================================
// Resource Pools
// ============================================================================

/// A spendable resource pool (AFP, resonance charges, battle surges, ...).
///
/// `temporary` sits on top of `current` and is consumed first when spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: i32,
    pub maximum: i32,
    pub temporary: i32,
    pub recovery: RestType,
}

impl ResourcePool {
    pub fn new(maximum: i32, recovery: RestType) -> Self {
        Self {
            current: maximum,
            maximum,
            temporary: 0,
            recovery,
        }
    }

    /// Total spendable amount (current plus temporary).
    pub fn available(&self) -> i32 {
        self.current + self.temporary
    }

    /// Grant temporary points. Temporary points do not stack; the higher
    /// grant wins.
    pub fn add_temporary(&mut self, amount: i32) {
        self.temporary = self.temporary.max(amount);
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.maximum
    }
}

// ============================================================================
// Class Features
// ============================================================================

/// How a feature is used in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Passive,
    Action,
    BonusAction,
    Free,
}

impl ActionType {
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::Passive => "passive",
            ActionType::Action => "action",
            ActionType::BonusAction => "bonus action",
            ActionType::Free => "free",
        }
    }
}

/// Mechanical details for an active feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMechanics {
    pub action: ActionType,
    pub effects: Vec<String>,
    /// Activation cost in the class's resource units, if any.
    pub cost: Option<u8>,
}

/// Limited-use tracking for a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUses {
    pub current: u8,
    pub maximum: u8,
    pub restore_on: RestType,
}

/// A class or archetype feature.
///
/// A feature is visible at character level L iff `level <= L`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFeature {
    /// Globally unique feature id.
    pub id: String,
    pub name: String,
    /// Minimum character level at which the feature unlocks (inclusive).
    pub level: u8,
    pub description: String,
    pub mechanics: Option<FeatureMechanics>,
    pub uses: Option<FeatureUses>,
}

impl ClassFeature {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        level: u8,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            description: description.into(),
            mechanics: None,
            uses: None,
        }
    }

    pub fn with_mechanics(mut self, action: ActionType, effects: Vec<String>) -> Self {
        self.mechanics = Some(FeatureMechanics {
            action,
            effects,
            cost: None,
        });
        self
    }

    pub fn with_cost(mut self, cost: u8) -> Self {
        if let Some(ref mut mechanics) = self.mechanics {
            mechanics.cost = Some(cost);
        }
        self
    }

    pub fn with_uses(mut self, maximum: u8, restore_on: RestType) -> Self {
        self.uses = Some(FeatureUses {
            current: maximum,
            maximum,
            restore_on,
        });
        self
    }
}

// ============================================================================
// Classes
// ============================================================================

/// The seven Aetherweave classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassName {
    Vanguard,
    Arcanist,
    Warden,
    Shadowblade,
    Voidcaller,
    Resonant,
    Mindweaver,
}

impl ClassName {
    pub fn name(&self) -> &'static str {
        match self {
            ClassName::Vanguard => "Vanguard",
            ClassName::Arcanist => "Arcanist",
            ClassName::Warden => "Warden",
            ClassName::Shadowblade => "Shadowblade",
            ClassName::Voidcaller => "Voidcaller",
            ClassName::Resonant => "Resonant",
            ClassName::Mindweaver => "Mindweaver",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ClassName::Vanguard => "A frontline warrior who channels raw momentum into battle surges",
            ClassName::Arcanist => "A scholar of the aether who bends it through studied formulae",
            ClassName::Warden => "A guardian of the wild places, blending arms and nature's aether",
            ClassName::Shadowblade => "A killer in the seams of the world, weaving dusk into steel",
            ClassName::Voidcaller => "A bargainer whose power wells up from a pact with the deep void",
            ClassName::Resonant => "A performer whose harmonics shape the aether into song",
            ClassName::Mindweaver => "A psion who spends their own flux to reshape thought and matter",
        }
    }

    pub fn hit_die(&self) -> HitDie {
        match self {
            ClassName::Vanguard => HitDie::D12,
            ClassName::Warden => HitDie::D10,
            ClassName::Shadowblade
            | ClassName::Voidcaller
            | ClassName::Resonant
            | ClassName::Mindweaver => HitDie::D8,
            ClassName::Arcanist => HitDie::D6,
        }
    }

    pub fn primary_ability(&self) -> Ability {
        match self {
            ClassName::Vanguard => Ability::Strength,
            ClassName::Arcanist => Ability::Intelligence,
            ClassName::Warden => Ability::Wisdom,
            ClassName::Shadowblade => Ability::Dexterity,
            ClassName::Voidcaller => Ability::Charisma,
            ClassName::Resonant => Ability::Charisma,
            ClassName::Mindweaver => Ability::Intelligence,
        }
    }

    pub fn all() -> &'static [ClassName] {
        &[
            ClassName::Vanguard,
            ClassName::Arcanist,
            ClassName::Warden,
            ClassName::Shadowblade,
            ClassName::Voidcaller,
            ClassName::Resonant,
            ClassName::Mindweaver,
        ]
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One class a character has levels in. Multiclass characters hold one
/// entry per class; total character level is the sum of entry levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub class_name: ClassName,
    pub level: u8,
    pub hit_die: HitDie,
    pub primary_ability: Ability,
    pub archetype: Option<ClassArchetype>,
    pub spellcasting: Option<SpellcastingInfo>,
    pub features: Vec<ClassFeature>,
}

impl CharacterClass {
    /// Create a class entry at the given level, snapshotting the registry's
    /// casting descriptor and the features unlocked at that level.
    pub fn new(class_name: ClassName, level: u8) -> Self {
        let info = class_name.info();
        Self {
            class_name,
            level,
            hit_die: info.hit_die,
            primary_ability: info.primary_ability,
            archetype: None,
            spellcasting: info.spellcasting,
            features: crate::progression::class_features_for_level(class_name, level as i32),
        }
    }

    /// Attach an archetype by id. Returns the entry unchanged when the id is
    /// not one of this class's archetypes.
    pub fn with_archetype(mut self, archetype_id: &str) -> Self {
        let info = self.class_name.info();
        if let Some(archetype) = info.archetypes.into_iter().find(|a| a.id == archetype_id) {
            self.archetype = Some(archetype);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_modifiers() {
        let scores = AbilityScores::new(15, 14, 13, 12, 10, 8);
        assert_eq!(scores.modifier(Ability::Strength), 2);
        assert_eq!(scores.modifier(Ability::Dexterity), 2);
        assert_eq!(scores.modifier(Ability::Constitution), 1);
        assert_eq!(scores.modifier(Ability::Wisdom), 0);
        assert_eq!(scores.modifier(Ability::Charisma), -1);
    }

    #[test]
    fn test_modifier_floor_division() {
        let mut scores = AbilityScores::default();
        scores.set(Ability::Strength, 7);
        assert_eq!(scores.modifier(Ability::Strength), -2);
        scores.set(Ability::Strength, 20);
        assert_eq!(scores.modifier(Ability::Strength), 5);
    }

    #[test]
    fn test_hit_die_sides() {
        assert_eq!(HitDie::D6.sides(), 6);
        assert_eq!(HitDie::D12.sides(), 12);
        assert_eq!(HitDie::from_sides(10), Some(HitDie::D10));
        assert_eq!(HitDie::from_sides(20), None);
    }

    #[test]
    fn test_resource_pool_temporary_does_not_stack() {
        let mut pool = ResourcePool::new(10, RestType::Long);
        pool.add_temporary(3);
        pool.add_temporary(2);
        assert_eq!(pool.temporary, 3);
        assert_eq!(pool.available(), 13);
    }

    #[test]
    fn test_every_class_has_a_valid_hit_die() {
        for class in ClassName::all() {
            let sides = class.hit_die().sides();
            assert!(matches!(sides, 6 | 8 | 10 | 12));
        }
    }

    #[test]
    fn test_class_entry_snapshots_level_features() {
        let entry = CharacterClass::new(ClassName::Vanguard, 1);
        assert_eq!(entry.hit_die, HitDie::D12);
        assert!(entry.features.iter().all(|f| f.level <= 1));
        assert!(!entry.features.is_empty());
    }
}
