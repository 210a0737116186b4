//! Multiclass and spellcasting aggregation.
//!
//! Combines caster levels across full, half, third, and pact casters, maps
//! the combined level onto the shared spell-slot table, and validates
//! multiclass ability-score prerequisites.

use crate::character::{Ability, AbilityScores, CharacterClass, ClassName};
use crate::class_data::CasterProgression;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared spell-slot table: one row per combined caster level 1-20, one
/// column per slot tier 1-9.
pub const SPELL_SLOT_TABLE: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Derived multiclass spellcasting summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedSpellcasting {
    /// Aggregate caster level across all casting classes.
    pub caster_level: i32,
    /// Slots per tier 1-9; empty when the aggregate caster level is 0.
    pub spell_slots: Vec<u8>,
    /// Casting ability per contributing class, pact casters included.
    pub spellcasting_abilities: HashMap<ClassName, Ability>,
}

/// Total character level: sum of class entry levels, 0 for no entries.
pub fn total_level(classes: &[CharacterClass]) -> i32 {
    classes.iter().map(|entry| entry.level as i32).sum()
}

/// Check the ability-score prerequisite for taking a level in a new class.
///
/// Every class requires its primary ability at 13 or higher, except the
/// Mindweaver, which accepts Intelligence 13 OR Wisdom 13 (an either/or
/// rule, so it cannot ride the single-ability table).
pub fn meets_multiclass_prerequisites(class: ClassName, scores: &AbilityScores) -> bool {
    match class {
        ClassName::Mindweaver => {
            scores.get(Ability::Intelligence) >= 13 || scores.get(Ability::Wisdom) >= 13
        }
        _ => scores.get(class.primary_ability()) >= 13,
    }
}

/// Spell slots for a combined caster level.
///
/// Level 0 (or below) has no slots. Levels above 20 clamp to the level-20
/// row rather than erroring.
pub fn spell_slots(caster_level: i32) -> Vec<u8> {
    if caster_level <= 0 {
        return Vec::new();
    }
    let index = (caster_level.min(20) - 1) as usize;
    SPELL_SLOT_TABLE[index].to_vec()
}

/// Caster-level contribution of one class entry.
fn caster_level_contribution(progression: CasterProgression, level: i32) -> i32 {
    match progression {
        CasterProgression::Full => level,
        CasterProgression::Half => level / 2,
        CasterProgression::Third => level / 3,
        CasterProgression::Pact => 0,
    }
}

/// Aggregate spellcasting across a multiclass character.
///
/// Returns `None` when no class entry carries a casting descriptor. Pact
/// casters contribute 0 to the aggregate caster level but are still
/// recorded in `spellcasting_abilities`.
pub fn combined_spellcasting(classes: &[CharacterClass]) -> Option<CombinedSpellcasting> {
    let casters: Vec<_> = classes
        .iter()
        .filter_map(|entry| entry.spellcasting.map(|sc| (entry, sc)))
        .collect();

    if casters.is_empty() {
        return None;
    }

    let mut caster_level = 0;
    let mut spellcasting_abilities = HashMap::new();
    for (entry, casting) in &casters {
        caster_level += caster_level_contribution(casting.progression, entry.level as i32);
        spellcasting_abilities.insert(entry.class_name, casting.ability);
    }

    Some(CombinedSpellcasting {
        caster_level,
        spell_slots: spell_slots(caster_level),
        spellcasting_abilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_slot_reference_rows() {
        assert_eq!(spell_slots(1), vec![2, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(spell_slots(5), vec![4, 3, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(spell_slots(20), vec![4, 3, 3, 3, 3, 2, 2, 1, 1]);
    }

    #[test]
    fn test_spell_slots_clamp_above_20() {
        assert_eq!(spell_slots(21), spell_slots(20));
        assert_eq!(spell_slots(99), spell_slots(20));
    }

    #[test]
    fn test_spell_slots_empty_at_zero() {
        assert!(spell_slots(0).is_empty());
        assert!(spell_slots(-3).is_empty());
    }

    #[test]
    fn test_total_level() {
        assert_eq!(total_level(&[]), 0);
        let classes = vec![
            CharacterClass::new(ClassName::Arcanist, 3),
            CharacterClass::new(ClassName::Warden, 4),
        ];
        assert_eq!(total_level(&classes), 7);
    }

    #[test]
    fn test_full_plus_half_caster_level() {
        let classes = vec![
            CharacterClass::new(ClassName::Arcanist, 3),
            CharacterClass::new(ClassName::Warden, 4),
        ];
        let combined = combined_spellcasting(&classes).expect("both cast");
        // 3 + floor(4/2) = 5
        assert_eq!(combined.caster_level, 5);
        assert_eq!(combined.spell_slots, vec![4, 3, 2, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_third_caster_rounds_down() {
        let classes = vec![CharacterClass::new(ClassName::Shadowblade, 5)];
        let combined = combined_spellcasting(&classes).expect("casts");
        assert_eq!(combined.caster_level, 1);
    }

    #[test]
    fn test_pact_caster_recorded_but_contributes_zero() {
        let classes = vec![CharacterClass::new(ClassName::Voidcaller, 7)];
        let combined = combined_spellcasting(&classes).expect("pact casting present");
        assert_eq!(combined.caster_level, 0);
        assert!(combined.spell_slots.is_empty());
        assert_eq!(
            combined.spellcasting_abilities.get(&ClassName::Voidcaller),
            Some(&Ability::Charisma)
        );
    }

    #[test]
    fn test_no_casters_is_none() {
        let classes = vec![CharacterClass::new(ClassName::Vanguard, 10)];
        assert!(combined_spellcasting(&classes).is_none());
    }

    #[test]
    fn test_multiclass_prerequisites() {
        let mut scores = AbilityScores::default();
        assert!(!meets_multiclass_prerequisites(ClassName::Vanguard, &scores));
        scores.set(Ability::Strength, 13);
        assert!(meets_multiclass_prerequisites(ClassName::Vanguard, &scores));
    }

    #[test]
    fn test_mindweaver_prerequisite_is_either_or() {
        let mut scores = AbilityScores::default();
        assert!(!meets_multiclass_prerequisites(ClassName::Mindweaver, &scores));
        scores.set(Ability::Wisdom, 13);
        assert!(meets_multiclass_prerequisites(ClassName::Mindweaver, &scores));
        scores.set(Ability::Wisdom, 10);
        scores.set(Ability::Intelligence, 13);
        assert!(meets_multiclass_prerequisites(ClassName::Mindweaver, &scores));
    }
}
