//! QA tests for character progression.
//!
//! These tests drive the public API end to end: multiclass builds, the
//! experience state machine, level-up choice validation, and serialization
//! of the derived records.

use aether_core::advancement::{
    advancement_options, apply_ability_score_improvements, are_advancement_choices_complete,
    validate_advancement_choices, AbilityScoreImprovement, AdvancementChoices,
};
use aether_core::experience::{add_experience, calculate_level_advancement, ExperienceData};
use aether_core::{
    calculate_hit_points_gained, proficiency_bonus, Ability, AbilityScores, ClassName, HitDie,
    ProgressionBuilder, ViolationCode,
};
use chrono::{TimeZone, Utc};

fn scores() -> AbilityScores {
    AbilityScores::new(15, 14, 13, 13, 13, 10)
}

// =============================================================================
// MULTICLASS PROGRESSION
// =============================================================================

#[test]
fn test_full_multiclass_build() {
    let progression = ProgressionBuilder::new()
        .class_with_archetype(ClassName::Arcanist, 3, "path_of_the_torrent")
        .class(ClassName::Warden, 4)
        .ability_scores(scores())
        .build()
        .expect("prerequisites are met");

    assert_eq!(progression.total_level, 7);
    assert_eq!(progression.proficiency_bonus, 3);

    // Base features of both classes are present, plus archetype features.
    assert!(progression
        .features
        .iter()
        .any(|f| f.id == "arcanist_arcane_reservoir"));
    assert!(progression.features.iter().any(|f| f.id == "warden_wildward"));
    assert!(progression
        .features
        .iter()
        .any(|f| f.id == "torrent_sculpted_force"));

    // Full 3 + half 4 = caster level 5.
    let casting = progression.spellcasting.expect("both classes cast");
    assert_eq!(casting.caster_level, 5);
    assert_eq!(casting.spell_slots, vec![4, 3, 2, 0, 0, 0, 0, 0, 0]);
    assert_eq!(
        casting.spellcasting_abilities.get(&ClassName::Arcanist),
        Some(&Ability::Intelligence)
    );
    assert_eq!(
        casting.spellcasting_abilities.get(&ClassName::Warden),
        Some(&Ability::Wisdom)
    );
}

#[test]
fn test_prerequisites_block_weak_multiclass() {
    let weak = AbilityScores::new(13, 10, 10, 10, 10, 10);
    let violations = ProgressionBuilder::new()
        .class(ClassName::Vanguard, 2)
        .class(ClassName::Voidcaller, 1)
        .ability_scores(weak)
        .build()
        .expect_err("Voidcaller needs CHA 13");
    assert!(violations
        .iter()
        .all(|v| v.code == ViolationCode::MulticlassPrerequisiteNotMet));
}

#[test]
fn test_progression_serializes_round_trip() {
    let progression = ProgressionBuilder::new()
        .class_with_archetype(ClassName::Mindweaver, 5, "discipline_of_the_veil")
        .ability_scores(scores())
        .build()
        .expect("valid build");

    let json = serde_json::to_string(&progression).expect("serializes");
    let restored: aether_core::CharacterProgression =
        serde_json::from_str(&json).expect("deserializes");
    assert_eq!(restored, progression);
}

#[test]
fn test_proficiency_bonus_reference_values() {
    assert_eq!(proficiency_bonus(1), 2);
    assert_eq!(proficiency_bonus(5), 3);
    assert_eq!(proficiency_bonus(9), 4);
    assert_eq!(proficiency_bonus(13), 5);
    assert_eq!(proficiency_bonus(17), 6);
    // Extrapolated, not clamped.
    assert_eq!(proficiency_bonus(21), 7);
}

// =============================================================================
// EXPERIENCE AND LEVELING
// =============================================================================

#[test]
fn test_xp_grant_through_level_up_flow() {
    let data = ExperienceData::new(0);
    assert_eq!(data.current_level, 1);

    // A big grant spans several levels in one step.
    let advancement = calculate_level_advancement(data.current_xp, data.current_level, 6_500);
    assert!(advancement.is_valid);
    assert_eq!(advancement.from_level, 1);
    assert_eq!(advancement.to_level, 5);

    let data = add_experience(&data, 6_500).expect("valid grant");
    assert_eq!(data.current_level, 5);
    assert_eq!(data.current_level_xp, 6_500);
    assert_eq!(data.next_level_xp, 14_000);
}

#[test]
fn test_tampered_level_is_rejected() {
    // A stored level that disagrees with stored XP never advances.
    let advancement = calculate_level_advancement(900, 7, 1_000);
    assert!(!advancement.is_valid);
    assert_eq!(
        advancement.errors[0].code,
        ViolationCode::InconsistentCurrentLevel
    );
}

// =============================================================================
// ADVANCEMENT CHOICES
// =============================================================================

#[test]
fn test_level_four_asi_flow() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let options = advancement_options(4, ClassName::Vanguard, &scores());
    assert!(options.ability_score_improvement_available);
    assert_eq!(options.hit_die, HitDie::D12);

    let mut choices = AdvancementChoices::new(4, ClassName::Vanguard, now);
    choices.hit_points_gained =
        calculate_hit_points_gained(options.hit_die, "average", None).expect("average is valid");
    assert_eq!(choices.hit_points_gained, 7);

    choices.ability_score_improvements = Some(vec![
        AbilityScoreImprovement {
            ability: Ability::Strength,
            increase: 2,
        },
    ]);

    validate_advancement_choices(&choices, &scores()).expect("valid choices");
    are_advancement_choices_complete(&choices, &options).expect("complete choices");

    let updated = apply_ability_score_improvements(
        &scores(),
        choices.ability_score_improvements.as_ref().unwrap(),
    )
    .expect("17 is under the cap");
    assert_eq!(updated.strength, 17);
}

#[test]
fn test_validated_choices_never_exceed_ability_cap() {
    // A +2 on a 19 must error, not clamp to 20.
    let mut high = scores();
    high.set(Ability::Strength, 19);
    let improvements = [AbilityScoreImprovement {
        ability: Ability::Strength,
        increase: 2,
    }];
    let violations =
        apply_ability_score_improvements(&high, &improvements).expect_err("21 exceeds the cap");
    assert_eq!(violations[0].code, ViolationCode::AbilityScoreMaxExceeded);

    // +1 on a 19 lands exactly on the cap and is fine.
    let improvements = [AbilityScoreImprovement {
        ability: Ability::Strength,
        increase: 1,
    }];
    let updated = apply_ability_score_improvements(&high, &improvements).expect("20 is the cap");
    assert_eq!(updated.strength, 20);
}

#[test]
fn test_archetype_selection_appears_once_per_class() {
    for class in ClassName::all() {
        let selection_level = class.archetype_selection_level() as i32;
        for level in 1..=20 {
            let options = advancement_options(level, *class, &scores());
            assert_eq!(
                options.archetype_selection.is_some(),
                level == selection_level,
                "{class} level {level}"
            );
        }
    }
}
