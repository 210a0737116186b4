//! Level-up advancement choices.
//!
//! Validates and completes a level-up: hit-point gain method, ability score
//! improvement vs. feat, feat prerequisites, and per-level options such as
//! archetype selection. Validators accumulate every violated rule.

use crate::character::{
    AbilityScores, Ability, ClassFeature, ClassName, HitDie,
};
use crate::class_data::ClassArchetype;
use crate::validation::{RuleResult, Violation, ViolationCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Levels granting an ability score improvement. Uniform across all seven
/// classes; no class currently overrides the cadence.
pub const ASI_LEVELS: [u8; 5] = [4, 8, 12, 16, 19];

/// Hard cap on any single ability score.
pub const ABILITY_SCORE_MAX: u8 = 20;

/// True when the given class level grants an ability score improvement.
/// The class parameter is the override point for a future class-specific
/// cadence; every class currently uses [`ASI_LEVELS`].
pub fn is_asi_level(level: i32, _class: ClassName) -> bool {
    level >= 1 && level <= u8::MAX as i32 && ASI_LEVELS.contains(&(level as u8))
}

// ============================================================================
// Hit Points
// ============================================================================

/// Error from parsing externally supplied advancement strings.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("unknown hit point method: {0}")]
    UnknownHitPointMethod(String),
}

/// How hit points are gained on level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitPointMethod {
    Average,
    Rolled,
}

impl HitPointMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitPointMethod::Average => "average",
            HitPointMethod::Rolled => "rolled",
        }
    }
}

impl FromStr for HitPointMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(HitPointMethod::Average),
            "rolled" => Ok(HitPointMethod::Rolled),
            other => Err(ParseError::UnknownHitPointMethod(other.to_string())),
        }
    }
}

/// Average hit-point gain for a hit die, rounded half up: d6 gives 4, d8
/// gives 5, d10 gives 6, d12 gives 7. The round-up is this system's
/// explicit policy.
pub fn average_hit_points(hit_die: HitDie) -> i32 {
    (hit_die.sides() + 2) / 2
}

/// Hit points gained on a level-up.
///
/// `method` is the externally supplied method string: "average" uses the
/// rounded-up die average; "rolled" requires a roll in [1, sides]; any
/// other string fails INVALID_HP_METHOD.
pub fn calculate_hit_points_gained(
    hit_die: HitDie,
    method: &str,
    rolled_value: Option<i32>,
) -> RuleResult<i32> {
    let method = match HitPointMethod::from_str(method) {
        Ok(method) => method,
        Err(err) => {
            return Err(vec![Violation::new(
                ViolationCode::InvalidHpMethod,
                "hitPointMethod",
                err.to_string(),
            )]);
        }
    };

    match method {
        HitPointMethod::Average => Ok(average_hit_points(hit_die)),
        HitPointMethod::Rolled => match rolled_value {
            None => Err(vec![Violation::new(
                ViolationCode::MissingRolledValue,
                "rolledValue",
                "rolled method requires a rolled value",
            )]),
            Some(value) if value < 1 || value > hit_die.sides() => Err(vec![Violation::new(
                ViolationCode::InvalidRolledValue,
                "rolledValue",
                format!("rolled value {value} is outside 1..={}", hit_die.sides()),
            )]),
            Some(value) => Ok(value),
        },
    }
}

/// Roll a hit die for level-up hit points.
pub fn roll_hit_points(hit_die: HitDie) -> i32 {
    use rand::Rng;
    rand::thread_rng().gen_range(1..=hit_die.sides())
}

// ============================================================================
// Feats
// ============================================================================

/// A requirement a character must meet to take a feat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatPrerequisite {
    MinimumAbility { ability: Ability, score: u8 },
    MinimumLevel(u8),
    Spellcasting,
    Psionics,
}

/// A selectable feat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feat {
    pub id: String,
    pub name: String,
    pub description: String,
    pub prerequisites: Vec<FeatPrerequisite>,
}

impl Feat {
    fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            prerequisites: Vec::new(),
        }
    }

    fn with_prerequisites(mut self, prerequisites: Vec<FeatPrerequisite>) -> Self {
        self.prerequisites = prerequisites;
        self
    }
}

lazy_static::lazy_static! {
    /// The feat catalog.
    pub static ref FEATS: Vec<Feat> = vec![
        Feat::new("iron_will", "Iron Will", "You have advantage on saves against fear."),
        Feat::new(
            "resilient_mind",
            "Resilient Mind",
            "Gain proficiency in Intelligence saving throws.",
        ),
        Feat::new(
            "heavy_plate_mastery",
            "Heavy Plate Mastery",
            "Heavy armor no longer reduces your speed.",
        )
        .with_prerequisites(vec![FeatPrerequisite::MinimumAbility {
            ability: Ability::Strength,
            score: 13,
        }]),
        Feat::new(
            "blade_dancer",
            "Blade Dancer",
            "When you take the Disengage action, your speed increases by 10 feet.",
        )
        .with_prerequisites(vec![FeatPrerequisite::MinimumAbility {
            ability: Ability::Dexterity,
            score: 13,
        }]),
        Feat::new(
            "battle_medic",
            "Battle Medic",
            "Stabilizing a creature also restores hit points equal to your Wisdom modifier.",
        )
        .with_prerequisites(vec![FeatPrerequisite::MinimumAbility {
            ability: Ability::Wisdom,
            score: 13,
        }]),
        Feat::new(
            "aether_adept",
            "Aether Adept",
            "Learn two additional first-tier formulae from any casting class's list.",
        )
        .with_prerequisites(vec![FeatPrerequisite::Spellcasting]),
        Feat::new(
            "flux_channeler",
            "Flux Channeler",
            "Your Aether Flux maximum increases by 2.",
        )
        .with_prerequisites(vec![
            FeatPrerequisite::Psionics,
            FeatPrerequisite::MinimumAbility {
                ability: Ability::Intelligence,
                score: 13,
            },
        ]),
        Feat::new(
            "veterans_instinct",
            "Veteran's Instinct",
            "You cannot be surprised while conscious.",
        )
        .with_prerequisites(vec![FeatPrerequisite::MinimumLevel(4)]),
        Feat::new(
            "overwhelming_presence",
            "Overwhelming Presence",
            "Once per long rest, force every hostile creature within 30 feet to save or be cowed.",
        )
        .with_prerequisites(vec![
            FeatPrerequisite::MinimumAbility {
                ability: Ability::Charisma,
                score: 13,
            },
            FeatPrerequisite::MinimumLevel(8),
        ]),
        Feat::new(
            "twinned_focus",
            "Twinned Focus",
            "Your focus limit increases by 1.",
        )
        .with_prerequisites(vec![
            FeatPrerequisite::Psionics,
            FeatPrerequisite::MinimumLevel(12),
        ]),
    ];
}

/// Look up a feat by id.
pub fn get_feat(id: &str) -> Option<Feat> {
    FEATS.iter().find(|feat| feat.id == id).cloned()
}

/// Check a feat's prerequisites for a character advancing in a class.
pub fn meets_feat_prerequisites(
    feat: &Feat,
    class: ClassName,
    level: i32,
    scores: &AbilityScores,
) -> bool {
    let info = class.info();
    feat.prerequisites.iter().all(|prerequisite| match prerequisite {
        FeatPrerequisite::MinimumAbility { ability, score } => scores.get(*ability) >= *score,
        FeatPrerequisite::MinimumLevel(minimum) => level >= *minimum as i32,
        FeatPrerequisite::Spellcasting => info.spellcasting.is_some(),
        FeatPrerequisite::Psionics => info.psionics.is_some(),
    })
}

// ============================================================================
// Advancement Options
// ============================================================================

/// Archetype selection offered at the class's selection level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeSelection {
    pub selection_level: u8,
    pub options: Vec<ClassArchetype>,
}

/// Everything a character may choose when gaining a level in a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancementOptions {
    pub hit_die: HitDie,
    pub ability_score_improvement_available: bool,
    pub available_feats: Vec<Feat>,
    /// Present only at the class's archetype-selection level.
    pub archetype_selection: Option<ArchetypeSelection>,
}

/// Compute the advancement options for gaining a level in a class.
pub fn advancement_options(
    level: i32,
    class: ClassName,
    scores: &AbilityScores,
) -> AdvancementOptions {
    let info = class.info();
    let archetype_selection = if level == class.archetype_selection_level() as i32 {
        Some(ArchetypeSelection {
            selection_level: class.archetype_selection_level(),
            options: info.archetypes.clone(),
        })
    } else {
        None
    };

    AdvancementOptions {
        hit_die: info.hit_die,
        ability_score_improvement_available: is_asi_level(level, class),
        available_feats: FEATS
            .iter()
            .filter(|feat| meets_feat_prerequisites(feat, class, level, scores))
            .cloned()
            .collect(),
        archetype_selection,
    }
}

// ============================================================================
// Advancement Choices
// ============================================================================

/// One ability improved during an ASI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScoreImprovement {
    pub ability: Ability,
    pub increase: u8,
}

/// The choices made for one gained level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancementChoices {
    pub level: i32,
    pub advancing_class: ClassName,
    pub hit_points_gained: i32,
    pub hit_point_method: HitPointMethod,
    pub ability_score_improvements: Option<Vec<AbilityScoreImprovement>>,
    /// Mutually exclusive with an ASI.
    pub feat_selected: Option<String>,
    pub class_features: Vec<ClassFeature>,
    pub spells_learned: Option<Vec<String>>,
    pub skills_gained: Option<Vec<String>>,
    pub proficiencies_gained: Option<Vec<String>>,
    pub class_specific_choices: Option<HashMap<String, String>>,
    pub choices_made_at: DateTime<Utc>,
    /// Set once the choices have been merged into the character.
    pub applied: bool,
}

impl AdvancementChoices {
    pub fn new(level: i32, advancing_class: ClassName, made_at: DateTime<Utc>) -> Self {
        Self {
            level,
            advancing_class,
            hit_points_gained: 0,
            hit_point_method: HitPointMethod::Average,
            ability_score_improvements: None,
            feat_selected: None,
            class_features: Vec::new(),
            spells_learned: None,
            skills_gained: None,
            proficiencies_gained: None,
            class_specific_choices: None,
            choices_made_at: made_at,
            applied: false,
        }
    }

    fn has_asi(&self) -> bool {
        self.ability_score_improvements
            .as_ref()
            .is_some_and(|improvements| !improvements.is_empty())
    }
}

/// Validate a set of advancement choices, accumulating every violated rule.
pub fn validate_advancement_choices(
    choices: &AdvancementChoices,
    scores: &AbilityScores,
) -> RuleResult<()> {
    let mut violations = Vec::new();

    if choices.level < 1 {
        violations.push(Violation::new(
            ViolationCode::InvalidLevelTooLow,
            "level",
            "Level cannot be lower than 1",
        ));
    } else if choices.level > 20 {
        violations.push(Violation::new(
            ViolationCode::InvalidLevelTooHigh,
            "level",
            "Level cannot exceed 20",
        ));
    }

    if choices.hit_points_gained < 0 {
        violations.push(Violation::new(
            ViolationCode::InvalidHitPointsNegative,
            "hitPointsGained",
            "Hit points gained cannot be negative",
        ));
    }

    if choices.has_asi() && choices.feat_selected.is_some() {
        violations.push(Violation::new(
            ViolationCode::AsiAndFeatConflict,
            "featSelected",
            "An ability score improvement and a feat cannot be taken at the same level",
        ));
    }

    if let Some(ref feat_id) = choices.feat_selected {
        match get_feat(feat_id) {
            None => violations.push(Violation::new(
                ViolationCode::FeatPrerequisitesNotMet,
                "featSelected",
                format!("unknown feat '{feat_id}'"),
            )),
            Some(feat) => {
                if !meets_feat_prerequisites(&feat, choices.advancing_class, choices.level, scores)
                {
                    violations.push(Violation::new(
                        ViolationCode::FeatPrerequisitesNotMet,
                        "featSelected",
                        format!("prerequisites for '{}' are not met", feat.name),
                    ));
                }
            }
        }
    }

    if let Some(ref improvements) = choices.ability_score_improvements {
        let mut seen = Vec::new();
        for improvement in improvements {
            if seen.contains(&improvement.ability) {
                violations.push(Violation::new(
                    ViolationCode::DuplicateAsi,
                    "abilityScoreImprovements",
                    format!("{} appears more than once", improvement.ability.name()),
                ));
            }
            seen.push(improvement.ability);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Apply ability score improvements, failing (never clamping) when any
/// resulting score would exceed [`ABILITY_SCORE_MAX`].
pub fn apply_ability_score_improvements(
    scores: &AbilityScores,
    improvements: &[AbilityScoreImprovement],
) -> RuleResult<AbilityScores> {
    let mut violations = Vec::new();
    let mut updated = scores.clone();

    for improvement in improvements {
        let new_score = updated.get(improvement.ability) + improvement.increase;
        if new_score > ABILITY_SCORE_MAX {
            violations.push(Violation::new(
                ViolationCode::AbilityScoreMaxExceeded,
                "abilityScoreImprovements",
                format!(
                    "{} would become {new_score}, exceeding the maximum of {ABILITY_SCORE_MAX}",
                    improvement.ability.name()
                ),
            ));
        } else {
            updated.set(improvement.ability, new_score);
        }
    }

    if violations.is_empty() {
        Ok(updated)
    } else {
        Err(violations)
    }
}

/// Check that a set of choices covers everything the options require.
pub fn are_advancement_choices_complete(
    choices: &AdvancementChoices,
    options: &AdvancementOptions,
) -> RuleResult<()> {
    let mut violations = Vec::new();

    if choices.hit_points_gained <= 0 {
        violations.push(Violation::new(
            ViolationCode::MissingHitPoints,
            "hitPointsGained",
            "Hit points gained must be chosen for the level",
        ));
    }

    if options.ability_score_improvement_available
        && !choices.has_asi()
        && choices.feat_selected.is_none()
    {
        violations.push(Violation::new(
            ViolationCode::MissingAsiOrFeat,
            "abilityScoreImprovements",
            "This level grants an ability score improvement or a feat; choose one",
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn standard_scores() -> AbilityScores {
        AbilityScores::new(15, 14, 13, 12, 10, 8)
    }

    #[test]
    fn test_asi_levels_uniform_across_classes() {
        for class in ClassName::all() {
            for level in [4, 8, 12, 16, 19] {
                assert!(is_asi_level(level, *class));
            }
            for level in [1, 3, 5, 10, 20] {
                assert!(!is_asi_level(level, *class));
            }
        }
    }

    #[test]
    fn test_average_hit_points_round_up() {
        assert_eq!(average_hit_points(HitDie::D6), 4);
        assert_eq!(average_hit_points(HitDie::D8), 5);
        assert_eq!(average_hit_points(HitDie::D10), 6);
        assert_eq!(average_hit_points(HitDie::D12), 7);
    }

    #[test]
    fn test_calculate_hit_points_average() {
        assert_eq!(
            calculate_hit_points_gained(HitDie::D10, "average", None),
            Ok(6)
        );
    }

    #[test]
    fn test_calculate_hit_points_rolled() {
        assert_eq!(
            calculate_hit_points_gained(HitDie::D8, "rolled", Some(7)),
            Ok(7)
        );

        let errors =
            calculate_hit_points_gained(HitDie::D8, "rolled", None).expect_err("missing roll");
        assert_eq!(errors[0].code, ViolationCode::MissingRolledValue);

        let errors =
            calculate_hit_points_gained(HitDie::D8, "rolled", Some(9)).expect_err("out of range");
        assert_eq!(errors[0].code, ViolationCode::InvalidRolledValue);

        let errors =
            calculate_hit_points_gained(HitDie::D8, "rolled", Some(0)).expect_err("out of range");
        assert_eq!(errors[0].code, ViolationCode::InvalidRolledValue);
    }

    #[test]
    fn test_calculate_hit_points_unknown_method() {
        let errors =
            calculate_hit_points_gained(HitDie::D8, "maximum", None).expect_err("unknown method");
        assert_eq!(errors[0].code, ViolationCode::InvalidHpMethod);
    }

    #[test]
    fn test_roll_hit_points_in_range() {
        for _ in 0..100 {
            let roll = roll_hit_points(HitDie::D12);
            assert!((1..=12).contains(&roll));
        }
    }

    #[test]
    fn test_feat_prerequisites() {
        let scores = standard_scores();
        let heavy_plate = get_feat("heavy_plate_mastery").unwrap();
        assert!(meets_feat_prerequisites(
            &heavy_plate,
            ClassName::Vanguard,
            1,
            &scores
        ));

        let weak = AbilityScores::default();
        assert!(!meets_feat_prerequisites(
            &heavy_plate,
            ClassName::Vanguard,
            1,
            &weak
        ));

        // Spellcasting-gated feat: available to a caster, not to the Vanguard.
        let adept = get_feat("aether_adept").unwrap();
        assert!(meets_feat_prerequisites(&adept, ClassName::Arcanist, 1, &scores));
        assert!(!meets_feat_prerequisites(&adept, ClassName::Vanguard, 1, &scores));

        // Psionics + level gate.
        let twinned = get_feat("twinned_focus").unwrap();
        assert!(meets_feat_prerequisites(&twinned, ClassName::Mindweaver, 12, &scores));
        assert!(!meets_feat_prerequisites(&twinned, ClassName::Mindweaver, 11, &scores));
    }

    #[test]
    fn test_advancement_options_archetype_only_at_selection_level() {
        let scores = standard_scores();
        let at_selection = advancement_options(1, ClassName::Vanguard, &scores);
        let selection = at_selection.archetype_selection.expect("Vanguard selects at 1");
        assert_eq!(selection.options.len(), 2);

        for level in 2..=20 {
            let options = advancement_options(level, ClassName::Vanguard, &scores);
            assert!(options.archetype_selection.is_none());
        }

        let arcanist = advancement_options(2, ClassName::Arcanist, &scores);
        assert!(arcanist.archetype_selection.is_some());
    }

    #[test]
    fn test_advancement_options_asi_flag() {
        let scores = standard_scores();
        assert!(advancement_options(4, ClassName::Warden, &scores).ability_score_improvement_available);
        assert!(!advancement_options(5, ClassName::Warden, &scores).ability_score_improvement_available);
    }

    #[test]
    fn test_validate_choices_accumulates_all_errors() {
        let mut choices = AdvancementChoices::new(25, ClassName::Vanguard, fixed_now());
        choices.hit_points_gained = -2;
        choices.ability_score_improvements = Some(vec![
            AbilityScoreImprovement {
                ability: Ability::Strength,
                increase: 1,
            },
            AbilityScoreImprovement {
                ability: Ability::Strength,
                increase: 1,
            },
        ]);
        choices.feat_selected = Some("iron_will".to_string());

        let violations =
            validate_advancement_choices(&choices, &standard_scores()).expect_err("invalid");
        let codes: Vec<_> = violations.iter().map(|v| v.code).collect();
        assert!(codes.contains(&ViolationCode::InvalidLevelTooHigh));
        assert!(codes.contains(&ViolationCode::InvalidHitPointsNegative));
        assert!(codes.contains(&ViolationCode::AsiAndFeatConflict));
        assert!(codes.contains(&ViolationCode::DuplicateAsi));
        assert_eq!(violations.len(), 4);
    }

    #[test]
    fn test_validate_choices_feat_prerequisites() {
        let mut choices = AdvancementChoices::new(4, ClassName::Vanguard, fixed_now());
        choices.hit_points_gained = 7;
        choices.feat_selected = Some("aether_adept".to_string());

        let violations =
            validate_advancement_choices(&choices, &standard_scores()).expect_err("not a caster");
        assert_eq!(violations[0].code, ViolationCode::FeatPrerequisitesNotMet);
    }

    #[test]
    fn test_validate_choices_accepts_valid_asi_level() {
        let mut choices = AdvancementChoices::new(4, ClassName::Vanguard, fixed_now());
        choices.hit_points_gained = 7;
        choices.ability_score_improvements = Some(vec![
            AbilityScoreImprovement {
                ability: Ability::Strength,
                increase: 1,
            },
            AbilityScoreImprovement {
                ability: Ability::Constitution,
                increase: 1,
            },
        ]);
        assert!(validate_advancement_choices(&choices, &standard_scores()).is_ok());
    }

    #[test]
    fn test_apply_improvements_errors_instead_of_clamping() {
        let mut scores = standard_scores();
        scores.set(Ability::Strength, 20);
        let improvements = [AbilityScoreImprovement {
            ability: Ability::Strength,
            increase: 1,
        }];
        let errors =
            apply_ability_score_improvements(&scores, &improvements).expect_err("over cap");
        assert_eq!(errors[0].code, ViolationCode::AbilityScoreMaxExceeded);
    }

    #[test]
    fn test_apply_improvements_changes_only_named_abilities() {
        let scores = standard_scores();
        let improvements = [AbilityScoreImprovement {
            ability: Ability::Charisma,
            increase: 2,
        }];
        let updated = apply_ability_score_improvements(&scores, &improvements).expect("valid");
        assert_eq!(updated.charisma, 10);
        assert_eq!(updated.strength, scores.strength);
        assert_eq!(updated.wisdom, scores.wisdom);
    }

    #[test]
    fn test_completeness_checks() {
        let scores = standard_scores();
        let options = advancement_options(4, ClassName::Vanguard, &scores);

        let choices = AdvancementChoices::new(4, ClassName::Vanguard, fixed_now());
        let violations = are_advancement_choices_complete(&choices, &options).expect_err("empty");
        let codes: Vec<_> = violations.iter().map(|v| v.code).collect();
        assert!(codes.contains(&ViolationCode::MissingHitPoints));
        assert!(codes.contains(&ViolationCode::MissingAsiOrFeat));

        let mut complete = AdvancementChoices::new(4, ClassName::Vanguard, fixed_now());
        complete.hit_points_gained = 7;
        complete.feat_selected = Some("iron_will".to_string());
        assert!(are_advancement_choices_complete(&complete, &options).is_ok());
    }

    #[test]
    fn test_hit_point_method_round_trips_strings() {
        assert_eq!(
            HitPointMethod::from_str("average").unwrap(),
            HitPointMethod::Average
        );
        assert_eq!(HitPointMethod::Rolled.as_str(), "rolled");
        assert!(HitPointMethod::from_str("maximum").is_err());
    }
}
