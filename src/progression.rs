//! Feature progression and resource scaling.
//!
//! Computes the cumulative feature set a character has unlocked, scales
//! class resource maximums by level, and assembles the full
//! `CharacterProgression` record for a (possibly multiclass) character.

use crate::character::{
    AbilityScores, CharacterClass, ClassFeature, ClassName, ResourcePool,
};
use crate::class_data::{ClassArchetype, ClassResourceInfo, ResourceKind, ResourceScaling};
use crate::spellcasting::{
    combined_spellcasting, meets_multiclass_prerequisites, total_level, CombinedSpellcasting,
};
use crate::validation::{RuleResult, Violation, ViolationCode};
use serde::{Deserialize, Serialize};

/// Placeholder ability modifier used by ability-scaled resources when no
/// actual modifier is supplied. Legacy behavior, preserved verbatim; see
/// DESIGN.md before changing it.
pub const ABILITY_MODIFIER_PLACEHOLDER: i32 = 3;

/// Level-derived proficiency bonus: `ceil(level / 4) + 1`.
///
/// Levels at or below 0 yield 1. There is no upper clamp; level 21 yields
/// 7 by deliberate extrapolation.
pub fn proficiency_bonus(level: i32) -> i32 {
    if level <= 0 {
        return 1;
    }
    (level + 3) / 4 + 1
}

/// Maximum of a class resource at a level, with the character's actual
/// ability modifier available for ability-scaled resources.
///
/// The result is floored at 0 in every branch.
pub fn resource_maximum_with(
    info: &ClassResourceInfo,
    level: i32,
    ability_modifier: Option<i32>,
) -> i32 {
    let raw = match &info.scaling {
        ResourceScaling::Linear { per_level } => info.base_amount + (level - 1) * per_level,
        ResourceScaling::Table { values } => {
            if values.is_empty() {
                info.base_amount
            } else {
                let index = ((level - 1).max(0) as usize).min(values.len() - 1);
                values[index]
            }
        }
        ResourceScaling::ProficiencyBonus { multiplier } => {
            info.base_amount + proficiency_bonus(level) * multiplier
        }
        ResourceScaling::AbilityModifier { multiplier, .. } => {
            let modifier = ability_modifier.unwrap_or(ABILITY_MODIFIER_PLACEHOLDER);
            info.base_amount + modifier * multiplier
        }
    };
    raw.max(0)
}

/// Maximum of a class resource at a level, without ability-score context.
/// Ability-scaled resources fall back to [`ABILITY_MODIFIER_PLACEHOLDER`].
pub fn resource_maximum(info: &ClassResourceInfo, level: i32) -> i32 {
    resource_maximum_with(info, level, None)
}

/// Base class features unlocked at a character level.
///
/// Level 0 or below yields an empty list.
pub fn class_features_for_level(class: ClassName, level: i32) -> Vec<ClassFeature> {
    if level <= 0 {
        return Vec::new();
    }
    class
        .info()
        .features
        .into_iter()
        .filter(|feature| feature.level as i32 <= level)
        .collect()
}

/// Archetype features unlocked at a character level, filtered the same way
/// as base class features.
pub fn archetype_features_for_level(archetype: &ClassArchetype, level: i32) -> Vec<ClassFeature> {
    if level <= 0 {
        return Vec::new();
    }
    archetype
        .features
        .iter()
        .filter(|feature| feature.level as i32 <= level)
        .cloned()
        .collect()
}

/// Every feature across a multiclass character: per entry, base class
/// features at that entry's level, then archetype features if one is
/// attached. Order follows the input array; no de-duplication.
pub fn all_features(classes: &[CharacterClass]) -> Vec<ClassFeature> {
    let mut features = Vec::new();
    for entry in classes {
        features.extend(class_features_for_level(entry.class_name, entry.level as i32));
        if let Some(ref archetype) = entry.archetype {
            features.extend(archetype_features_for_level(archetype, entry.level as i32));
        }
    }
    features
}

/// One initialized class resource on a built progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassResource {
    pub class_name: ClassName,
    pub kind: ResourceKind,
    pub name: String,
    pub pool: ResourcePool,
}

/// Fully derived progression record for a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProgression {
    pub classes: Vec<CharacterClass>,
    pub total_level: i32,
    pub proficiency_bonus: i32,
    pub features: Vec<ClassFeature>,
    pub spellcasting: Option<CombinedSpellcasting>,
    pub resources: Vec<ClassResource>,
}

/// Builder for a character progression.
///
/// Collects class entries (with optional archetypes) and optional ability
/// scores, then derives the complete progression record. Multiclass
/// prerequisites are validated when a character has more than one class and
/// ability scores were supplied.
#[derive(Debug, Clone, Default)]
pub struct ProgressionBuilder {
    entries: Vec<(ClassName, u8, Option<String>)>,
    ability_scores: Option<AbilityScores>,
}

impl ProgressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class entry at the given level.
    pub fn class(mut self, class: ClassName, level: u8) -> Self {
        self.entries.push((class, level, None));
        self
    }

    /// Add a class entry with an archetype attached.
    pub fn class_with_archetype(
        mut self,
        class: ClassName,
        level: u8,
        archetype_id: impl Into<String>,
    ) -> Self {
        self.entries.push((class, level, Some(archetype_id.into())));
        self
    }

    /// Supply the character's ability scores for prerequisite checks and
    /// ability-scaled resources.
    pub fn ability_scores(mut self, scores: AbilityScores) -> Self {
        self.ability_scores = Some(scores);
        self
    }

    /// Derive the progression, accumulating every violated rule.
    pub fn build(self) -> RuleResult<CharacterProgression> {
        let mut violations = Vec::new();

        for (class, level, _) in &self.entries {
            if *level < 1 {
                violations.push(Violation::new(
                    ViolationCode::InvalidLevelTooLow,
                    "level",
                    format!("{} level must be at least 1", class),
                ));
            }
        }

        let level_sum: i32 = self.entries.iter().map(|(_, level, _)| *level as i32).sum();
        if level_sum > 20 {
            violations.push(Violation::new(
                ViolationCode::InvalidLevelTooHigh,
                "level",
                format!("total character level {level_sum} exceeds 20"),
            ));
        }

        if self.entries.len() > 1 {
            if let Some(ref scores) = self.ability_scores {
                for (class, _, _) in &self.entries {
                    if !meets_multiclass_prerequisites(*class, scores) {
                        violations.push(Violation::new(
                            ViolationCode::MulticlassPrerequisiteNotMet,
                            "classes",
                            format!("{} multiclass prerequisites are not met", class),
                        ));
                    }
                }
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        let classes: Vec<CharacterClass> = self
            .entries
            .iter()
            .map(|(class, level, archetype)| {
                let entry = CharacterClass::new(*class, *level);
                match archetype {
                    Some(id) => entry.with_archetype(id),
                    None => entry,
                }
            })
            .collect();

        let resources = build_resources(&classes, self.ability_scores.as_ref());
        let total_level = total_level(&classes);

        Ok(CharacterProgression {
            total_level,
            proficiency_bonus: proficiency_bonus(total_level),
            features: all_features(&classes),
            spellcasting: combined_spellcasting(&classes),
            resources,
            classes,
        })
    }
}

fn build_resources(
    classes: &[CharacterClass],
    scores: Option<&AbilityScores>,
) -> Vec<ClassResource> {
    let mut resources = Vec::new();
    for entry in classes {
        let info = entry.class_name.info();
        for resource in &info.resources {
            let maximum = match (&resource.kind, &resource.scaling) {
                // AFP follows the psionics formula, not the generic scaler.
                (ResourceKind::AetherFlux, _) => {
                    let ability = info
                        .psionics
                        .as_ref()
                        .map(|p| p.ability)
                        .unwrap_or(entry.primary_ability);
                    let modifier = scores.map(|s| s.modifier(ability) as i32).unwrap_or(0);
                    crate::psionics::afp_maximum(entry.level as i32, modifier)
                }
                (_, ResourceScaling::AbilityModifier { ability, .. }) => {
                    let modifier = scores.map(|s| s.modifier(*ability) as i32);
                    resource_maximum_with(resource, entry.level as i32, modifier)
                }
                _ => resource_maximum(resource, entry.level as i32),
            };
            resources.push(ClassResource {
                class_name: entry.class_name,
                kind: resource.kind.clone(),
                name: resource.name.clone(),
                pool: ResourcePool {
                    current: maximum,
                    maximum,
                    temporary: 0,
                    recovery: resource.recovery,
                },
            });
        }
    }
    resources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Ability, RestType};

    fn linear(base: i32, per_level: i32) -> ClassResourceInfo {
        ClassResourceInfo {
            kind: ResourceKind::Custom("test".to_string()),
            name: "Test".to_string(),
            base_amount: base,
            scaling: ResourceScaling::Linear { per_level },
            recovery: RestType::Long,
        }
    }

    #[test]
    fn test_proficiency_bonus_bands() {
        for level in 1..=4 {
            assert_eq!(proficiency_bonus(level), 2);
        }
        for level in 5..=8 {
            assert_eq!(proficiency_bonus(level), 3);
        }
        for level in 9..=12 {
            assert_eq!(proficiency_bonus(level), 4);
        }
        for level in 13..=16 {
            assert_eq!(proficiency_bonus(level), 5);
        }
        for level in 17..=20 {
            assert_eq!(proficiency_bonus(level), 6);
        }
    }

    #[test]
    fn test_proficiency_bonus_extrapolates_past_20() {
        assert_eq!(proficiency_bonus(21), 7);
        assert_eq!(proficiency_bonus(24), 7);
        assert_eq!(proficiency_bonus(25), 8);
    }

    #[test]
    fn test_proficiency_bonus_floors_at_one() {
        assert_eq!(proficiency_bonus(0), 1);
        assert_eq!(proficiency_bonus(-5), 1);
    }

    #[test]
    fn test_linear_scaling() {
        let info = linear(2, 1);
        assert_eq!(resource_maximum(&info, 1), 2);
        assert_eq!(resource_maximum(&info, 10), 11);
    }

    #[test]
    fn test_linear_scaling_floors_at_zero() {
        let info = linear(0, -2);
        assert_eq!(resource_maximum(&info, 10), 0);
    }

    #[test]
    fn test_table_scaling_clamps_to_last_entry() {
        let info = ClassResourceInfo {
            kind: ResourceKind::Custom("test".to_string()),
            name: "Test".to_string(),
            base_amount: 1,
            scaling: ResourceScaling::Table {
                values: vec![1, 2, 3],
            },
            recovery: RestType::Long,
        };
        assert_eq!(resource_maximum(&info, 2), 2);
        assert_eq!(resource_maximum(&info, 15), 3);
    }

    #[test]
    fn test_empty_table_falls_back_to_base() {
        let info = ClassResourceInfo {
            kind: ResourceKind::Custom("test".to_string()),
            name: "Test".to_string(),
            base_amount: 4,
            scaling: ResourceScaling::Table { values: vec![] },
            recovery: RestType::Long,
        };
        assert_eq!(resource_maximum(&info, 7), 4);
    }

    #[test]
    fn test_proficiency_scaling_uses_extrapolated_bonus() {
        let info = ClassResourceInfo {
            kind: ResourceKind::Custom("test".to_string()),
            name: "Test".to_string(),
            base_amount: 0,
            scaling: ResourceScaling::ProficiencyBonus { multiplier: 1 },
            recovery: RestType::Short,
        };
        assert_eq!(resource_maximum(&info, 1), 2);
        assert_eq!(resource_maximum(&info, 21), 7);
    }

    #[test]
    fn test_ability_scaling_placeholder() {
        let info = ClassResourceInfo {
            kind: ResourceKind::Custom("test".to_string()),
            name: "Test".to_string(),
            base_amount: 1,
            scaling: ResourceScaling::AbilityModifier {
                multiplier: 1,
                ability: Ability::Wisdom,
            },
            recovery: RestType::Long,
        };
        // No modifier context: the documented placeholder of 3 applies.
        assert_eq!(resource_maximum(&info, 5), 4);
        // Actual modifier overrides the placeholder.
        assert_eq!(resource_maximum_with(&info, 5, Some(1)), 2);
    }

    #[test]
    fn test_features_filter_by_level() {
        let at_1 = class_features_for_level(ClassName::Vanguard, 1);
        let at_5 = class_features_for_level(ClassName::Vanguard, 5);
        assert!(at_1.len() < at_5.len());
        assert!(at_5.iter().any(|f| f.id == "vanguard_extra_strike"));
        assert!(at_1.iter().all(|f| f.level <= 1));
    }

    #[test]
    fn test_nonpositive_level_yields_no_features() {
        assert!(class_features_for_level(ClassName::Arcanist, 0).is_empty());
        assert!(class_features_for_level(ClassName::Arcanist, -3).is_empty());
    }

    #[test]
    fn test_archetype_features_monotonic() {
        let archetype = crate::class_data::find_archetype("bulwark_sentinel").unwrap();
        for level in 1..20 {
            let lower = archetype_features_for_level(&archetype, level);
            let higher = archetype_features_for_level(&archetype, level + 1);
            for feature in &lower {
                assert!(higher.iter().any(|f| f.id == feature.id));
            }
        }
    }

    #[test]
    fn test_all_features_concatenates_without_dedup() {
        // Two entries of the same class are unusual but accepted: the
        // feature sets simply concatenate.
        let classes = vec![
            CharacterClass::new(ClassName::Vanguard, 1),
            CharacterClass::new(ClassName::Vanguard, 1),
        ];
        let features = all_features(&classes);
        let single = class_features_for_level(ClassName::Vanguard, 1);
        assert_eq!(features.len(), single.len() * 2);
    }

    #[test]
    fn test_build_single_class_progression() {
        let progression = ProgressionBuilder::new()
            .class_with_archetype(ClassName::Vanguard, 5, "stormblade")
            .build()
            .expect("valid build");
        assert_eq!(progression.total_level, 5);
        assert_eq!(progression.proficiency_bonus, 3);
        assert!(progression.spellcasting.is_none());
        assert!(progression
            .features
            .iter()
            .any(|f| f.id == "stormblade_tempest_strike"));
        assert_eq!(progression.resources.len(), 1);
        // Battle Surge scales with proficiency bonus.
        assert_eq!(progression.resources[0].pool.maximum, 3);
    }

    #[test]
    fn test_build_rejects_overlevel_multiclass() {
        let result = ProgressionBuilder::new()
            .class(ClassName::Arcanist, 15)
            .class(ClassName::Warden, 6)
            .build();
        let violations = result.expect_err("over 20 levels");
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::InvalidLevelTooHigh));
    }

    #[test]
    fn test_build_validates_multiclass_prerequisites() {
        let scores = AbilityScores::new(13, 10, 10, 10, 10, 10);
        let result = ProgressionBuilder::new()
            .class(ClassName::Vanguard, 3)
            .class(ClassName::Arcanist, 2)
            .ability_scores(scores)
            .build();
        let violations = result.expect_err("Arcanist needs INT 13");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].code,
            ViolationCode::MulticlassPrerequisiteNotMet
        );
    }

    #[test]
    fn test_build_empty_progression_is_valid() {
        let progression = ProgressionBuilder::new().build().expect("empty is fine");
        assert_eq!(progression.total_level, 0);
        assert!(progression.features.is_empty());
    }

    #[test]
    fn test_wardstone_uses_actual_wisdom_when_supplied() {
        let scores = AbilityScores::new(13, 10, 10, 10, 18, 10);
        let progression = ProgressionBuilder::new()
            .class(ClassName::Warden, 5)
            .ability_scores(scores)
            .build()
            .expect("valid build");
        let wardstone = progression
            .resources
            .iter()
            .find(|r| r.name == "Wardstone")
            .unwrap();
        // base 1 + WIS modifier 4
        assert_eq!(wardstone.pool.maximum, 5);
    }
}
