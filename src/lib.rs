//! Aetherweave character progression and resource engine.
//!
//! This crate provides:
//! - Class data registry for the seven Aetherweave classes
//! - Feature progression and multiclass aggregation
//! - Combined spellcasting and the shared spell-slot table
//! - The experience/leveling state machine
//! - Level-up advancement choice validation
//! - The psionic resource, focus, and overload subsystem
//!
//! Every operation is a deterministic function over in-memory data. State
//! transitions return new values instead of mutating their inputs, and
//! time-dependent checks take `now` as an explicit parameter.
//!
//! # Quick Start
//!
//! ```
//! use aether_core::{ClassName, ProgressionBuilder};
//!
//! let progression = ProgressionBuilder::new()
//!     .class(ClassName::Arcanist, 3)
//!     .class(ClassName::Warden, 4)
//!     .build()
//!     .expect("valid multiclass build");
//!
//! assert_eq!(progression.total_level, 7);
//! // Full caster 3 + half caster 4 combine to caster level 5.
//! assert_eq!(progression.spellcasting.unwrap().caster_level, 5);
//! ```

pub mod advancement;
pub mod character;
pub mod class_data;
pub mod experience;
pub mod progression;
pub mod psionics;
pub mod spellcasting;
pub mod validation;

// Primary public API
pub use advancement::{
    advancement_options, apply_ability_score_improvements, are_advancement_choices_complete,
    calculate_hit_points_gained, is_asi_level, validate_advancement_choices, AdvancementChoices,
    AdvancementOptions, HitPointMethod,
};
pub use character::{
    Ability, AbilityScores, CharacterClass, CharacterId, ClassFeature, ClassName, HitDie,
    ResourcePool, RestType,
};
pub use class_data::{CasterProgression, ClassArchetype, ClassInfo};
pub use experience::{
    add_experience, calculate_level_advancement, level_from_xp, validate_experience_points,
    validate_level, validate_xp_level_consistency, xp_for_level, xp_for_next_level,
    xp_to_next_level, ExperienceData,
};
pub use progression::{
    all_features, archetype_features_for_level, class_features_for_level, proficiency_bonus,
    resource_maximum, CharacterProgression, ProgressionBuilder,
};
pub use psionics::{
    afp_maximum, check_overload_risk, focus_limit, restore_afp, spend_afp, PsionicData,
};
pub use spellcasting::{
    combined_spellcasting, meets_multiclass_prerequisites, spell_slots, total_level,
    CombinedSpellcasting,
};
pub use validation::{RuleResult, Violation, ViolationCode};
