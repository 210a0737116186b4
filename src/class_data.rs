//! Aetherweave class data registry.
//!
//! Static per-class reference data: hit dice, saving throws, casting and
//! psionics descriptors, resource definitions, feature tables, and
//! archetypes for all 7 classes. Pure lookup; the progression engines do
//! the computation.

use crate::character::{Ability, ActionType, ClassFeature, ClassName, HitDie, RestType};
use serde::{Deserialize, Serialize};

// ============================================================================
// Descriptors
// ============================================================================

/// How a class's levels contribute to the combined caster level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CasterProgression {
    /// Every class level counts.
    Full,
    /// Half the class levels count (rounded down).
    Half,
    /// A third of the class levels count (rounded down).
    Third,
    /// Pact casting: contributes nothing to the shared slot table.
    Pact,
}

impl CasterProgression {
    pub fn name(&self) -> &'static str {
        match self {
            CasterProgression::Full => "full",
            CasterProgression::Half => "half",
            CasterProgression::Third => "third",
            CasterProgression::Pact => "pact",
        }
    }
}

/// Spellcasting descriptor for a casting class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcastingInfo {
    pub ability: Ability,
    pub progression: CasterProgression,
    pub ritual_casting: bool,
}

/// Psionics descriptor for a psionic class.
///
/// `afp_progression[L-1]` is the per-level base AFP before the ability
/// modifier; it must stay consistent with the runtime formula in the
/// psionics module (base AFP equals class level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsionicsInfo {
    pub ability: Ability,
    pub disciplines: Vec<String>,
    pub afp_progression: [u8; 20],
}

/// Tag describing what a class resource is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    SpellSlot,
    ResonanceCharge,
    AetherFlux,
    Custom(String),
}

/// How a resource's maximum scales with class level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceScaling {
    /// `base + (level - 1) * per_level`.
    Linear { per_level: i32 },
    /// Indexed by `level - 1`, clamped to the last entry.
    Table { values: Vec<i32> },
    /// `base + proficiency_bonus(level) * multiplier`.
    ProficiencyBonus { multiplier: i32 },
    /// `base + ability_modifier * multiplier` for the named ability.
    AbilityModifier { multiplier: i32, ability: Ability },
}

/// A class resource definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassResourceInfo {
    pub kind: ResourceKind,
    pub name: String,
    pub base_amount: i32,
    pub scaling: ResourceScaling,
    pub recovery: RestType,
}

/// A subclass-like specialization chosen at a class-specific level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassArchetype {
    pub id: String,
    pub name: String,
    pub parent_class: ClassName,
    /// Level at which the archetype must be chosen.
    pub selection_level: u8,
    pub features: Vec<ClassFeature>,
}

/// Complete static data for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub class_name: ClassName,
    pub hit_die: HitDie,
    pub primary_ability: Ability,
    pub saving_throws: [Ability; 2],
    pub spellcasting: Option<SpellcastingInfo>,
    pub psionics: Option<PsionicsInfo>,
    pub resources: Vec<ClassResourceInfo>,
    pub features: Vec<ClassFeature>,
    pub archetypes: Vec<ClassArchetype>,
}

impl ClassName {
    /// Get the full registry entry for this class.
    pub fn info(&self) -> ClassInfo {
        match self {
            ClassName::Vanguard => vanguard_info(),
            ClassName::Arcanist => arcanist_info(),
            ClassName::Warden => warden_info(),
            ClassName::Shadowblade => shadowblade_info(),
            ClassName::Voidcaller => voidcaller_info(),
            ClassName::Resonant => resonant_info(),
            ClassName::Mindweaver => mindweaver_info(),
        }
    }

    /// Level at which this class chooses its archetype.
    pub fn archetype_selection_level(&self) -> u8 {
        match self {
            ClassName::Vanguard => 1,
            ClassName::Arcanist => 2,
            ClassName::Mindweaver => 2,
            ClassName::Warden
            | ClassName::Shadowblade
            | ClassName::Voidcaller
            | ClassName::Resonant => 3,
        }
    }
}

/// Look up an archetype by id across every class.
pub fn find_archetype(archetype_id: &str) -> Option<ClassArchetype> {
    ClassName::all()
        .iter()
        .flat_map(|class| class.info().archetypes)
        .find(|a| a.id == archetype_id)
}

fn identity_afp_progression() -> [u8; 20] {
    let mut table = [0u8; 20];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = (i + 1) as u8;
    }
    table
}

// ============================================================================
// Vanguard
// ============================================================================

fn vanguard_info() -> ClassInfo {
    ClassInfo {
        class_name: ClassName::Vanguard,
        hit_die: HitDie::D12,
        primary_ability: Ability::Strength,
        saving_throws: [Ability::Strength, Ability::Constitution],
        spellcasting: None,
        psionics: None,
        resources: vec![ClassResourceInfo {
            kind: ResourceKind::Custom("battle_surge".to_string()),
            name: "Battle Surge".to_string(),
            base_amount: 0,
            scaling: ResourceScaling::ProficiencyBonus { multiplier: 1 },
            recovery: RestType::Short,
        }],
        features: vec![
            ClassFeature::new(
                "vanguard_battle_surge",
                "Battle Surge",
                1,
                "Spend a surge to add your proficiency bonus to a weapon strike's damage.",
            )
            .with_mechanics(
                ActionType::Free,
                vec!["Bonus damage equal to proficiency bonus".to_string()],
            )
            .with_cost(1),
            ClassFeature::new(
                "vanguard_iron_stance",
                "Iron Stance",
                1,
                "While you are not wearing heavy armor, your guard adds your Constitution modifier.",
            ),
            ClassFeature::new(
                "vanguard_tactical_shift",
                "Tactical Shift",
                2,
                "As a bonus action, reposition up to half your speed without provoking.",
            )
            .with_mechanics(ActionType::BonusAction, vec!["Reposition".to_string()]),
            ClassFeature::new(
                "vanguard_extra_strike",
                "Extra Strike",
                5,
                "You can strike twice, instead of once, whenever you take the Attack action.",
            ),
            ClassFeature::new(
                "vanguard_unbreakable",
                "Unbreakable",
                7,
                "You have advantage on saving throws against being frightened or stunned.",
            ),
            ClassFeature::new(
                "vanguard_indomitable",
                "Indomitable",
                9,
                "Reroll a failed saving throw. You must use the new roll.",
            )
            .with_uses(1, RestType::Long),
            ClassFeature::new(
                "vanguard_greater_strike",
                "Greater Strike",
                11,
                "You can strike three times whenever you take the Attack action.",
            ),
            ClassFeature::new(
                "vanguard_juggernaut",
                "Juggernaut",
                15,
                "When you are reduced to 0 hit points but not killed outright, drop to 1 instead.",
            )
            .with_uses(1, RestType::Long),
            ClassFeature::new(
                "vanguard_avatar_of_war",
                "Avatar of War",
                20,
                "Your Strength score increases by 4, to a maximum of 24.",
            ),
        ],
        archetypes: vec![
            ClassArchetype {
                id: "bulwark_sentinel".to_string(),
                name: "Bulwark Sentinel".to_string(),
                parent_class: ClassName::Vanguard,
                selection_level: 1,
                features: vec![
                    ClassFeature::new(
                        "bulwark_shield_wall",
                        "Shield Wall",
                        1,
                        "Allies within 5 feet of you gain +1 to their guard while you hold a shield.",
                    ),
                    ClassFeature::new(
                        "bulwark_bastion",
                        "Bastion",
                        7,
                        "As a bonus action, grant an adjacent ally resistance to one strike's damage.",
                    )
                    .with_mechanics(ActionType::BonusAction, vec!["Grant resistance".to_string()]),
                    ClassFeature::new(
                        "bulwark_living_fortress",
                        "Living Fortress",
                        15,
                        "You cannot be moved or knocked prone against your will while conscious.",
                    ),
                ],
            },
            ClassArchetype {
                id: "stormblade".to_string(),
                name: "Stormblade".to_string(),
                parent_class: ClassName::Vanguard,
                selection_level: 1,
                features: vec![
                    ClassFeature::new(
                        "stormblade_tempest_strike",
                        "Tempest Strike",
                        1,
                        "Once per turn, a Battle Surge strike also deals your level in lightning damage.",
                    ),
                    ClassFeature::new(
                        "stormblade_ride_the_lightning",
                        "Ride the Lightning",
                        7,
                        "When you use Tactical Shift, you may pass through creatures as crackling arc-light.",
                    ),
                    ClassFeature::new(
                        "stormblade_eye_of_the_storm",
                        "Eye of the Storm",
                        15,
                        "Creatures of your choice within 10 feet have disadvantage on strikes against you.",
                    ),
                ],
            },
        ],
    }
}

// ============================================================================
// Arcanist
// ============================================================================

fn arcanist_info() -> ClassInfo {
    ClassInfo {
        class_name: ClassName::Arcanist,
        hit_die: HitDie::D6,
        primary_ability: Ability::Intelligence,
        saving_throws: [Ability::Intelligence, Ability::Wisdom],
        spellcasting: Some(SpellcastingInfo {
            ability: Ability::Intelligence,
            progression: CasterProgression::Full,
            ritual_casting: true,
        }),
        psionics: None,
        resources: vec![ClassResourceInfo {
            kind: ResourceKind::Custom("arcane_reservoir".to_string()),
            name: "Arcane Reservoir".to_string(),
            base_amount: 1,
            scaling: ResourceScaling::Table {
                values: vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10],
            },
            recovery: RestType::Long,
        }],
        features: vec![
            ClassFeature::new(
                "arcanist_aether_attunement",
                "Aether Attunement",
                1,
                "You cast arcanist spells using Intelligence as your casting ability.",
            ),
            ClassFeature::new(
                "arcanist_ritual_weaving",
                "Ritual Weaving",
                1,
                "You can cast any formula you have inscribed as a ritual if it bears the ritual tag.",
            ),
            ClassFeature::new(
                "arcanist_arcane_reservoir",
                "Arcane Reservoir",
                2,
                "Once per day during a short rest, recover expended slots from your reservoir.",
            )
            .with_uses(1, RestType::Long),
            ClassFeature::new(
                "arcanist_swift_weaving",
                "Swift Weaving",
                6,
                "When you cast a formula as a ritual, the casting time is halved.",
            ),
            ClassFeature::new(
                "arcanist_aether_shield",
                "Aether Shield",
                10,
                "When struck, spend 2 reservoir points to raise a shimmering ward against the blow.",
            )
            .with_mechanics(ActionType::Free, vec!["+4 guard against one strike".to_string()])
            .with_cost(2),
            ClassFeature::new(
                "arcanist_masters_insight",
                "Master's Insight",
                14,
                "Choose two formulae you know; you can cast each once per day without a slot.",
            ),
            ClassFeature::new(
                "arcanist_archmages_clarity",
                "Archmage's Clarity",
                18,
                "Your first-tier formulae no longer consume slots.",
            ),
            ClassFeature::new(
                "arcanist_aether_sovereign",
                "Aether Sovereign",
                20,
                "Once per long rest, regain your entire Arcane Reservoir as a free action.",
            )
            .with_uses(1, RestType::Long),
        ],
        archetypes: vec![
            ClassArchetype {
                id: "path_of_the_torrent".to_string(),
                name: "Path of the Torrent".to_string(),
                parent_class: ClassName::Arcanist,
                selection_level: 2,
                features: vec![
                    ClassFeature::new(
                        "torrent_sculpted_force",
                        "Sculpted Force",
                        2,
                        "Carve safe pockets in your destructive formulae for up to three allies.",
                    ),
                    ClassFeature::new(
                        "torrent_overchannel",
                        "Overchannel",
                        6,
                        "Once per long rest, a damaging formula deals maximum damage.",
                    )
                    .with_uses(1, RestType::Long),
                    ClassFeature::new(
                        "torrent_riptide",
                        "Riptide",
                        14,
                        "Creatures that fail a save against your formulae are pushed 10 feet.",
                    ),
                ],
            },
            ClassArchetype {
                id: "path_of_the_veil".to_string(),
                name: "Path of the Veil".to_string(),
                parent_class: ClassName::Arcanist,
                selection_level: 2,
                features: vec![
                    ClassFeature::new(
                        "veil_misdirection",
                        "Misdirection",
                        2,
                        "When a creature you can see strikes at you, swap places with your veil-image.",
                    )
                    .with_uses(1, RestType::Short),
                    ClassFeature::new(
                        "veil_unseen_hand",
                        "Unseen Hand",
                        6,
                        "Your illusion formulae can carry a single touch-tier formula inside them.",
                    ),
                    ClassFeature::new(
                        "veil_world_behind_the_world",
                        "World Behind the World",
                        14,
                        "You can step into your own illusions, becoming invisible while inside them.",
                    ),
                ],
            },
        ],
    }
}

// ============================================================================
// Warden
// ============================================================================

fn warden_info() -> ClassInfo {
    ClassInfo {
        class_name: ClassName::Warden,
        hit_die: HitDie::D10,
        primary_ability: Ability::Wisdom,
        saving_throws: [Ability::Strength, Ability::Wisdom],
        spellcasting: Some(SpellcastingInfo {
            ability: Ability::Wisdom,
            progression: CasterProgression::Half,
            ritual_casting: false,
        }),
        psionics: None,
        resources: vec![ClassResourceInfo {
            kind: ResourceKind::Custom("wardstone".to_string()),
            name: "Wardstone".to_string(),
            base_amount: 1,
            scaling: ResourceScaling::AbilityModifier {
                multiplier: 1,
                ability: Ability::Wisdom,
            },
            recovery: RestType::Long,
        }],
        features: vec![
            ClassFeature::new(
                "warden_wildward",
                "Wildward",
                1,
                "You always know true north, and natural terrain never slows your travel.",
            ),
            ClassFeature::new(
                "warden_aether_channeling",
                "Aether Channeling",
                2,
                "You cast warden spells using Wisdom as your casting ability.",
            ),
            ClassFeature::new(
                "warden_wardstones",
                "Wardstones",
                3,
                "Bind aether into carried stones; crack one to shield a creature you can see.",
            )
            .with_mechanics(
                ActionType::BonusAction,
                vec!["Grant temporary hit points equal to your level".to_string()],
            )
            .with_cost(1),
            ClassFeature::new(
                "warden_extra_strike",
                "Extra Strike",
                5,
                "You can strike twice, instead of once, whenever you take the Attack action.",
            ),
            ClassFeature::new(
                "warden_natures_mantle",
                "Nature's Mantle",
                7,
                "You and allies within 10 feet have advantage on saves against aether-twisted beasts.",
            ),
            ClassFeature::new(
                "warden_improved_channeling",
                "Improved Channeling",
                11,
                "Your weapon strikes count as aetheric for overcoming resistance.",
            ),
            ClassFeature::new(
                "warden_thornweave_aegis",
                "Thornweave Aegis",
                15,
                "A creature that damages you with a melee strike takes your Wisdom modifier in damage.",
            ),
            ClassFeature::new(
                "warden_heart_of_the_wild",
                "Heart of the Wild",
                20,
                "Wardstones recharge on a short rest, and you gain one use of each at dawn.",
            ),
        ],
        archetypes: vec![
            ClassArchetype {
                id: "circle_of_roots".to_string(),
                name: "Circle of Roots".to_string(),
                parent_class: ClassName::Warden,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "roots_grasping_earth",
                        "Grasping Earth",
                        3,
                        "When a wardstone cracks, roots grip the ground around its bearer, halving enemy speed.",
                    ),
                    ClassFeature::new(
                        "roots_deep_anchor",
                        "Deep Anchor",
                        7,
                        "The wardstone bearer cannot be moved against their will while the ward holds.",
                    ),
                    ClassFeature::new(
                        "roots_verdant_rebirth",
                        "Verdant Rebirth",
                        15,
                        "A creature your wardstone saves from 0 hit points instead stands at half health.",
                    )
                    .with_uses(1, RestType::Long),
                ],
            },
            ClassArchetype {
                id: "circle_of_gales".to_string(),
                name: "Circle of Gales".to_string(),
                parent_class: ClassName::Warden,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "gales_tailwind",
                        "Tailwind",
                        3,
                        "A cracked wardstone also grants its bearer 10 feet of speed until your next turn.",
                    ),
                    ClassFeature::new(
                        "gales_updraft",
                        "Updraft",
                        7,
                        "The wardstone bearer can fly their speed until the end of their next turn.",
                    ),
                    ClassFeature::new(
                        "gales_stormshroud",
                        "Stormshroud",
                        15,
                        "Ranged strikes against the wardstone bearer have disadvantage while the ward holds.",
                    ),
                ],
            },
        ],
    }
}

// ============================================================================
// Shadowblade
// ============================================================================

fn shadowblade_info() -> ClassInfo {
    ClassInfo {
        class_name: ClassName::Shadowblade,
        hit_die: HitDie::D8,
        primary_ability: Ability::Dexterity,
        saving_throws: [Ability::Dexterity, Ability::Intelligence],
        spellcasting: Some(SpellcastingInfo {
            ability: Ability::Intelligence,
            progression: CasterProgression::Third,
            ritual_casting: false,
        }),
        psionics: None,
        resources: vec![],
        features: vec![
            ClassFeature::new(
                "shadowblade_umbral_strike",
                "Umbral Strike",
                1,
                "Once per turn, deal an extra 1d6 damage to a creature you strike from dim light or darkness.",
            ),
            ClassFeature::new(
                "shadowblade_cunning_step",
                "Cunning Step",
                2,
                "Dash, Disengage, or Hide as a bonus action.",
            )
            .with_mechanics(ActionType::BonusAction, vec!["Dash, Disengage, or Hide".to_string()]),
            ClassFeature::new(
                "shadowblade_veilcasting",
                "Veilcasting",
                3,
                "You learn to weave minor formulae of dusk, using Intelligence as your casting ability.",
            ),
            ClassFeature::new(
                "shadowblade_evasion",
                "Evasion",
                7,
                "When a save would halve damage, you instead take none on a success and half on a failure.",
            ),
            ClassFeature::new(
                "shadowblade_phantom_ambush",
                "Phantom Ambush",
                9,
                "Creatures you surprise take an additional Umbral Strike die.",
            ),
            ClassFeature::new(
                "shadowblade_shroudwalk",
                "Shroudwalk",
                13,
                "Step from one shadow into another within 60 feet as a bonus action.",
            )
            .with_mechanics(ActionType::BonusAction, vec!["Teleport between shadows".to_string()])
            .with_uses(3, RestType::Long),
            ClassFeature::new(
                "shadowblade_deathveil",
                "Deathveil",
                17,
                "When you hit a surprised creature, it must save or take double Umbral Strike damage.",
            ),
            ClassFeature::new(
                "shadowblade_perfect_shadow",
                "Perfect Shadow",
                20,
                "You can Hide even while observed, and your first strike from hiding is a critical hit.",
            )
            .with_uses(1, RestType::Short),
        ],
        archetypes: vec![
            ClassArchetype {
                id: "ghostknife".to_string(),
                name: "Ghostknife".to_string(),
                parent_class: ClassName::Shadowblade,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "ghostknife_spectral_edge",
                        "Spectral Edge",
                        3,
                        "Your blades pass through nonmagical armor; your Umbral Strike ignores cover.",
                    ),
                    ClassFeature::new(
                        "ghostknife_half_present",
                        "Half-Present",
                        9,
                        "Opportunity strikes against you have disadvantage.",
                    ),
                    ClassFeature::new(
                        "ghostknife_final_visitation",
                        "Final Visitation",
                        13,
                        "Once per long rest, become intangible for a full round.",
                    )
                    .with_uses(1, RestType::Long),
                ],
            },
            ClassArchetype {
                id: "nightwarden".to_string(),
                name: "Nightwarden".to_string(),
                parent_class: ClassName::Shadowblade,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "nightwarden_dark_sentinel",
                        "Dark Sentinel",
                        3,
                        "Allies within 10 feet of you can use your Evasion result in darkness.",
                    ),
                    ClassFeature::new(
                        "nightwarden_lanternbreaker",
                        "Lanternbreaker",
                        9,
                        "As a bonus action, snuff every nonmagical light source within 30 feet.",
                    )
                    .with_mechanics(ActionType::BonusAction, vec!["Extinguish lights".to_string()]),
                    ClassFeature::new(
                        "nightwarden_midnight_bulwark",
                        "Midnight Bulwark",
                        13,
                        "While in darkness you have resistance to all damage from creatures in light.",
                    ),
                ],
            },
        ],
    }
}

// ============================================================================
// Voidcaller
// ============================================================================

fn voidcaller_info() -> ClassInfo {
    ClassInfo {
        class_name: ClassName::Voidcaller,
        hit_die: HitDie::D8,
        primary_ability: Ability::Charisma,
        saving_throws: [Ability::Wisdom, Ability::Charisma],
        spellcasting: Some(SpellcastingInfo {
            ability: Ability::Charisma,
            progression: CasterProgression::Pact,
            ritual_casting: false,
        }),
        psionics: None,
        resources: vec![ClassResourceInfo {
            kind: ResourceKind::SpellSlot,
            name: "Pact Reserve".to_string(),
            base_amount: 1,
            scaling: ResourceScaling::Table {
                values: vec![1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4],
            },
            recovery: RestType::Short,
        }],
        features: vec![
            ClassFeature::new(
                "voidcaller_pact_of_the_void",
                "Pact of the Void",
                1,
                "You cast voidcaller formulae using Charisma; your pact slots return on a short rest.",
            ),
            ClassFeature::new(
                "voidcaller_invocations",
                "Void Invocations",
                1,
                "You know fragments of the deep tongue, granting permanent minor boons.",
            ),
            ClassFeature::new(
                "voidcaller_whispered_bargain",
                "Whispered Bargain",
                2,
                "Learn two additional invocations; you may trade one away at each level.",
            ),
            ClassFeature::new(
                "voidcaller_deepening_pact",
                "Deepening Pact",
                5,
                "Your patron grants a boon-weapon, grimoire, or familiar shaped from void-stuff.",
            ),
            ClassFeature::new(
                "voidcaller_void_armor",
                "Void Armor",
                9,
                "While you have no pact slots remaining, you have resistance to psychic damage.",
            ),
            ClassFeature::new(
                "voidcaller_herald_of_the_deep",
                "Herald of the Deep",
                11,
                "Once per long rest, cast your highest-tier formula without expending a slot.",
            )
            .with_uses(1, RestType::Long),
            ClassFeature::new(
                "voidcaller_unraveling_gaze",
                "Unraveling Gaze",
                15,
                "As an action, force a creature to save or have its aetheric wards suppressed.",
            )
            .with_mechanics(ActionType::Action, vec!["Suppress wards".to_string()])
            .with_uses(1, RestType::Short),
            ClassFeature::new(
                "voidcaller_avatar_of_the_void",
                "Avatar of the Void",
                20,
                "Regain all expended pact slots once per day when you roll initiative with none left.",
            ),
        ],
        archetypes: vec![
            ClassArchetype {
                id: "court_of_whispers".to_string(),
                name: "Court of Whispers".to_string(),
                parent_class: ClassName::Voidcaller,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "whispers_secret_keeper",
                        "Secret Keeper",
                        3,
                        "You can read surface thoughts of creatures within 30 feet that share a language.",
                    ),
                    ClassFeature::new(
                        "whispers_borrowed_voice",
                        "Borrowed Voice",
                        9,
                        "Speak through any creature whose thoughts you have read this day.",
                    ),
                    ClassFeature::new(
                        "whispers_unheard_council",
                        "Unheard Council",
                        15,
                        "You and up to five creatures can converse mind-to-mind at any distance.",
                    ),
                ],
            },
            ClassArchetype {
                id: "court_of_embers".to_string(),
                name: "Court of Embers".to_string(),
                parent_class: ClassName::Voidcaller,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "embers_cinder_shroud",
                        "Cinder Shroud",
                        3,
                        "When you expend a pact slot, creatures within 5 feet take your Charisma modifier in fire damage.",
                    ),
                    ClassFeature::new(
                        "embers_ashen_rebuke",
                        "Ashen Rebuke",
                        9,
                        "When damaged by a creature within 30 feet, deal fire damage equal to half your level.",
                    ),
                    ClassFeature::new(
                        "embers_pyre_lord",
                        "Pyre Lord",
                        15,
                        "You have immunity to fire damage, and your fire damage ignores resistance.",
                    ),
                ],
            },
        ],
    }
}

// ============================================================================
// Resonant
// ============================================================================

fn resonant_info() -> ClassInfo {
    ClassInfo {
        class_name: ClassName::Resonant,
        hit_die: HitDie::D8,
        primary_ability: Ability::Charisma,
        saving_throws: [Ability::Dexterity, Ability::Charisma],
        spellcasting: Some(SpellcastingInfo {
            ability: Ability::Charisma,
            progression: CasterProgression::Full,
            ritual_casting: true,
        }),
        psionics: None,
        resources: vec![ClassResourceInfo {
            kind: ResourceKind::ResonanceCharge,
            name: "Resonance Charge".to_string(),
            base_amount: 2,
            scaling: ResourceScaling::Linear { per_level: 1 },
            recovery: RestType::Long,
        }],
        features: vec![
            ClassFeature::new(
                "resonant_resonance",
                "Resonance",
                1,
                "Spend a charge to let an ally add 1d6 to an ability check, strike, or save.",
            )
            .with_mechanics(ActionType::BonusAction, vec!["Grant a 1d6 resonance die".to_string()])
            .with_cost(1),
            ClassFeature::new(
                "resonant_harmonic_casting",
                "Harmonic Casting",
                1,
                "You cast resonant formulae using Charisma as your casting ability.",
            ),
            ClassFeature::new(
                "resonant_counterpoint",
                "Counterpoint",
                2,
                "When an enemy within 60 feet rolls a die, spend a charge to subtract 1d6 from it.",
            )
            .with_mechanics(ActionType::Free, vec!["Subtract a 1d6 resonance die".to_string()])
            .with_cost(1),
            ClassFeature::new(
                "resonant_crescendo",
                "Crescendo",
                5,
                "Your resonance dice become d8s, and you regain one charge on a short rest.",
            ),
            ClassFeature::new(
                "resonant_dissonant_chord",
                "Dissonant Chord",
                9,
                "As an action, every enemy within 30 feet must save or be deafened and off-balance.",
            )
            .with_mechanics(ActionType::Action, vec!["Area save-or-debuff".to_string()])
            .with_cost(2),
            ClassFeature::new(
                "resonant_symphony_of_aether",
                "Symphony of Aether",
                13,
                "Your resonance dice become d10s, and one die can be given as a free action each round.",
            ),
            ClassFeature::new(
                "resonant_grand_resolve",
                "Grand Resolve",
                17,
                "When you roll initiative with no charges remaining, regain one.",
            ),
            ClassFeature::new(
                "resonant_eternal_chord",
                "Eternal Chord",
                20,
                "Your resonance dice become d12s.",
            ),
        ],
        archetypes: vec![
            ClassArchetype {
                id: "chorus_of_dawn".to_string(),
                name: "Chorus of Dawn".to_string(),
                parent_class: ClassName::Resonant,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "dawn_mending_refrain",
                        "Mending Refrain",
                        3,
                        "A creature holding your resonance die regains hit points equal to the die when it is spent.",
                    ),
                    ClassFeature::new(
                        "dawn_rising_chorale",
                        "Rising Chorale",
                        9,
                        "When you grant a resonance die, a second ally within 30 feet gains one too.",
                    ),
                    ClassFeature::new(
                        "dawn_daybreak_anthem",
                        "Daybreak Anthem",
                        15,
                        "Once per long rest, every ally within 60 feet regains hit points equal to your level.",
                    )
                    .with_uses(1, RestType::Long),
                ],
            },
            ClassArchetype {
                id: "chorus_of_dusk".to_string(),
                name: "Chorus of Dusk".to_string(),
                parent_class: ClassName::Resonant,
                selection_level: 3,
                features: vec![
                    ClassFeature::new(
                        "dusk_murmured_doubt",
                        "Murmured Doubt",
                        3,
                        "A creature reduced by your Counterpoint die also subtracts it from its next save.",
                    ),
                    ClassFeature::new(
                        "dusk_fading_echo",
                        "Fading Echo",
                        9,
                        "Counterpoint can now also force a reroll of an enemy's die once per round.",
                    ),
                    ClassFeature::new(
                        "dusk_last_silence",
                        "Last Silence",
                        15,
                        "Once per long rest, silence every enemy formula within 30 feet for a round.",
                    )
                    .with_uses(1, RestType::Long),
                ],
            },
        ],
    }
}

// ============================================================================
// Mindweaver
// ============================================================================

fn mindweaver_info() -> ClassInfo {
    ClassInfo {
        class_name: ClassName::Mindweaver,
        hit_die: HitDie::D8,
        primary_ability: Ability::Intelligence,
        saving_throws: [Ability::Intelligence, Ability::Wisdom],
        spellcasting: None,
        psionics: Some(PsionicsInfo {
            ability: Ability::Intelligence,
            disciplines: vec![
                "Telepathy".to_string(),
                "Kinetics".to_string(),
                "Clairsentience".to_string(),
                "Metabolism".to_string(),
            ],
            afp_progression: identity_afp_progression(),
        }),
        resources: vec![ClassResourceInfo {
            kind: ResourceKind::AetherFlux,
            name: "Aether Flux Points".to_string(),
            base_amount: 1,
            scaling: ResourceScaling::Linear { per_level: 1 },
            recovery: RestType::Long,
        }],
        features: vec![
            ClassFeature::new(
                "mindweaver_aether_flux",
                "Aether Flux",
                1,
                "You manifest powers by spending Aether Flux Points from your personal pool.",
            ),
            ClassFeature::new(
                "mindweaver_psionic_talent",
                "Psionic Talent",
                1,
                "You know two zero-cost talents from your disciplines.",
            ),
            ClassFeature::new(
                "mindweaver_discipline_focus",
                "Discipline Focus",
                2,
                "Choose a discipline focus that shapes how your flux manifests.",
            ),
            ClassFeature::new(
                "mindweaver_mental_bastion",
                "Mental Bastion",
                3,
                "You have advantage on saves against having your mind read or influenced.",
            ),
            ClassFeature::new(
                "mindweaver_focused_mind",
                "Focused Mind",
                5,
                "Maintaining a focus power no longer ends when you take minor damage.",
            ),
            ClassFeature::new(
                "mindweaver_psionic_surge",
                "Psionic Surge",
                7,
                "Once between rests, surge: your next power costs no flux, but backlash follows.",
            )
            .with_uses(1, RestType::Long),
            ClassFeature::new(
                "mindweaver_expanded_focus",
                "Expanded Focus",
                10,
                "Your trained mind can hold an additional maintained power.",
            ),
            ClassFeature::new(
                "mindweaver_signature_masking",
                "Signature Masking",
                13,
                "Your psionic signature's detectability range is halved.",
            ),
            ClassFeature::new(
                "mindweaver_overload_discipline",
                "Overload Discipline",
                16,
                "Your safe expenditure limit increases by your Intelligence modifier.",
            ),
            ClassFeature::new(
                "mindweaver_transcendent_mind",
                "Transcendent Mind",
                20,
                "When you finish a short rest, regain flux equal to your Intelligence modifier.",
            ),
        ],
        archetypes: vec![
            ClassArchetype {
                id: "discipline_of_the_blade".to_string(),
                name: "Discipline of the Blade".to_string(),
                parent_class: ClassName::Mindweaver,
                selection_level: 2,
                features: vec![
                    ClassFeature::new(
                        "blade_flux_edge",
                        "Flux Edge",
                        2,
                        "Shape a blade of solid thought; it uses Intelligence for strikes and damage.",
                    ),
                    ClassFeature::new(
                        "blade_kinetic_barrier",
                        "Kinetic Barrier",
                        6,
                        "While your blade is shaped, gain a guard bonus equal to half your proficiency bonus.",
                    ),
                    ClassFeature::new(
                        "blade_thousand_cuts",
                        "Thousand Cuts",
                        14,
                        "Once per turn, spend 3 flux to strike every creature within 10 feet.",
                    ),
                ],
            },
            ClassArchetype {
                id: "discipline_of_the_veil".to_string(),
                name: "Discipline of the Veil".to_string(),
                parent_class: ClassName::Mindweaver,
                selection_level: 2,
                features: vec![
                    ClassFeature::new(
                        "veil_surface_reader",
                        "Surface Reader",
                        2,
                        "Spend 1 flux to read the surface thoughts of a creature within 60 feet.",
                    ),
                    ClassFeature::new(
                        "veil_thought_shield",
                        "Thought Shield",
                        6,
                        "Allies within 10 feet share your Mental Bastion.",
                    ),
                    ClassFeature::new(
                        "veil_puppeteer",
                        "Puppeteer",
                        14,
                        "Spend 5 flux to command a humanoid's next action; a save negates.",
                    ),
                ],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_classes_have_data() {
        for class in ClassName::all() {
            let info = class.info();
            assert_eq!(info.saving_throws.len(), 2);
            assert_ne!(info.saving_throws[0], info.saving_throws[1]);
            assert!(info.archetypes.len() >= 2);
            assert!(!info.features.is_empty());
            assert!(matches!(info.hit_die.sides(), 6 | 8 | 10 | 12));
        }
    }

    #[test]
    fn test_feature_ids_globally_unique() {
        let mut seen = std::collections::HashSet::new();
        for class in ClassName::all() {
            let info = class.info();
            for feature in info
                .features
                .iter()
                .chain(info.archetypes.iter().flat_map(|a| a.features.iter()))
            {
                assert!(seen.insert(feature.id.clone()), "duplicate id {}", feature.id);
            }
        }
    }

    #[test]
    fn test_archetype_selection_levels() {
        // Exactly one class selects at level 1; the rest select at 2 or 3.
        let at_one: Vec<_> = ClassName::all()
            .iter()
            .filter(|c| c.archetype_selection_level() == 1)
            .collect();
        assert_eq!(at_one.len(), 1);
        for class in ClassName::all() {
            assert!(matches!(class.archetype_selection_level(), 1..=3));
        }
    }

    #[test]
    fn test_archetypes_carry_parent_and_selection_level() {
        for class in ClassName::all() {
            for archetype in class.info().archetypes {
                assert_eq!(archetype.parent_class, *class);
                assert_eq!(archetype.selection_level, class.archetype_selection_level());
                assert!(archetype.features.len() >= 3);
            }
        }
    }

    #[test]
    fn test_mindweaver_psionics() {
        let info = ClassName::Mindweaver.info();
        let psionics = info.psionics.expect("Mindweaver is psionic");
        assert_eq!(psionics.ability, Ability::Intelligence);
        assert_eq!(psionics.afp_progression.len(), 20);
        // The registry table mirrors the runtime base-AFP formula.
        for (i, base) in psionics.afp_progression.iter().enumerate() {
            assert_eq!(*base as usize, i + 1);
        }
    }

    #[test]
    fn test_only_mindweaver_is_psionic() {
        for class in ClassName::all() {
            let info = class.info();
            assert_eq!(info.psionics.is_some(), *class == ClassName::Mindweaver);
        }
    }

    #[test]
    fn test_find_archetype() {
        let archetype = find_archetype("stormblade").expect("exists");
        assert_eq!(archetype.parent_class, ClassName::Vanguard);
        assert!(find_archetype("no_such_archetype").is_none());
    }

    #[test]
    fn test_caster_progressions() {
        assert_eq!(
            ClassName::Arcanist.info().spellcasting.unwrap().progression,
            CasterProgression::Full
        );
        assert_eq!(
            ClassName::Warden.info().spellcasting.unwrap().progression,
            CasterProgression::Half
        );
        assert_eq!(
            ClassName::Shadowblade.info().spellcasting.unwrap().progression,
            CasterProgression::Third
        );
        assert_eq!(
            ClassName::Voidcaller.info().spellcasting.unwrap().progression,
            CasterProgression::Pact
        );
        assert!(ClassName::Vanguard.info().spellcasting.is_none());
    }
}
