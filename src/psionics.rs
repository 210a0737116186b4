//! Psionic resources, focus, and overload.
//!
//! Aether Flux Point (AFP) pool arithmetic, overload risk and feedback,
//! focus-slot accounting for maintained and concentration powers, psionic
//! signature decay, and the surge gate. Every operation returns a new state
//! value; time-dependent checks take `now` as an explicit parameter.

use crate::character::{
    Ability, AbilityScores, CharacterClass, CharacterId, ResourcePool, RestType,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Psychic backlash damage when a focused power is torn away.
pub const BACKLASH_DAMAGE: &str = "1d4";

// ============================================================================
// Aether Flux Points
// ============================================================================

/// AFP maximum for one psionic class entry: level plus ability modifier,
/// never below 2.
pub fn afp_maximum(level: i32, ability_modifier: i32) -> i32 {
    (level + ability_modifier).max(2)
}

/// AFP maximum across a multiclass character: each psionic class entry
/// contributes its own minimum-2 amount, and the contributions are summed.
/// The floor applies per class before summation, not to the total.
pub fn multiclass_afp_maximum(classes: &[CharacterClass], scores: &AbilityScores) -> i32 {
    classes
        .iter()
        .filter_map(|entry| {
            entry.class_name.info().psionics.map(|psionics| {
                afp_maximum(
                    entry.level as i32,
                    scores.modifier(psionics.ability) as i32,
                )
            })
        })
        .sum()
}

/// Outcome of an AFP spend: the (possibly unchanged) pool and what remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendResult {
    pub success: bool,
    pub pool: ResourcePool,
    pub remaining: i32,
}

/// Spend AFP from a pool, drawing temporary points before current ones.
/// An insufficient pool fails without changing anything.
pub fn spend_afp(pool: &ResourcePool, amount: i32) -> SpendResult {
    if amount > pool.available() {
        return SpendResult {
            success: false,
            pool: pool.clone(),
            remaining: pool.available(),
        };
    }

    let mut updated = pool.clone();
    let from_temporary = amount.min(updated.temporary);
    updated.temporary -= from_temporary;
    updated.current -= amount - from_temporary;

    SpendResult {
        remaining: updated.available(),
        success: true,
        pool: updated,
    }
}

/// Restore a pool at a rest. A short rest refills `current` and preserves
/// temporary points; a long rest refills `current` and clears them.
pub fn restore_afp(pool: &ResourcePool, rest: RestType) -> ResourcePool {
    let mut updated = pool.clone();
    updated.current = updated.maximum;
    if rest == RestType::Long {
        updated.temporary = 0;
    }
    updated
}

// ============================================================================
// Overload
// ============================================================================

/// Overload status after a single psionic expenditure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverloadState {
    pub is_overloaded: bool,
    pub excess_afp: i32,
    /// 0 means no save is required.
    pub save_dc: i32,
    pub feedback_risk: bool,
    pub accumulated_feedback: Vec<FeedbackEffect>,
}

impl Default for OverloadState {
    fn default() -> Self {
        Self {
            is_overloaded: false,
            excess_afp: 0,
            save_dc: 0,
            feedback_risk: false,
            accumulated_feedback: Vec::new(),
        }
    }
}

/// Check whether one expenditure overloads a psion.
///
/// The safe limit is the character's level, not the pool maximum; the pool
/// maximum is accepted for API completeness only.
pub fn check_overload_risk(afp_spent: i32, character_level: i32, _max_afp: i32) -> OverloadState {
    let is_overloaded = afp_spent > character_level;
    let excess_afp = if is_overloaded {
        afp_spent - character_level
    } else {
        0
    };
    OverloadState {
        is_overloaded,
        excess_afp,
        save_dc: if is_overloaded { 12 + excess_afp } else { 0 },
        feedback_risk: is_overloaded,
        accumulated_feedback: Vec::new(),
    }
}

/// The fixed feedback table, keyed by a 1d6 roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackKind {
    PsychicStatic,
    SensoryBleed,
    MigraineLance,
    EmotionalEcho,
    FluxBurn,
    FracturedSignature,
}

impl FeedbackKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeedbackKind::PsychicStatic => "Psychic Static",
            FeedbackKind::SensoryBleed => "Sensory Bleed",
            FeedbackKind::MigraineLance => "Migraine Lance",
            FeedbackKind::EmotionalEcho => "Emotional Echo",
            FeedbackKind::FluxBurn => "Flux Burn",
            FeedbackKind::FracturedSignature => "Fractured Signature",
        }
    }

    /// Stackable effects accumulate as repeated entries; non-stackable
    /// effects replace the prior entry of the same kind.
    pub fn stackable(&self) -> bool {
        matches!(
            self,
            FeedbackKind::SensoryBleed | FeedbackKind::MigraineLance | FeedbackKind::FluxBurn
        )
    }

    /// The persistent kind never expires on its own.
    pub fn persistent(&self) -> bool {
        matches!(self, FeedbackKind::FracturedSignature)
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        match self {
            FeedbackKind::PsychicStatic => Some(10),
            FeedbackKind::SensoryBleed => Some(10),
            FeedbackKind::MigraineLance => Some(60),
            FeedbackKind::EmotionalEcho => Some(30),
            FeedbackKind::FluxBurn => Some(60),
            FeedbackKind::FracturedSignature => None,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            FeedbackKind::PsychicStatic => "Disadvantage on concentration checks",
            FeedbackKind::SensoryBleed => "Sounds and colors smear together; -2 to Perception",
            FeedbackKind::MigraineLance => "Piercing headache; disadvantage on INT checks",
            FeedbackKind::EmotionalEcho => "Your last strong emotion loops and colors every roll",
            FeedbackKind::FluxBurn => "Raw flux scorches the channels; 1 damage per power manifested",
            FeedbackKind::FracturedSignature => "Your signature is cracked open until mended",
        }
    }
}

/// One feedback effect currently weighing on a psion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEffect {
    pub kind: FeedbackKind,
    pub description: String,
    pub applied_at: DateTime<Utc>,
    /// None for the persistent kind.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Feedback effect for a 1d6 roll. Rolls outside 1-6 yield nothing.
pub fn feedback_effect_for_roll(roll: i32, now: DateTime<Utc>) -> Option<FeedbackEffect> {
    let kind = match roll {
        1 => FeedbackKind::PsychicStatic,
        2 => FeedbackKind::SensoryBleed,
        3 => FeedbackKind::MigraineLance,
        4 => FeedbackKind::EmotionalEcho,
        5 => FeedbackKind::FluxBurn,
        6 => FeedbackKind::FracturedSignature,
        _ => return None,
    };
    Some(FeedbackEffect {
        kind,
        description: kind.description().to_string(),
        applied_at: now,
        expires_at: kind
            .duration_minutes()
            .map(|minutes| now + Duration::minutes(minutes)),
    })
}

/// Roll 1d6 on the feedback table.
pub fn roll_feedback_effect(now: DateTime<Utc>) -> FeedbackEffect {
    use rand::Rng;
    let roll = rand::thread_rng().gen_range(1..=6);
    feedback_effect_for_roll(roll, now).expect("roll is in table range")
}

/// Add a feedback effect to an overload state. Non-stackable kinds replace
/// the prior entry of the same kind.
pub fn apply_feedback(state: &OverloadState, effect: FeedbackEffect) -> OverloadState {
    let mut updated = state.clone();
    if !effect.kind.stackable() {
        updated
            .accumulated_feedback
            .retain(|existing| existing.kind != effect.kind);
    }
    updated.accumulated_feedback.push(effect);
    updated
}

/// Drop every feedback effect whose expiry has passed. Persistent effects
/// are never dropped here.
pub fn expire_feedback(state: &OverloadState, now: DateTime<Utc>) -> OverloadState {
    let mut updated = state.clone();
    updated
        .accumulated_feedback
        .retain(|effect| match effect.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        });
    updated
}

/// Recovery window after an overload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverloadRecovery {
    pub started_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub is_recovering: bool,
    pub penalties_active: bool,
}

/// Start the recovery clock for an overload: ten minutes per excess point.
pub fn begin_overload_recovery(excess_afp: i32, now: DateTime<Utc>) -> OverloadRecovery {
    OverloadRecovery {
        started_at: now,
        duration_minutes: excess_afp as i64 * 10,
        is_recovering: true,
        penalties_active: true,
    }
}

/// Re-check the recovery window; once the duration has elapsed the psion is
/// no longer recovering and the penalties lift.
pub fn check_overload_recovery(recovery: &OverloadRecovery, now: DateTime<Utc>) -> OverloadRecovery {
    let mut updated = recovery.clone();
    if now >= recovery.started_at + Duration::minutes(recovery.duration_minutes) {
        updated.is_recovering = false;
        updated.penalties_active = false;
    }
    updated
}

// ============================================================================
// Focus and Concentration
// ============================================================================

/// How many powers a psion can hold in focus: 1 through level 5, 2 through
/// level 9, 3 from level 10 on.
pub fn focus_limit(level: i32) -> usize {
    match level {
        i32::MIN..=5 => 1,
        6..=9 => 2,
        _ => 3,
    }
}

/// Concentration save DC when taking damage while maintaining a power.
pub fn concentration_save_dc(damage_taken: i32) -> i32 {
    (damage_taken / 2).max(10)
}

/// A psionic power as the focus engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsionicPower {
    pub id: String,
    pub name: String,
    pub tier: u8,
    pub afp_cost: u8,
    pub requires_focus: bool,
    pub requires_concentration: bool,
    /// None for instantaneous powers with no duration tracking.
    pub duration_minutes: Option<i64>,
}

/// A power currently being maintained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintainedPower {
    pub power_id: String,
    pub power: PsionicPower,
    pub start_time: DateTime<Utc>,
    pub amplification_level: Option<u8>,
    pub target_info: Option<String>,
    /// Minutes left; decremented by update ticks. None when the power has
    /// no duration tracking.
    pub remaining_duration: Option<i64>,
}

/// Focus bookkeeping for one psion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    pub focus_limit: usize,
    pub maintained_powers: Vec<MaintainedPower>,
    /// Id of the single concentration power, if one is active.
    pub concentration_power: Option<String>,
    pub last_focus_break: Option<DateTime<Utc>>,
}

impl FocusState {
    pub fn new(level: i32) -> Self {
        Self {
            focus_limit: focus_limit(level),
            maintained_powers: Vec::new(),
            concentration_power: None,
            last_focus_break: None,
        }
    }

    /// Number of maintained powers that occupy a focus slot.
    pub fn focus_in_use(&self) -> usize {
        self.maintained_powers
            .iter()
            .filter(|maintained| maintained.power.requires_focus)
            .count()
    }
}

/// Why a maintained power ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusBreakCause {
    Voluntary,
    DamageTaken,
    Unconscious,
}

/// Outcome of adding a maintained power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPowerResult {
    pub success: bool,
    pub state: FocusState,
}

/// Begin maintaining a power.
///
/// Fails when the power needs a focus slot and none is free, or when it
/// concentrates and another concentration power is already active. The two
/// constraints are independent.
pub fn add_maintained_power(
    state: &FocusState,
    power: PsionicPower,
    now: DateTime<Utc>,
) -> AddPowerResult {
    if power.requires_focus && state.focus_in_use() >= state.focus_limit {
        return AddPowerResult {
            success: false,
            state: state.clone(),
        };
    }
    if power.requires_concentration && state.concentration_power.is_some() {
        return AddPowerResult {
            success: false,
            state: state.clone(),
        };
    }

    let mut updated = state.clone();
    if power.requires_concentration {
        updated.concentration_power = Some(power.id.clone());
    }
    updated.maintained_powers.push(MaintainedPower {
        power_id: power.id.clone(),
        remaining_duration: power.duration_minutes,
        power,
        start_time: now,
        amplification_level: None,
        target_info: None,
    });
    AddPowerResult {
        success: true,
        state: updated,
    }
}

/// Outcome of dropping maintained powers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakResult {
    pub state: FocusState,
    pub psychic_backlash: bool,
    /// Fixed backlash damage when `psychic_backlash` is set.
    pub backlash_damage: Option<String>,
}

fn break_result(state: FocusState, backlash: bool) -> BreakResult {
    BreakResult {
        state,
        psychic_backlash: backlash,
        backlash_damage: backlash.then(|| BACKLASH_DAMAGE.to_string()),
    }
}

/// Stop maintaining one power.
///
/// Voluntary removal never backlashes; any other cause backlashes iff the
/// removed power required focus.
pub fn remove_maintained_power(
    state: &FocusState,
    power_id: &str,
    cause: FocusBreakCause,
    now: DateTime<Utc>,
) -> BreakResult {
    let Some(index) = state
        .maintained_powers
        .iter()
        .position(|maintained| maintained.power_id == power_id)
    else {
        return break_result(state.clone(), false);
    };

    let mut updated = state.clone();
    let removed = updated.maintained_powers.remove(index);
    if updated.concentration_power.as_deref() == Some(power_id) {
        updated.concentration_power = None;
    }
    if removed.power.requires_focus {
        updated.last_focus_break = Some(now);
    }

    let backlash = cause != FocusBreakCause::Voluntary && removed.power.requires_focus;
    break_result(updated, backlash)
}

/// Drop every maintained power at once. Backlash applies iff the cause is
/// involuntary and ANY removed power required focus.
pub fn break_all_maintained_powers(
    state: &FocusState,
    cause: FocusBreakCause,
    now: DateTime<Utc>,
) -> BreakResult {
    let any_focused = state.focus_in_use() > 0;

    let mut updated = state.clone();
    updated.maintained_powers.clear();
    updated.concentration_power = None;
    if any_focused {
        updated.last_focus_break = Some(now);
    }

    let backlash = cause != FocusBreakCause::Voluntary && any_focused;
    break_result(updated, backlash)
}

/// Advance maintained powers by elapsed minutes.
///
/// Each power's remaining duration drops by the elapsed time; powers at or
/// below 0 are dropped, and a power with no duration tracking is dropped on
/// the first tick with nonzero elapsed time.
pub fn update_maintained_powers(state: &FocusState, elapsed_minutes: i64) -> FocusState {
    if elapsed_minutes == 0 {
        return state.clone();
    }

    let mut updated = state.clone();
    updated.maintained_powers.retain_mut(|maintained| {
        match maintained.remaining_duration {
            Some(remaining) => {
                let left = remaining - elapsed_minutes;
                maintained.remaining_duration = Some(left);
                left > 0
            }
            None => false,
        }
    });
    if let Some(ref concentration_id) = updated.concentration_power.clone() {
        let still_held = updated
            .maintained_powers
            .iter()
            .any(|maintained| &maintained.power_id == concentration_id);
        if !still_held {
            updated.concentration_power = None;
        }
    }
    updated
}

// ============================================================================
// Signature
// ============================================================================

/// The decaying, detectable trace left by psionic activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsionicSignature {
    pub character_id: CharacterId,
    pub base_emotion: String,
    pub power_level: u8,
    pub manifestation: String,
    /// Feet within which the lingering signature can be sensed.
    pub detectability_range: u32,
    pub last_used: Option<DateTime<Utc>>,
}

/// How long a signature lingers: ten minutes per tier per power level.
pub fn signature_linger_minutes(tier: u8, power_level: u8) -> i64 {
    tier as i64 * power_level as i64 * 10
}

/// Whether a signature is currently detectable for powers of a given tier:
/// the time since last use must be inside the linger window.
pub fn is_signature_detectable(
    signature: &PsionicSignature,
    tier: u8,
    now: DateTime<Utc>,
) -> bool {
    match signature.last_used {
        None => false,
        Some(last_used) => {
            let linger = Duration::minutes(signature_linger_minutes(tier, signature.power_level));
            now - last_used < linger
        }
    }
}

// ============================================================================
// Surge
// ============================================================================

/// The once-between-rests surge gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurgeState {
    pub available: bool,
    pub bonus_active: bool,
    pub backlash_pending: bool,
    pub free_afp_used: bool,
    pub afp_recovery_blocked: bool,
    pub last_used: Option<DateTime<Utc>>,
}

impl Default for SurgeState {
    fn default() -> Self {
        Self {
            available: true,
            bonus_active: false,
            backlash_pending: false,
            free_afp_used: false,
            afp_recovery_blocked: false,
            last_used: None,
        }
    }
}

/// Outcome of a surge activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurgeResult {
    pub success: bool,
    pub state: SurgeState,
}

/// Activate a surge. The bonus comes with pending backlash and blocked AFP
/// recovery; only a rest restores availability.
pub fn activate_surge(state: &SurgeState, now: DateTime<Utc>) -> SurgeResult {
    if !state.available {
        return SurgeResult {
            success: false,
            state: state.clone(),
        };
    }
    SurgeResult {
        success: true,
        state: SurgeState {
            available: false,
            bonus_active: true,
            backlash_pending: true,
            free_afp_used: state.free_afp_used,
            afp_recovery_blocked: true,
            last_used: Some(now),
        },
    }
}

/// Reset the surge gate at a rest: availability returns, and the pending
/// backlash, free-use flag, and last-use timestamp are cleared.
pub fn rest_surge_recovery(_state: &SurgeState) -> SurgeState {
    SurgeState::default()
}

// ============================================================================
// Psionic Data
// ============================================================================

/// Complete runtime psionic state for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsionicData {
    pub known_disciplines: Vec<String>,
    pub known_powers: Vec<PsionicPower>,
    pub aether_flux_points: ResourcePool,
    pub focus: FocusState,
    pub overload: OverloadState,
    pub surge: SurgeState,
    pub signature: PsionicSignature,
    pub psionic_level: u8,
    /// Intelligence or Wisdom.
    pub primary_ability: Ability,
}

impl PsionicData {
    /// Create psionic state for a character at the given psionic level.
    pub fn new(
        character_id: CharacterId,
        level: u8,
        primary_ability: Ability,
        ability_modifier: i32,
    ) -> Self {
        let maximum = afp_maximum(level as i32, ability_modifier);
        Self {
            known_disciplines: Vec::new(),
            known_powers: Vec::new(),
            aether_flux_points: ResourcePool::new(maximum, RestType::Long),
            focus: FocusState::new(level as i32),
            overload: OverloadState::default(),
            surge: SurgeState::default(),
            signature: PsionicSignature {
                character_id,
                base_emotion: String::new(),
                power_level: 0,
                manifestation: String::new(),
                detectability_range: 0,
                last_used: None,
            },
            psionic_level: level,
            primary_ability,
        }
    }

    /// Finish a rest: AFP is restored, the surge gate resets, and expired
    /// feedback is not touched (it expires on its own clock).
    pub fn rest(&self, rest: RestType) -> PsionicData {
        let mut updated = self.clone();
        updated.aether_flux_points = restore_afp(&self.aether_flux_points, rest);
        updated.surge = rest_surge_recovery(&self.surge);
        updated
    }
}
