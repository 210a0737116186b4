//! Experience points and leveling.
//!
//! A pure-data state machine over a fixed 20-entry XP threshold table.
//! Level and XP are kept consistent by validators; advancement may span
//! several levels in a single grant.

use crate::validation::{RuleResult, Violation, ViolationCode};
use serde::{Deserialize, Serialize};

/// XP required to reach each level. `XP_THRESHOLDS[L - 1]` is the minimum
/// total XP for level L.
pub const XP_THRESHOLDS: [i64; 20] = [
    0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000, 85_000, 100_000, 120_000,
    140_000, 165_000, 195_000, 225_000, 265_000, 305_000, 355_000,
];

/// XP threshold for the maximum level.
pub const MAX_LEVEL_XP: i64 = 355_000;

/// Totals above this trip the sanity warning in
/// [`validate_experience_points`].
pub const XP_SANITY_THRESHOLD: i64 = 1_000_000;

/// The level implied by an XP total: the highest threshold at or below the
/// total, clamped to [1, 20]. Negative XP clamps to level 1.
pub fn level_from_xp(xp: i64) -> i32 {
    let mut level = 1;
    for (index, threshold) in XP_THRESHOLDS.iter().enumerate() {
        if xp >= *threshold {
            level = index as i32 + 1;
        } else {
            break;
        }
    }
    level
}

/// XP threshold for a level. Out-of-range levels clamp to the nearest
/// table row.
pub fn xp_for_level(level: i32) -> i64 {
    let index = (level.clamp(1, 20) - 1) as usize;
    XP_THRESHOLDS[index]
}

/// XP threshold for the level after this one. At level 20 (and above) this
/// clamps to the level-20 threshold.
pub fn xp_for_next_level(level: i32) -> i64 {
    xp_for_level(level + 1)
}

/// XP still needed to reach the next level, floored at 0. Returns 0 at the
/// maximum level.
pub fn xp_to_next_level(current_xp: i64, current_level: i32) -> i64 {
    (xp_for_next_level(current_level) - current_xp).max(0)
}

/// Result of computing a level advancement from an XP grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelAdvancement {
    pub from_level: i32,
    pub to_level: i32,
    pub xp_gained: i64,
    pub is_valid: bool,
    pub errors: Vec<Violation>,
}

/// Compute the advancement produced by an XP grant.
///
/// Fails when the grant is negative, or when the caller's claimed current
/// level disagrees with what the XP total implies. A valid grant may skip
/// several levels at once.
pub fn calculate_level_advancement(
    current_xp: i64,
    current_level: i32,
    xp_gained: i64,
) -> LevelAdvancement {
    let mut errors = Vec::new();

    if xp_gained < 0 {
        errors.push(Violation::new(
            ViolationCode::InvalidXpGainNegative,
            "xpGained",
            "Experience gain cannot be negative",
        ));
    }

    if level_from_xp(current_xp) != current_level {
        errors.push(Violation::new(
            ViolationCode::InconsistentCurrentLevel,
            "currentLevel",
            format!(
                "current level {current_level} does not match the level implied by {current_xp} XP"
            ),
        ));
    }

    if !errors.is_empty() {
        return LevelAdvancement {
            from_level: current_level,
            to_level: current_level,
            xp_gained,
            is_valid: false,
            errors,
        };
    }

    LevelAdvancement {
        from_level: current_level,
        to_level: level_from_xp(current_xp + xp_gained),
        xp_gained,
        is_valid: true,
        errors: Vec::new(),
    }
}

/// A character's experience record. All fields are derived from
/// `current_xp`; use [`ExperienceData::new`] and [`add_experience`] to keep
/// them consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceData {
    pub current_xp: i64,
    pub current_level: i32,
    pub next_level_xp: i64,
    pub current_level_xp: i64,
    pub max_level_xp: i64,
}

impl ExperienceData {
    /// Build a fully derived record from an XP total.
    pub fn new(current_xp: i64) -> Self {
        let current_level = level_from_xp(current_xp);
        Self {
            current_xp,
            current_level,
            next_level_xp: xp_for_next_level(current_level),
            current_level_xp: xp_for_level(current_level),
            max_level_xp: MAX_LEVEL_XP,
        }
    }

    pub fn at_max_level(&self) -> bool {
        self.current_level >= 20
    }
}

/// Apply an XP grant, returning the recomputed record. The input record is
/// never mutated; a negative grant fails without producing a new record.
pub fn add_experience(data: &ExperienceData, gained: i64) -> RuleResult<ExperienceData> {
    if gained < 0 {
        return Err(vec![Violation::new(
            ViolationCode::InvalidXpGainNegative,
            "xpGained",
            "Experience gain cannot be negative",
        )]);
    }
    Ok(ExperienceData::new(data.current_xp + gained))
}

/// Validate an XP total.
///
/// Totals above [`XP_SANITY_THRESHOLD`] fail with a warning-coded
/// violation: warnings ride the same failure channel as hard errors so
/// callers cannot miss them.
pub fn validate_experience_points(xp: i64) -> RuleResult<()> {
    if xp < 0 {
        return Err(vec![Violation::new(
            ViolationCode::InvalidXpNegative,
            "currentXP",
            "Experience points cannot be negative",
        )]);
    }
    if xp > XP_SANITY_THRESHOLD {
        return Err(vec![Violation::new(
            ViolationCode::WarningXpVeryHigh,
            "currentXP",
            format!("{xp} XP is implausibly high (sanity threshold {XP_SANITY_THRESHOLD})"),
        )]);
    }
    Ok(())
}

/// Validate a character level against the [1, 20] range.
pub fn validate_level(level: i32) -> RuleResult<()> {
    if level < 1 {
        return Err(vec![Violation::new(
            ViolationCode::InvalidLevelTooLow,
            "currentLevel",
            "Level cannot be lower than 1",
        )]);
    }
    if level > 20 {
        return Err(vec![Violation::new(
            ViolationCode::InvalidLevelTooHigh,
            "currentLevel",
            "Level cannot exceed 20",
        )]);
    }
    Ok(())
}

/// Validate that a stored level matches what the stored XP total implies.
pub fn validate_xp_level_consistency(xp: i64, level: i32) -> RuleResult<()> {
    let implied = level_from_xp(xp);
    if implied != level {
        return Err(vec![Violation::new(
            ViolationCode::InconsistentXpLevel,
            "currentLevel",
            format!("{xp} XP implies level {implied}, not {level}"),
        )]);
    }
    Ok(())
}
