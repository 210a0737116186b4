//! Structured rule-violation reporting.
//!
//! Every validator in this crate returns `Result<T, Vec<Violation>>` and
//! accumulates all violated rules in a single call rather than stopping at
//! the first. Each violation carries a stable machine-readable code so
//! callers can branch on failures without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a rule validation: the computed value, or every rule it broke.
pub type RuleResult<T> = Result<T, Vec<Violation>>;

/// Stable machine-readable codes for rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationCode {
    // Experience and leveling
    InvalidXpNegative,
    InvalidXpGainNegative,
    WarningXpVeryHigh,
    InvalidLevelTooLow,
    InvalidLevelTooHigh,
    InconsistentCurrentLevel,
    InconsistentXpLevel,

    // Advancement choices
    InvalidHitPointsNegative,
    InvalidHpMethod,
    MissingRolledValue,
    InvalidRolledValue,
    AsiAndFeatConflict,
    FeatPrerequisitesNotMet,
    DuplicateAsi,
    AbilityScoreMaxExceeded,
    MissingHitPoints,
    MissingAsiOrFeat,

    // Multiclassing
    MulticlassPrerequisiteNotMet,
}

impl ViolationCode {
    /// The stable wire form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::InvalidXpNegative => "INVALID_XP_NEGATIVE",
            ViolationCode::InvalidXpGainNegative => "INVALID_XP_GAIN_NEGATIVE",
            ViolationCode::WarningXpVeryHigh => "WARNING_XP_VERY_HIGH",
            ViolationCode::InvalidLevelTooLow => "INVALID_LEVEL_TOO_LOW",
            ViolationCode::InvalidLevelTooHigh => "INVALID_LEVEL_TOO_HIGH",
            ViolationCode::InconsistentCurrentLevel => "INCONSISTENT_CURRENT_LEVEL",
            ViolationCode::InconsistentXpLevel => "INCONSISTENT_XP_LEVEL",
            ViolationCode::InvalidHitPointsNegative => "INVALID_HIT_POINTS_NEGATIVE",
            ViolationCode::InvalidHpMethod => "INVALID_HP_METHOD",
            ViolationCode::MissingRolledValue => "MISSING_ROLLED_VALUE",
            ViolationCode::InvalidRolledValue => "INVALID_ROLLED_VALUE",
            ViolationCode::AsiAndFeatConflict => "ASI_AND_FEAT_CONFLICT",
            ViolationCode::FeatPrerequisitesNotMet => "FEAT_PREREQUISITES_NOT_MET",
            ViolationCode::DuplicateAsi => "DUPLICATE_ASI",
            ViolationCode::AbilityScoreMaxExceeded => "ABILITY_SCORE_MAX_EXCEEDED",
            ViolationCode::MissingHitPoints => "MISSING_HIT_POINTS",
            ViolationCode::MissingAsiOrFeat => "MISSING_ASI_OR_FEAT",
            ViolationCode::MulticlassPrerequisiteNotMet => "MULTICLASS_PREREQUISITE_NOT_MET",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single violated rule: code, offending field, human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        code: ViolationCode,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.field, self.message)
    }
}
