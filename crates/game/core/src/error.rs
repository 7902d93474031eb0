//! Construction-time error infrastructure for battle-core.
//!
//! Only content-definition contract violations are errors. Everything that can
//! happen while a battle is being resolved (no target in range, an unmet
//! requirement, a guard veto, a failed sub-skill) is an ordinary outcome value
//! and never surfaces here.
//!
//! # Design Principles
//!
//! - **Fail at load time**: Validating constructors return [`ConfigError`]
//!   before a template can ever reach a battlefield
//! - **Rich Context**: Variants carry the offending name so content authors can
//!   find the broken definition
//! - **Stable Codes**: [`ConfigError::error_code`] gives a machine-readable
//!   identifier for tooling and tests

/// Which kind of template failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateKind {
    #[strum(serialize = "status")]
    Status,
    #[strum(serialize = "skill")]
    Skill,
    #[strum(serialize = "unit")]
    Unit,
}

/// Invalid content or configuration detected while building a template.
///
/// These are programmer errors in content data. They are never produced by
/// steady-state battle resolution.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A template was given an empty name.
    #[error("{kind} name must not be empty")]
    EmptyName { kind: TemplateKind },

    /// A template was given an empty description.
    #[error("{kind} '{name}' has an empty description")]
    EmptyDescription { kind: TemplateKind, name: String },

    /// Stack count was zero.
    #[error("status '{name}' must have at least one stack")]
    ZeroStacks { name: String },

    /// More than one stack on a status with finite positive duration.
    #[error("status '{name}' has {stacks} stacks but a finite duration; only instant or infinite statuses stack")]
    StacksOnTimedStatus { name: String, stacks: u32 },

    /// A pre-battle skill must target its own unit.
    #[error("pre-battle skill '{name}' must target self")]
    PreBattleTarget { name: String },

    /// Two skills of one unit share a name.
    #[error("unit '{unit}' lists skill '{skill}' more than once")]
    DuplicateSkill { unit: String, skill: String },

    /// A requirement entry was blank.
    #[error("skill '{name}' has an empty requirement name")]
    EmptyRequirement { name: String },

    /// Close-range slack must be non-negative.
    #[error("close distance must be non-negative, got {0}")]
    NegativeCloseDistance(f64),

    /// Placement jitter must be non-negative.
    #[error("placement jitter must be non-negative, got {0}")]
    NegativeJitter(f64),
}

impl ConfigError {
    /// Returns a static string identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        use ConfigError::*;
        match self {
            EmptyName { .. } => "CONFIG_EMPTY_NAME",
            EmptyDescription { .. } => "CONFIG_EMPTY_DESCRIPTION",
            ZeroStacks { .. } => "CONFIG_ZERO_STACKS",
            StacksOnTimedStatus { .. } => "CONFIG_STACKS_ON_TIMED_STATUS",
            PreBattleTarget { .. } => "CONFIG_PRE_BATTLE_TARGET",
            DuplicateSkill { .. } => "CONFIG_DUPLICATE_SKILL",
            EmptyRequirement { .. } => "CONFIG_EMPTY_REQUIREMENT",
            NegativeCloseDistance(_) => "CONFIG_NEGATIVE_CLOSE_DISTANCE",
            NegativeJitter(_) => "CONFIG_NEGATIVE_JITTER",
        }
    }
}

/// Returns `Err(EmptyName)` / `Err(EmptyDescription)` for blank fields.
pub(crate) fn require_text(
    kind: TemplateKind,
    name: &str,
    description: &str,
) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyName { kind });
    }
    if description.trim().is_empty() {
        return Err(ConfigError::EmptyDescription {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected_before_description() {
        let err = require_text(TemplateKind::Skill, "  ", "").unwrap_err();
        assert_eq!(err, ConfigError::EmptyName { kind: TemplateKind::Skill });
        assert_eq!(err.error_code(), "CONFIG_EMPTY_NAME");
    }

    #[test]
    fn messages_name_the_template() {
        let err = require_text(TemplateKind::Status, "Burn", "").unwrap_err();
        assert_eq!(err.to_string(), "status 'Burn' has an empty description");
    }
}
