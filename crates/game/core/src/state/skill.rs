//! Skills: timed actions a unit performs on the battlefield.
//!
//! A skill selects targets with a [`TargetMode`], filters them by required
//! statuses, runs its sub-skills, and on full success applies copies of its
//! effect templates. Cooldown bookkeeping lives on the skill itself; the unit
//! that owns it is passed in at execution time.

use crate::action::TargetMode;
use crate::error::{ConfigError, TemplateKind, require_text};

use super::guard::Guard;
use super::status::Status;

/// Reset value of a skill's readiness timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cooldown {
    /// Runs once when the owner joins the battle, never in combat.
    PreBattle,
    /// No timer. Only useful as a sub-skill.
    Instant,
    /// Ready again this many milliseconds after use.
    Every(u64),
}

impl Cooldown {
    /// Converts the signed content encoding (<0 pre-battle, 0 instant, >0 timed).
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            0 => Self::Instant,
            m if m > 0 => Self::Every(m.unsigned_abs()),
            _ => Self::PreBattle,
        }
    }

    pub fn period(self) -> Option<u64> {
        match self {
            Self::Every(ms) => Some(ms),
            _ => None,
        }
    }
}

/// Validated construction record for [`Skill`].
#[derive(Clone, Debug)]
pub struct SkillSpec {
    pub name: String,
    pub description: String,
    pub target: TargetMode,
    pub cooldown: Cooldown,
    pub guard: Guard,
    pub effects: Vec<Status>,
    pub requirements: Vec<String>,
    pub sub_skills: Vec<Skill>,
}

impl SkillSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        target: TargetMode,
        cooldown: Cooldown,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            target,
            cooldown,
            guard: Guard::Always,
            effects: Vec::new(),
            requirements: Vec::new(),
            sub_skills: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Skill {
    name: String,
    description: String,
    target: TargetMode,
    cooldown: Cooldown,
    /// Milliseconds until ready. Negative once overdue.
    remaining: i64,
    guard: Guard,
    effects: Vec<Status>,
    requirements: Vec<String>,
    sub_skills: Vec<Skill>,
}

impl Skill {
    /// Builds a skill. Timed skills start with a full cooldown.
    pub fn new(spec: SkillSpec) -> Result<Self, ConfigError> {
        require_text(TemplateKind::Skill, &spec.name, &spec.description)?;
        if spec.cooldown == Cooldown::PreBattle && spec.target != TargetMode::SelfOnly {
            return Err(ConfigError::PreBattleTarget { name: spec.name });
        }
        if spec.requirements.iter().any(|r| r.trim().is_empty()) {
            return Err(ConfigError::EmptyRequirement { name: spec.name });
        }

        let remaining = spec.cooldown.period().map_or(0, millis_i64);
        Ok(Self {
            name: spec.name,
            description: spec.description,
            target: spec.target,
            cooldown: spec.cooldown,
            remaining,
            guard: spec.guard,
            effects: spec.effects,
            requirements: spec.requirements,
            sub_skills: spec.sub_skills,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target(&self) -> TargetMode {
        self.target
    }

    pub fn cooldown(&self) -> Cooldown {
        self.cooldown
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn effects(&self) -> &[Status] {
        &self.effects
    }

    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    pub fn sub_skills(&self) -> &[Skill] {
        &self.sub_skills
    }

    pub fn is_pre_battle(&self) -> bool {
        self.cooldown == Cooldown::PreBattle
    }

    /// Skill takes part in the combat timeline.
    pub fn is_timed(&self) -> bool {
        matches!(self.cooldown, Cooldown::Every(_))
    }

    /// Timed skill whose cooldown has run out.
    pub fn is_ready(&self) -> bool {
        self.is_timed() && self.remaining <= 0
    }

    /// Resets the timer after a successful use.
    pub fn rearm(&mut self) {
        if let Some(period) = self.cooldown.period() {
            self.remaining = millis_i64(period);
        }
    }

    /// Counts down a timed skill.
    pub(crate) fn elapse(&mut self, millis: u64) {
        if self.is_timed() {
            self.remaining = self.remaining.saturating_sub(millis_i64(millis));
        }
    }

    /// Moves a timed skill's readiness by `delta` milliseconds.
    pub(crate) fn shift(&mut self, delta: i64) {
        if self.is_timed() {
            self.remaining = self.remaining.saturating_add(delta);
        }
    }
}

fn millis_i64(millis: u64) -> i64 {
    i64::try_from(millis).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(cooldown: u64) -> Skill {
        Skill::new(SkillSpec::new(
            "Slash",
            "A quick cut",
            TargetMode::CloseEnemy,
            Cooldown::Every(cooldown),
        ))
        .unwrap()
    }

    #[test]
    fn timed_skill_starts_on_cooldown() {
        let mut skill = timed(1000);
        assert_eq!(skill.remaining(), 1000);
        assert!(!skill.is_ready());

        skill.elapse(1000);
        assert!(skill.is_ready());

        skill.rearm();
        assert_eq!(skill.remaining(), 1000);
    }

    #[test]
    fn untimed_skills_never_tick() {
        let mut skill = Skill::new(SkillSpec::new(
            "Brace",
            "Plant your feet",
            TargetMode::SelfOnly,
            Cooldown::PreBattle,
        ))
        .unwrap();
        skill.elapse(500);
        skill.shift(200);
        assert_eq!(skill.remaining(), 0);
        assert!(!skill.is_ready());
    }

    #[test]
    fn pre_battle_skill_must_target_self() {
        let err = Skill::new(SkillSpec::new(
            "Ambush",
            "Strike first",
            TargetMode::AnyEnemy,
            Cooldown::PreBattle,
        ))
        .unwrap_err();
        assert_eq!(err, ConfigError::PreBattleTarget { name: "Ambush".into() });
    }

    #[test]
    fn cooldown_sign_encoding() {
        assert_eq!(Cooldown::from_millis(-5), Cooldown::PreBattle);
        assert_eq!(Cooldown::from_millis(0), Cooldown::Instant);
        assert_eq!(Cooldown::from_millis(750), Cooldown::Every(750));
    }
}
