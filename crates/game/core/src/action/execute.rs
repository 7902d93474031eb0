//! Skill execution pipeline.
//!
//! A skill resolves in stages: usability check, target resolution and
//! requirement filter, sub-skills (depth first, same actor), and finally the
//! effect application. Sub-skill failures stop the effects of the parent but
//! still count as partial success when at least one sub-skill went through.

use std::collections::BTreeSet;

use crate::engine::Battlefield;
use crate::state::{Skill, UnitId};

use super::targeting::resolve_targets;

/// When a skill is being executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Phase {
    /// The owner is joining the battlefield.
    PreBattle,
    /// Regular turn.
    Combat,
}

/// Outcome of one skill execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Unusable, no target, unmet requirement, or every sub-skill failed.
    Failed,
    /// Some sub-skills succeeded but not all; no effects were applied.
    Partial,
    /// Effects were applied to `targets` (possibly none, if they vanished
    /// while the sub-skills ran).
    Applied { targets: Vec<UnitId> },
}

impl Resolution {
    pub fn succeeded(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Units that received the effects.
    pub fn targets(&self) -> &[UnitId] {
        match self {
            Self::Applied { targets } => targets,
            _ => &[],
        }
    }
}

impl Battlefield {
    /// Executes `skill` for `actor`.
    ///
    /// `skill` is a copy; cooldown bookkeeping on the owner's own skill is up
    /// to the caller.
    pub fn resolve_skill(&mut self, actor: UnitId, skill: &Skill, phase: Phase) -> Resolution {
        self.resolve_into(actor, skill, phase, &mut BTreeSet::new())
    }

    /// Like [`Self::resolve_skill`], also returning every unit that received
    /// effects at any depth of the sub-skill chain.
    pub(crate) fn resolve_skill_touching(
        &mut self,
        actor: UnitId,
        skill: &Skill,
        phase: Phase,
    ) -> (Resolution, BTreeSet<UnitId>) {
        let mut touched = BTreeSet::new();
        let resolution = self.resolve_into(actor, skill, phase, &mut touched);
        (resolution, touched)
    }

    fn resolve_into(
        &mut self,
        actor: UnitId,
        skill: &Skill,
        phase: Phase,
        touched: &mut BTreeSet<UnitId>,
    ) -> Resolution {
        let Some(unit) = self.unit(actor) else {
            return Resolution::Failed;
        };
        if phase == Phase::Combat && skill.is_pre_battle() {
            tracing::debug!(%actor, skill = skill.name(), "pre-battle skill used in combat");
            return Resolution::Failed;
        }
        if unit.is_stunned() || !skill.guard().allows(unit) {
            tracing::debug!(%actor, skill = skill.name(), "skill not usable");
            return Resolution::Failed;
        }

        if self.eligible_targets(actor, skill).is_empty() {
            tracing::debug!(%actor, skill = skill.name(), "no eligible target");
            return Resolution::Failed;
        }

        let mut any_succeeded = false;
        let mut all_succeeded = true;
        for sub in skill.sub_skills() {
            let ok = self.resolve_into(actor, sub, phase, touched).succeeded();
            any_succeeded |= ok;
            all_succeeded &= ok;
        }
        if !all_succeeded {
            tracing::debug!(%actor, skill = skill.name(), any_succeeded, "sub-skill chain broken");
            return if any_succeeded {
                Resolution::Partial
            } else {
                Resolution::Failed
            };
        }

        let mut targets = self.eligible_targets(actor, skill);
        if !skill.target().is_all() {
            targets.truncate(1);
        }
        for &target in &targets {
            for effect in skill.effects() {
                self.apply_status_at(target, effect.clone(), 0);
            }
        }
        touched.extend(targets.iter().copied());
        tracing::debug!(%actor, skill = skill.name(), %phase, ?targets, "skill applied");
        Resolution::Applied { targets }
    }

    /// Targets of `skill` that hold every required status, nearest first.
    fn eligible_targets(&self, actor: UnitId, skill: &Skill) -> Vec<UnitId> {
        resolve_targets(self, actor, skill.target())
            .into_iter()
            .filter(|id| {
                self.unit(*id).is_some_and(|unit| {
                    skill
                        .requirements()
                        .iter()
                        .all(|name| unit.has_status(name))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TargetMode;
    use crate::config::BattleConfig;
    use crate::state::{
        Cooldown, Guard, SkillSpec, Status, StatusDuration, StatusFlags, StatusSpec, TeamId, Unit,
        UnitSpec,
    };

    fn mark(name: &str) -> Status {
        Status::new(StatusSpec::new(name, "test mark", StatusDuration::Infinite)).unwrap()
    }

    fn skill(name: &str, target: TargetMode, effects: Vec<Status>) -> SkillSpec {
        SkillSpec {
            effects,
            ..SkillSpec::new(name, "test skill", target, Cooldown::Every(500))
        }
    }

    fn build(spec: SkillSpec) -> Skill {
        Skill::new(spec).unwrap()
    }

    fn dummy(name: &str) -> Unit {
        Unit::new(UnitSpec::new(name, 0, Vec::new())).unwrap()
    }

    /// Actor on team 0, two enemies on team 1.
    fn setup() -> (Battlefield, UnitId, UnitId, UnitId) {
        let mut field = Battlefield::new(BattleConfig::deterministic()).unwrap();
        let actor = field.add_unit(dummy("Hero"), TeamId(0));
        let front = field.add_unit(dummy("Front"), TeamId(1));
        let back = field.add_unit(Unit::new(UnitSpec::new("Back", 1, Vec::new())).unwrap(), TeamId(1));
        (field, actor, front, back)
    }

    #[test]
    fn single_target_mode_hits_only_the_nearest() {
        let (mut field, actor, front, back) = setup();
        let poke = build(skill("Poke", TargetMode::AnyEnemy, vec![mark("Hit")]));

        let result = field.resolve_skill(actor, &poke, Phase::Combat);
        assert_eq!(result, Resolution::Applied { targets: vec![front] });
        assert!(field.unit(front).unwrap().has_status("Hit"));
        assert!(!field.unit(back).unwrap().has_status("Hit"));
    }

    #[test]
    fn all_mode_hits_every_candidate() {
        let (mut field, actor, front, back) = setup();
        let volley = build(skill("Volley", TargetMode::AllEnemies, vec![mark("Hit")]));

        let result = field.resolve_skill(actor, &volley, Phase::Combat);
        assert_eq!(result.targets(), &[front, back]);
    }

    #[test]
    fn requirement_filters_targets() {
        let (mut field, actor, front, back) = setup();
        field.apply_status(back, mark("Marked"));
        let execute = build(SkillSpec {
            requirements: vec!["Marked".into()],
            ..skill("Execute", TargetMode::AnyEnemy, vec![mark("Hit")])
        });

        let result = field.resolve_skill(actor, &execute, Phase::Combat);
        assert_eq!(result.targets(), &[back]);
        assert!(!field.unit(front).unwrap().has_status("Hit"));

        field.remove_status(back, "Marked");
        assert_eq!(field.resolve_skill(actor, &execute, Phase::Combat), Resolution::Failed);
    }

    #[test]
    fn one_failing_sub_skill_applies_no_effects() {
        let (mut field, actor, front, _) = setup();
        let works = build(skill("Works", TargetMode::AnyEnemy, vec![mark("FromSub")]));
        let fails = build(SkillSpec {
            requirements: vec!["Nobody".into()],
            ..skill("Fails", TargetMode::AnyEnemy, Vec::new())
        });
        let combo = build(SkillSpec {
            sub_skills: vec![works, fails],
            ..skill("Combo", TargetMode::AnyEnemy, vec![mark("FromParent")])
        });

        let result = field.resolve_skill(actor, &combo, Phase::Combat);
        assert_eq!(result, Resolution::Partial);
        assert!(result.succeeded());
        let target = field.unit(front).unwrap();
        assert!(target.has_status("FromSub"));
        assert!(!target.has_status("FromParent"));
    }

    #[test]
    fn every_sub_skill_failing_fails_the_parent() {
        let (mut field, actor, _, _) = setup();
        let fails = build(SkillSpec {
            guard: Guard::Never,
            ..skill("Fails", TargetMode::AnyEnemy, Vec::new())
        });
        let combo = build(SkillSpec {
            sub_skills: vec![fails],
            ..skill("Combo", TargetMode::AnyEnemy, vec![mark("FromParent")])
        });

        assert_eq!(field.resolve_skill(actor, &combo, Phase::Combat), Resolution::Failed);
    }

    #[test]
    fn stunned_actor_cannot_use_skills() {
        let (mut field, actor, _, _) = setup();
        let stun = Status::new(StatusSpec {
            flags: StatusFlags::STUNNING,
            ..StatusSpec::new("Stun", "Dazed", StatusDuration::Finite(100))
        })
        .unwrap();
        field.apply_status(actor, stun);

        let poke = build(skill("Poke", TargetMode::AnyEnemy, vec![mark("Hit")]));
        assert_eq!(field.resolve_skill(actor, &poke, Phase::Combat), Resolution::Failed);
    }

    #[test]
    fn pre_battle_skills_only_run_before_combat() {
        let (mut field, actor, _, _) = setup();
        let focus = build(SkillSpec {
            effects: vec![mark("Focused")],
            ..SkillSpec::new("Focus", "Breathe in", TargetMode::SelfOnly, Cooldown::PreBattle)
        });

        assert_eq!(field.resolve_skill(actor, &focus, Phase::Combat), Resolution::Failed);
        assert_eq!(
            field.resolve_skill(actor, &focus, Phase::PreBattle),
            Resolution::Applied { targets: vec![actor] }
        );
    }

    #[test]
    fn sub_skill_that_removes_the_requirement_still_succeeds() {
        let (mut field, actor, front, _) = setup();
        field.apply_status(front, mark("Exposed"));
        let consume = Status::new(StatusSpec {
            triggers: vec![crate::state::StatusTrigger {
                on: crate::state::StatusEvent::Applied,
                reaction: crate::state::Reaction::Remove("Exposed".into()),
            }],
            ..StatusSpec::new("Consume", "Uses up the opening", StatusDuration::Instant)
        })
        .unwrap();
        let opener = build(SkillSpec {
            requirements: vec!["Exposed".into()],
            ..skill("Opener", TargetMode::AnyEnemy, vec![consume])
        });
        let finisher = build(SkillSpec {
            requirements: vec!["Exposed".into()],
            sub_skills: vec![opener],
            ..skill("Finisher", TargetMode::AnyEnemy, vec![mark("Finished")])
        });

        let result = field.resolve_skill(actor, &finisher, Phase::Combat);
        assert_eq!(result, Resolution::Applied { targets: Vec::new() });
        assert!(!field.unit(front).unwrap().has_status("Finished"));
    }
}
