//! Units: the fighters placed on a battlefield.
//!
//! A unit owns its skills and statuses outright. It knows nothing about the
//! scheduler; operations that affect scheduled events report what changed
//! (expiry times, stun shifts) and the battlefield applies it.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::{ConfigError, TemplateKind};

use super::Tick;
use super::skill::Skill;
use super::status::Status;

/// Validated construction record for [`Unit`].
#[derive(Clone, Debug)]
pub struct UnitSpec {
    pub name: String,
    /// Starting row, 0 being the front line.
    pub row: u8,
    /// Skills in priority order.
    pub skills: Vec<Skill>,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>, row: u8, skills: Vec<Skill>) -> Self {
        Self {
            name: name.into(),
            row,
            skills,
        }
    }
}

/// How a status application was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApplyOutcome {
    /// The status' apply-guard rejected the unit.
    Vetoed,
    /// A status with the same name but the other merge kind is held.
    Conflict,
    /// Instant status: took effect and was not stored.
    Fired,
    /// Stored as a new status.
    Inserted,
    /// Stacks were added to the held status.
    Stacked,
    /// Time was added to the held status.
    Extended,
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        !matches!(self, Self::Vetoed | Self::Conflict)
    }
}

/// Result of [`Unit::add_status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub outcome: ApplyOutcome,
    /// Remaining time of the stored status when its expiry must be (re)registered.
    pub expires_in: Option<u64>,
    /// Change of the unit's stun duration, already applied to its cooldowns.
    pub stun_shift: i64,
}

impl StatusChange {
    fn rejected(outcome: ApplyOutcome) -> Self {
        Self {
            outcome,
            expires_in: None,
            stun_shift: 0,
        }
    }
}

/// Result of [`Unit::remove_status`].
#[derive(Clone, Debug)]
pub enum Removal {
    /// The unit does not hold the status.
    Absent,
    /// The status' remove-guard refused.
    Vetoed,
    /// The status was removed.
    Removed { status: Status, stun_shift: i64 },
}

#[derive(Clone, Debug)]
pub struct Unit {
    name: String,
    row: u8,
    skills: Vec<Skill>,
    statuses: BTreeMap<String, Status>,
    last_sync: Tick,
}

impl Unit {
    pub fn new(spec: UnitSpec) -> Result<Self, ConfigError> {
        if spec.name.trim().is_empty() {
            return Err(ConfigError::EmptyName {
                kind: TemplateKind::Unit,
            });
        }
        for (i, skill) in spec.skills.iter().enumerate() {
            if spec.skills[..i].iter().any(|s| s.name() == skill.name()) {
                return Err(ConfigError::DuplicateSkill {
                    unit: spec.name,
                    skill: skill.name().to_string(),
                });
            }
        }

        Ok(Self {
            name: spec.name,
            row: spec.row,
            skills: spec.skills,
            statuses: BTreeMap::new(),
            last_sync: Tick::ZERO,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub(crate) fn skills_mut(&mut self) -> &mut [Skill] {
        &mut self.skills
    }

    /// Held statuses, ordered by name.
    pub fn statuses(&self) -> impl Iterator<Item = &Status> + '_ {
        self.statuses.values()
    }

    pub fn status(&self, name: &str) -> Option<&Status> {
        self.statuses.get(name)
    }

    pub fn has_status(&self, name: &str) -> bool {
        self.statuses.contains_key(name)
    }

    pub fn last_sync(&self) -> Tick {
        self.last_sync
    }

    pub(crate) fn set_last_sync(&mut self, now: Tick) {
        self.last_sync = now;
    }

    /// Holds a stunning status with time left.
    pub fn is_stunned(&self) -> bool {
        self.statuses.values().any(Status::stuns)
    }

    /// Holds a stunning status that never runs out.
    pub fn is_stunned_indefinitely(&self) -> bool {
        self.statuses
            .values()
            .any(|s| s.stuns() && s.duration().finite().is_none())
    }

    /// Holds any defeating status.
    pub fn is_defeated(&self) -> bool {
        self.statuses.values().any(Status::is_defeating)
    }

    /// Longest remaining time among finite stunning statuses.
    pub fn stun_duration(&self) -> u64 {
        self.statuses
            .values()
            .filter(|s| s.stuns())
            .filter_map(|s| s.duration().finite())
            .max()
            .unwrap_or(0)
    }

    /// Index of the first ready skill in priority order.
    pub fn next_ready_skill(&self) -> Option<usize> {
        if self.is_stunned() {
            return None;
        }
        self.skills.iter().position(Skill::is_ready)
    }

    /// Milliseconds until the earliest timed skill is ready (0 if one already is).
    pub fn next_ready_in(&self) -> Option<u64> {
        self.skills
            .iter()
            .filter(|s| s.is_timed())
            .map(|s| u64::try_from(s.remaining()).unwrap_or(0))
            .min()
    }

    /// Unit has at least one skill that takes part in the combat timeline.
    pub fn has_timed_skills(&self) -> bool {
        self.skills.iter().any(Skill::is_timed)
    }

    /// Applies a status using the merge rules.
    ///
    /// Stackable statuses of the same name sum their stacks; finite ones sum
    /// their durations. Any change to the total stun duration is applied to the
    /// skill cooldowns here and reported for the scheduler.
    pub fn add_status(&mut self, status: Status) -> StatusChange {
        if !status.apply_guard().allows(self) {
            return StatusChange::rejected(ApplyOutcome::Vetoed);
        }
        if status.duration().is_instant() {
            return StatusChange::rejected(ApplyOutcome::Fired);
        }

        let before = self.stun_duration();
        let (outcome, expires_in) = match self.statuses.entry(status.name().to_string()) {
            Entry::Occupied(mut held) => {
                let held = held.get_mut();
                if !held.merges_with(&status) {
                    tracing::warn!(
                        unit = %self.name,
                        status = status.name(),
                        "rejecting re-application with a different stacking kind"
                    );
                    return StatusChange::rejected(ApplyOutcome::Conflict);
                }
                if held.is_stackable() {
                    held.add_stacks(status.stacks());
                    (ApplyOutcome::Stacked, None)
                } else {
                    let added = status.duration().finite().unwrap_or(0);
                    (ApplyOutcome::Extended, held.extend(added))
                }
            }
            Entry::Vacant(slot) => {
                let expires_in = status.duration().finite();
                slot.insert(status);
                (ApplyOutcome::Inserted, expires_in)
            }
        };

        StatusChange {
            outcome,
            expires_in,
            stun_shift: self.restun(before),
        }
    }

    /// Removes a status if its remove-guard allows it.
    pub fn remove_status(&mut self, name: &str) -> Removal {
        let Some(held) = self.statuses.get(name) else {
            return Removal::Absent;
        };
        if !held.remove_guard().allows(self) {
            return Removal::Vetoed;
        }

        let before = self.stun_duration();
        match self.statuses.remove(name) {
            Some(status) => Removal::Removed {
                status,
                stun_shift: self.restun(before),
            },
            None => Removal::Absent,
        }
    }

    /// Brings the unit's timers up to `now`.
    ///
    /// Finite statuses and timed cooldowns count down by the elapsed time.
    /// While the unit is stunned indefinitely, cooldowns only count down the
    /// finite stun time they were shifted by, never further. Statuses
    /// that ran out are removed unless their remove-guard refuses, in which case
    /// they stay at zero and are retried on the next update. Returns the
    /// removed statuses.
    pub fn update(&mut self, now: Tick) -> Vec<Status> {
        let elapsed = now.since(self.last_sync);
        self.last_sync = self.last_sync.max(now);

        if elapsed > 0 {
            // A frozen unit still works off the shift its finite stuns added.
            let cooldown_elapsed = if self.is_stunned_indefinitely() {
                elapsed.min(self.stun_duration())
            } else {
                elapsed
            };
            for status in self.statuses.values_mut() {
                status.elapse(elapsed);
            }
            for skill in &mut self.skills {
                skill.elapse(cooldown_elapsed);
            }
        }

        let expiring: Vec<String> = self
            .statuses
            .values()
            .filter(|s| s.is_expiring())
            .map(|s| s.name().to_string())
            .collect();

        let mut expired = Vec::new();
        for name in expiring {
            let allowed = self
                .statuses
                .get(&name)
                .is_some_and(|s| s.remove_guard().allows(self));
            if !allowed {
                continue;
            }
            if let Some(status) = self.statuses.remove(&name) {
                expired.push(status);
            }
        }
        expired
    }

    /// Applies the stun delta since `before` to every timed cooldown.
    fn restun(&mut self, before: u64) -> i64 {
        let after = self.stun_duration();
        let delta = signed(after) - signed(before);
        if delta != 0 {
            for skill in &mut self.skills {
                skill.shift(delta);
            }
        }
        delta
    }
}

fn signed(millis: u64) -> i64 {
    i64::try_from(millis).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TargetMode;
    use crate::state::{Cooldown, Guard, SkillSpec, StatusDuration, StatusFlags, StatusSpec};

    fn skill(name: &str, cooldown: Cooldown) -> Skill {
        Skill::new(SkillSpec::new(name, "test skill", TargetMode::CloseEnemy, cooldown)).unwrap()
    }

    fn unit(skills: Vec<Skill>) -> Unit {
        Unit::new(UnitSpec::new("Knight", 0, skills)).unwrap()
    }

    fn status(name: &str, duration: StatusDuration, stacks: u32, flags: StatusFlags) -> Status {
        Status::new(StatusSpec {
            stacks,
            flags,
            ..StatusSpec::new(name, "test status", duration)
        })
        .unwrap()
    }

    fn stun(ms: u64) -> Status {
        status("Stun", StatusDuration::Finite(ms), 1, StatusFlags::STUNNING)
    }

    #[test]
    fn stackable_merge_sums_stacks() {
        let mut knight = unit(vec![]);
        let first = knight.add_status(status("Rage", StatusDuration::Infinite, 3, StatusFlags::empty()));
        assert_eq!(first.outcome, ApplyOutcome::Inserted);
        assert_eq!(first.expires_in, None);

        let second = knight.add_status(status("Rage", StatusDuration::Infinite, 2, StatusFlags::empty()));
        assert_eq!(second.outcome, ApplyOutcome::Stacked);
        assert_eq!(second.expires_in, None);
        assert_eq!(knight.status("Rage").unwrap().stacks(), 5);
        assert_eq!(knight.statuses().count(), 1);
    }

    #[test]
    fn timed_merge_sums_durations() {
        let mut knight = unit(vec![]);
        knight.add_status(status("Guard", StatusDuration::Finite(2000), 1, StatusFlags::empty()));
        let change =
            knight.add_status(status("Guard", StatusDuration::Finite(3000), 1, StatusFlags::empty()));

        assert_eq!(change.outcome, ApplyOutcome::Extended);
        assert_eq!(change.expires_in, Some(5000));
        assert_eq!(
            knight.status("Guard").unwrap().duration(),
            StatusDuration::Finite(5000)
        );
    }

    #[test]
    fn mixed_kinds_under_one_name_conflict() {
        let mut knight = unit(vec![]);
        knight.add_status(status("Mark", StatusDuration::Finite(2000), 1, StatusFlags::empty()));
        let change = knight.add_status(status("Mark", StatusDuration::Infinite, 1, StatusFlags::empty()));

        assert_eq!(change.outcome, ApplyOutcome::Conflict);
        assert_eq!(
            knight.status("Mark").unwrap().duration(),
            StatusDuration::Finite(2000)
        );
    }

    #[test]
    fn instant_status_is_not_stored() {
        let mut knight = unit(vec![]);
        let change = knight.add_status(status("Jolt", StatusDuration::Instant, 2, StatusFlags::STUNNING));
        assert_eq!(change.outcome, ApplyOutcome::Fired);
        assert!(!knight.has_status("Jolt"));
        assert!(!knight.is_stunned());
    }

    #[test]
    fn apply_guard_veto_is_a_no_op() {
        let mut knight = unit(vec![]);
        let warded = Status::new(StatusSpec {
            apply_guard: Guard::HasStatus("Wet".into()),
            ..StatusSpec::new("Frozen", "Iced over", StatusDuration::Finite(500))
        })
        .unwrap();

        assert_eq!(knight.add_status(warded.clone()).outcome, ApplyOutcome::Vetoed);
        assert!(!knight.has_status("Frozen"));

        knight.add_status(status("Wet", StatusDuration::Infinite, 1, StatusFlags::empty()));
        assert_eq!(knight.add_status(warded).outcome, ApplyOutcome::Inserted);
    }

    #[test]
    fn stun_shifts_cooldowns_by_longest_stun_only() {
        let mut knight = unit(vec![skill("Slash", Cooldown::Every(1000)), skill("Pre", Cooldown::PreBattle)]);

        let first = knight.add_status(stun(500));
        assert_eq!(first.stun_shift, 500);
        assert_eq!(knight.skills()[0].remaining(), 1500);
        assert_eq!(knight.skills()[1].remaining(), 0);

        let daze = status("Daze", StatusDuration::Finite(300), 1, StatusFlags::STUNNING);
        assert_eq!(knight.add_status(daze).stun_shift, 0);
        assert_eq!(knight.skills()[0].remaining(), 1500);

        let again = knight.add_status(stun(200));
        assert_eq!(again.stun_shift, 200);
        assert_eq!(knight.skills()[0].remaining(), 1700);
    }

    #[test]
    fn removing_a_stun_shifts_back() {
        let mut knight = unit(vec![skill("Slash", Cooldown::Every(1000))]);
        knight.add_status(stun(800));
        knight.update(Tick(300));
        assert_eq!(knight.skills()[0].remaining(), 1500);

        let Removal::Removed { stun_shift, .. } = knight.remove_status("Stun") else {
            panic!("stun should be removable");
        };
        assert_eq!(stun_shift, -500);
        assert_eq!(knight.skills()[0].remaining(), 1000);
        assert!(!knight.is_stunned());
    }

    #[test]
    fn stunned_units_offer_no_skill() {
        let mut knight = unit(vec![skill("Slash", Cooldown::Every(100))]);
        knight.update(Tick(100));
        assert_eq!(knight.next_ready_skill(), Some(0));

        knight.add_status(stun(50));
        assert_eq!(knight.next_ready_skill(), None);

        knight.update(Tick(150));
        assert!(!knight.is_stunned());
        assert_eq!(knight.next_ready_skill(), Some(0));
    }

    #[test]
    fn indefinite_stun_freezes_cooldowns() {
        let mut knight = unit(vec![skill("Slash", Cooldown::Every(1000))]);
        knight.add_status(status("Petrified", StatusDuration::Infinite, 1, StatusFlags::STUNNING));
        knight.update(Tick(600));
        assert_eq!(knight.skills()[0].remaining(), 1000);

        knight.remove_status("Petrified");
        knight.update(Tick(900));
        assert_eq!(knight.skills()[0].remaining(), 700);
    }

    fn petrified() -> Status {
        status("Petrified", StatusDuration::Infinite, 1, StatusFlags::STUNNING)
    }

    #[test]
    fn finite_stun_under_a_freeze_is_charged_once() {
        let mut knight = unit(vec![skill("Slash", Cooldown::Every(1000))]);
        knight.add_status(petrified());
        knight.add_status(stun(500));
        assert_eq!(knight.skills()[0].remaining(), 1500);

        knight.update(Tick(1000));
        assert!(!knight.has_status("Stun"));
        knight.remove_status("Petrified");
        assert_eq!(knight.skills()[0].remaining(), 1000);
    }

    #[test]
    fn freeze_over_a_running_finite_stun_is_charged_once() {
        let mut knight = unit(vec![skill("Slash", Cooldown::Every(1000))]);
        knight.add_status(stun(500));
        knight.update(Tick(200));
        assert_eq!(knight.skills()[0].remaining(), 1300);

        knight.add_status(petrified());
        knight.update(Tick(1000));
        knight.remove_status("Petrified");
        assert_eq!(knight.skills()[0].remaining(), 1000);

        knight.update(Tick(1400));
        assert_eq!(knight.skills()[0].remaining(), 600);
    }

    #[test]
    fn expiry_respects_remove_guard() {
        let mut knight = unit(vec![]);
        let clingy = Status::new(StatusSpec {
            remove_guard: Guard::LacksStatus("Anchor".into()),
            ..StatusSpec::new("Curse", "Hard to shake", StatusDuration::Finite(100))
        })
        .unwrap();
        knight.add_status(status("Anchor", StatusDuration::Finite(200), 1, StatusFlags::empty()));
        knight.add_status(clingy);

        let expired = knight.update(Tick(150));
        assert!(expired.is_empty());
        assert!(knight.status("Curse").unwrap().is_expiring());

        // Anchor expires first (name order), which releases Curse in the same pass.
        let expired = knight.update(Tick(200));
        let names: Vec<_> = expired.iter().map(Status::name).collect();
        assert_eq!(names, vec!["Anchor", "Curse"]);
        assert_eq!(knight.statuses().count(), 0);
    }

    #[test]
    fn duplicate_skill_names_are_rejected() {
        let err = Unit::new(UnitSpec::new(
            "Twin",
            0,
            vec![skill("Slash", Cooldown::Every(10)), skill("Slash", Cooldown::Every(20))],
        ))
        .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_DUPLICATE_SKILL");
    }
}
