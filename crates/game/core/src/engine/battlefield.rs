//! The battlefield: unit arena, placement and status bookkeeping.
//!
//! Units live in an arena keyed by [`UnitId`]. Every status change that has
//! scheduler consequences (expiry registration, stun shifts, defeat) goes
//! through this type so that the unit and its scheduled items never disagree.

use std::collections::{BTreeMap, BTreeSet};

use crate::action::Phase;
use crate::config::BattleConfig;
use crate::env::{PcgRng, RngOracle, RollContext, compute_seed};
use crate::error::ConfigError;
use crate::state::{
    ApplyOutcome, Reaction, Removal, Status, StatusEvent, TeamId, Tick, Unit, UnitId,
};

use super::events::{BattleEvent, BattleSnapshot, UnitSnapshot};
use super::placement::{Location, Point};
use super::turns::TurnScheduler;

/// Consecutive failed actions observed at one clock value.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Stall {
    pub(crate) at: Tick,
    pub(crate) failures: usize,
}

pub struct Battlefield {
    pub(crate) config: BattleConfig,
    rng: Box<dyn RngOracle>,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    locations: BTreeMap<UnitId, Location>,
    /// Next free slot per (team, row).
    slots: BTreeMap<(TeamId, u8), u32>,
    /// Every team that has been placed; fixes each team's spoke.
    placed_teams: BTreeSet<TeamId>,
    pub(crate) scheduler: TurnScheduler,
    next_id: u32,
    pub(crate) events: Vec<BattleEvent>,
    /// Living units that currently have no action entry.
    pub(crate) parked: BTreeSet<UnitId>,
    pub(crate) stall: Stall,
    pub(crate) turns: u64,
    pub(crate) finished: bool,
}

impl std::fmt::Debug for Battlefield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battlefield")
            .field("clock", &self.scheduler.clock())
            .field("units", &self.units.len())
            .field("pending", &self.scheduler.len())
            .field("parked", &self.parked)
            .field("turns", &self.turns)
            .finish_non_exhaustive()
    }
}

impl Battlefield {
    /// Creates an empty battlefield using the seeded PCG oracle.
    pub fn new(config: BattleConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, PcgRng)
    }

    /// Creates an empty battlefield with a custom random source.
    pub fn with_rng(config: BattleConfig, rng: impl RngOracle + 'static) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: Box::new(rng),
            units: BTreeMap::new(),
            locations: BTreeMap::new(),
            slots: BTreeMap::new(),
            placed_teams: BTreeSet::new(),
            scheduler: TurnScheduler::new(),
            next_id: 0,
            events: Vec::new(),
            parked: BTreeSet::new(),
            stall: Stall::default(),
            turns: 0,
            finished: false,
        })
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Places `unit` on `team` and gets it ready to fight.
    ///
    /// The unit takes the next free slot of its row, runs its pre-battle
    /// skills once, and is scheduled for its first action after its shortest
    /// cooldown plus a random stagger.
    pub fn add_unit(&mut self, mut unit: Unit, team: TeamId) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;

        let jitter = self.roll_jitter(id);
        self.placed_teams.insert(team);
        let slot = self.slots.entry((team, unit.row())).or_insert(0);
        let location = Location {
            team,
            row: unit.row(),
            slot: *slot,
            jitter,
        };
        *slot += 1;

        let now = self.scheduler.clock();
        unit.set_last_sync(now);
        tracing::debug!(%id, name = unit.name(), %team, row = unit.row(), slot = location.slot, "unit joined");

        let pre_battle: Vec<_> = unit
            .skills()
            .iter()
            .filter(|s| s.is_pre_battle())
            .cloned()
            .collect();

        self.units.insert(id, unit);
        self.locations.insert(id, location);
        self.scheduler.subscribe(id);
        self.events.push(BattleEvent::Joined { unit: id, team });

        for skill in &pre_battle {
            self.resolve_skill(id, skill, Phase::PreBattle);
        }

        let stagger = self.roll_stagger(id);
        if let Some(unit) = self.units.get_mut(&id) {
            for skill in unit.skills_mut() {
                skill.shift(stagger);
            }
        }

        self.arm(id);
        id
    }

    /// Takes a unit off the battlefield, dropping all its scheduled items.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        self.locations.remove(&id);
        self.parked.remove(&id);
        self.scheduler.unsubscribe(id);
        let dropped = self.scheduler.remove_unit(id);
        self.events.push(BattleEvent::Left { unit: id });
        tracing::debug!(%id, name = unit.name(), dropped, "unit left");
        Some(unit)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Current battle time.
    pub fn clock(&self) -> Tick {
        self.scheduler.clock()
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    /// Units in id (arrival) order.
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.units.iter().map(|(id, unit)| (*id, unit))
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn team(&self, id: UnitId) -> Option<TeamId> {
        self.locations.get(&id).map(|loc| loc.team)
    }

    pub fn location(&self, id: UnitId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Teams with at least one unit, in id order.
    pub fn teams(&self) -> Vec<TeamId> {
        self.locations
            .values()
            .map(|loc| loc.team)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn members(&self, team: TeamId) -> impl Iterator<Item = UnitId> + '_ {
        self.locations
            .iter()
            .filter(move |(_, loc)| loc.team == team)
            .map(|(id, _)| *id)
    }

    /// Exact coordinate used for distance rules.
    pub fn base_coordinates(&self, id: UnitId) -> Option<Point> {
        let loc = self.locations.get(&id)?;
        let (index, count) = self.spoke(loc.team);
        Some(loc.base(index, count))
    }

    /// Jittered coordinate for presentation.
    pub fn coordinates(&self, id: UnitId) -> Option<Point> {
        let loc = self.locations.get(&id)?;
        let (index, count) = self.spoke(loc.team);
        Some(loc.display(index, count))
    }

    pub fn distance(&self, a: UnitId, b: UnitId) -> Option<f64> {
        Some(self.base_coordinates(a)?.distance(self.base_coordinates(b)?))
    }

    pub fn display_distance(&self, a: UnitId, b: UnitId) -> Option<f64> {
        Some(self.coordinates(a)?.distance(self.coordinates(b)?))
    }

    /// Unit is living but has no action entry.
    pub fn is_parked(&self, id: UnitId) -> bool {
        self.parked.contains(&id)
    }

    /// Combat-loop steps taken so far.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Every unit with its visible statuses.
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            clock: self.clock(),
            units: self
                .units
                .iter()
                .filter_map(|(id, unit)| {
                    Some(UnitSnapshot::capture(
                        *id,
                        unit,
                        self.team(*id)?,
                        self.coordinates(*id)?,
                    ))
                })
                .collect(),
        }
    }

    // ========================================================================
    // Status changes
    // ========================================================================

    /// Applies a copy of `status` to `target`, with scheduler bookkeeping and
    /// trigger reactions. Returns `None` if the target is not on the field.
    pub fn apply_status(&mut self, target: UnitId, status: Status) -> Option<ApplyOutcome> {
        let outcome = self.apply_status_at(target, status, 0);
        self.rearm_parked();
        outcome
    }

    /// Removes `name` from `target` if its remove-guard allows it.
    pub fn remove_status(&mut self, target: UnitId, name: &str) -> bool {
        let removed = self.remove_status_at(target, name, 0);
        self.rearm_parked();
        removed
    }

    pub(crate) fn apply_status_at(
        &mut self,
        target: UnitId,
        status: Status,
        depth: u8,
    ) -> Option<ApplyOutcome> {
        let now = self.scheduler.clock();
        let unit = self.units.get_mut(&target)?;

        let name = status.name().to_string();
        let stacks = status.stacks();
        let hidden = status.is_hidden();
        let reactions: Vec<Reaction> = status.reactions(StatusEvent::Applied).cloned().collect();
        let was_defeated = unit.is_defeated();

        let change = unit.add_status(status);
        let defeated_now = !was_defeated && unit.is_defeated();
        tracing::debug!(unit = %target, status = %name, outcome = %change.outcome, "status applied");
        if !change.outcome.is_applied() {
            return Some(change.outcome);
        }

        if let Some(remaining) = change.expires_in {
            self.scheduler.set_expiry(target, &name, now + remaining);
        }
        self.scheduler.shift_unit(target, change.stun_shift);
        if !hidden {
            self.events.push(BattleEvent::StatusApplied {
                unit: target,
                status: name,
                outcome: change.outcome,
            });
        }
        if defeated_now {
            self.on_defeat(target);
        }

        let repeats = if change.outcome == ApplyOutcome::Fired { stacks } else { 1 };
        for _ in 0..repeats {
            self.react(target, &reactions, depth);
        }
        Some(change.outcome)
    }

    pub(crate) fn remove_status_at(&mut self, target: UnitId, name: &str, depth: u8) -> bool {
        let Some(unit) = self.units.get_mut(&target) else {
            return false;
        };
        match unit.remove_status(name) {
            Removal::Removed { status, stun_shift } => {
                self.scheduler.cancel_expiry(target, name);
                self.scheduler.shift_unit(target, stun_shift);
                self.after_removal(target, &status, depth);
                true
            }
            Removal::Vetoed => {
                tracing::debug!(unit = %target, status = name, "removal vetoed");
                false
            }
            Removal::Absent => false,
        }
    }

    /// Bookkeeping shared by forced removal and expiry.
    pub(crate) fn after_removal(&mut self, target: UnitId, status: &Status, depth: u8) {
        tracing::debug!(unit = %target, status = status.name(), "status removed");
        if !status.is_hidden() {
            self.events.push(BattleEvent::StatusRemoved {
                unit: target,
                status: status.name().to_string(),
            });
        }
        let reactions: Vec<Reaction> = status.reactions(StatusEvent::Removed).cloned().collect();
        self.react(target, &reactions, depth);
    }

    fn react(&mut self, owner: UnitId, reactions: &[Reaction], depth: u8) {
        if reactions.is_empty() {
            return;
        }
        if depth >= self.config.reaction_depth {
            tracing::warn!(unit = %owner, depth, "status reactions nested too deep, skipping");
            return;
        }
        for reaction in reactions {
            match reaction {
                Reaction::Apply(status) => {
                    self.apply_status_at(owner, (**status).clone(), depth + 1);
                }
                Reaction::Remove(name) => {
                    self.remove_status_at(owner, name, depth + 1);
                }
            }
        }
    }

    fn on_defeat(&mut self, id: UnitId) {
        tracing::debug!(unit = %id, "unit defeated");
        self.events.push(BattleEvent::Defeated { unit: id });
        if self.units.get(&id).is_some_and(Unit::has_timed_skills) {
            self.park(id);
        }
    }

    // ========================================================================
    // Scheduling helpers
    // ========================================================================

    /// Whether `id` may hold an action entry right now.
    fn can_act(&self, id: UnitId) -> bool {
        self.units.get(&id).is_some_and(|unit| {
            unit.has_timed_skills() && !unit.is_defeated() && !unit.is_stunned_indefinitely()
        })
    }

    /// Schedules the unit's next action at `due`, or parks it if it cannot act.
    pub(crate) fn arm_at(&mut self, id: UnitId, due: Tick) {
        if !self.units.contains_key(&id) || self.scheduler.has_action(id) {
            return;
        }
        if self.can_act(id) {
            self.parked.remove(&id);
            self.scheduler.schedule(id, due, true);
        } else if self.units.get(&id).is_some_and(Unit::has_timed_skills) {
            self.parked.insert(id);
        }
    }

    /// Schedules the unit for when its earliest skill comes off cooldown.
    pub(crate) fn arm(&mut self, id: UnitId) {
        let now = self.scheduler.clock();
        let wait = self.units.get(&id).map_or(0, |unit| {
            unit.next_ready_in()
                .unwrap_or(0)
                .max(unit.stun_duration())
        });
        self.arm_at(id, now + wait);
    }

    pub(crate) fn park(&mut self, id: UnitId) {
        self.scheduler.cancel_actions(id);
        self.parked.insert(id);
    }

    /// Gives every parked unit that can act again a fresh entry.
    pub(crate) fn rearm_parked(&mut self) {
        let ready: Vec<UnitId> = self
            .parked
            .iter()
            .copied()
            .filter(|id| self.can_act(*id))
            .collect();
        for id in ready {
            self.parked.remove(&id);
            self.arm(id);
        }
    }

    // ========================================================================
    // Randomness
    // ========================================================================

    fn roll_jitter(&self, id: UnitId) -> Point {
        let magnitude = self.config.placement_jitter;
        if magnitude <= 0.0 {
            return Point::ORIGIN;
        }
        let seed = |context| compute_seed(self.config.seed, u64::from(id.0), id.0, context);
        Point::new(
            self.rng.symmetric(seed(RollContext::JitterX), magnitude),
            self.rng.symmetric(seed(RollContext::JitterY), magnitude),
        )
    }

    fn roll_stagger(&self, id: UnitId) -> i64 {
        let seed = compute_seed(self.config.seed, u64::from(id.0), id.0, RollContext::Stagger);
        let stagger = self.rng.up_to(seed, self.config.stagger_max);
        i64::try_from(stagger).unwrap_or(i64::MAX)
    }

    /// Index of `team` among placed teams, and the number of placed teams.
    ///
    /// Teams keep their spoke after their last unit leaves.
    fn spoke(&self, team: TeamId) -> (usize, usize) {
        let index = self
            .placed_teams
            .iter()
            .position(|t| *t == team)
            .unwrap_or(0);
        (index, self.placed_teams.len())
    }
}
