//! Combat loop: one scheduler item per step.

use crate::action::{Phase, Resolution};
use crate::state::{TeamId, Tick, UnitId};

use super::battlefield::Battlefield;
use super::events::{ActionReport, BattleSink};
use super::turns::{TurnItem, TurnKind};

/// What a single [`Battlefield::next_turn`] step did.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// A skill went through.
    Acted {
        unit: UnitId,
        skill: String,
        resolution: Resolution,
    },
    /// The ready skill failed; the unit retries later.
    Failed { unit: UnitId, skill: String },
    /// Nothing was ready; the unit waits for its next cooldown.
    Waited { unit: UnitId, until: Tick },
    /// The unit cannot act for now and holds no entry.
    Parked { unit: UnitId },
    /// A status expiry was processed.
    Expired { unit: UnitId, status: String },
    /// A team has been wiped out.
    Complete { winner: Option<TeamId> },
    /// Nothing is left to happen.
    Exhausted,
}

impl TurnOutcome {
    /// The battle will not progress any further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Exhausted)
    }
}

impl Battlefield {
    /// True when every unit of at least one team is defeated.
    pub fn is_battle_complete(&self) -> bool {
        self.teams()
            .into_iter()
            .any(|team| self.members(team).all(|id| self.is_defeated(id)))
    }

    /// The only team with living units, once the battle is complete.
    pub fn winner(&self) -> Option<TeamId> {
        if !self.is_battle_complete() {
            return None;
        }
        let mut standing = self
            .teams()
            .into_iter()
            .filter(|team| self.members(*team).any(|id| !self.is_defeated(id)));
        match (standing.next(), standing.next()) {
            (Some(team), None) => Some(team),
            _ => None,
        }
    }

    /// Runs one step of the combat loop.
    pub fn next_turn<S: BattleSink + ?Sized>(&mut self, sink: &mut S) -> TurnOutcome {
        if self.is_battle_complete() {
            let winner = self.winner();
            self.finish(sink, winner);
            return TurnOutcome::Complete { winner };
        }
        if self.finished {
            return TurnOutcome::Exhausted;
        }

        self.turns += 1;
        let Some(item) = self.advance() else {
            self.finish(sink, None);
            return TurnOutcome::Exhausted;
        };

        let outcome = match item.kind {
            TurnKind::Act => self.act(item.unit, sink),
            TurnKind::Expire(status) => {
                tracing::debug!(unit = %item.unit, %status, at = %item.due, "expiry");
                self.stall.failures = 0;
                self.rearm_parked();
                TurnOutcome::Expired {
                    unit: item.unit,
                    status,
                }
            }
        };
        self.flush(sink);
        outcome
    }

    /// Steps until the battle is over or `max_turns` is reached.
    pub fn run<S: BattleSink + ?Sized>(&mut self, sink: &mut S) -> Option<TeamId> {
        loop {
            if self.turns >= self.config.max_turns {
                tracing::warn!(turns = self.turns, "turn limit reached");
                self.finish(sink, None);
                return None;
            }
            match self.next_turn(sink) {
                TurnOutcome::Complete { winner } => return winner,
                TurnOutcome::Exhausted => return None,
                _ => {}
            }
        }
    }

    fn is_defeated(&self, id: UnitId) -> bool {
        self.unit(id).is_none_or(|unit| unit.is_defeated())
    }

    /// Pops the next item, bringing every unit up to the new clock first.
    fn advance(&mut self) -> Option<TurnItem> {
        loop {
            let mut expired = Vec::new();
            let units = &mut self.units;
            let item = self.scheduler.advance(|id, now| {
                if let Some(unit) = units.get_mut(&id) {
                    for status in unit.update(now) {
                        expired.push((id, status));
                    }
                }
            })?;

            for (id, status) in expired {
                self.after_removal(id, &status, 0);
            }

            if self.units.contains_key(&item.unit) {
                tracing::debug!(unit = %item.unit, kind = ?item.kind, at = %item.due, "turn item");
                return Some(item);
            }
        }
    }

    fn act<S: BattleSink + ?Sized>(&mut self, id: UnitId, sink: &mut S) -> TurnOutcome {
        let now = self.clock();
        let Some(unit) = self.unit(id) else {
            return TurnOutcome::Parked { unit: id };
        };
        if unit.is_defeated() || unit.is_stunned_indefinitely() {
            self.park(id);
            return TurnOutcome::Parked { unit: id };
        }

        let Some(index) = unit.next_ready_skill() else {
            self.arm(id);
            return match self.scheduler.items_of(id).find(|i| i.kind == TurnKind::Act) {
                Some(item) => TurnOutcome::Waited {
                    unit: id,
                    until: item.due,
                },
                None => TurnOutcome::Parked { unit: id },
            };
        };
        let skill = unit.skills()[index].clone();

        let (resolution, touched) = self.resolve_skill_touching(id, &skill, Phase::Combat);
        if !resolution.succeeded() {
            self.retry_later(id, now);
            return TurnOutcome::Failed {
                unit: id,
                skill: skill.name().to_string(),
            };
        }

        self.stall.failures = 0;
        if let Some(unit) = self.units.get_mut(&id) {
            unit.skills_mut()[index].rearm();
        }
        if touched.contains(&id) {
            self.arm_at(id, now);
        } else {
            self.arm(id);
        }
        self.rearm_parked();

        let report = ActionReport {
            actor: id,
            skill: skill.name().to_string(),
            resolution: resolution.clone(),
            snapshot: self.snapshot(),
        };
        self.flush(sink);
        sink.on_action(&report);

        TurnOutcome::Acted {
            unit: id,
            skill: skill.name().to_string(),
            resolution,
        }
    }

    /// Reschedules a unit whose ready skill failed.
    ///
    /// Normally the unit goes behind the next queued item. Once every
    /// scheduled unit has failed at this clock value, it skips to the next
    /// later time instead, or is parked when there is none.
    fn retry_later(&mut self, id: UnitId, now: Tick) {
        if self.stall.at == now {
            self.stall.failures += 1;
        } else {
            self.stall.at = now;
            self.stall.failures = 1;
        }

        let scheduled = self
            .units
            .keys()
            .filter(|other| self.scheduler.has_action(**other))
            .count()
            + 1;
        let due = if self.stall.failures >= scheduled {
            self.scheduler.next_due_after(now)
        } else {
            self.scheduler.peek_due()
        };

        match due {
            Some(due) => self.scheduler.schedule(id, due, true),
            None => {
                tracing::debug!(unit = %id, %now, "nothing left to wait for, parking");
                self.park(id);
            }
        }
    }

    fn flush<S: BattleSink + ?Sized>(&mut self, sink: &mut S) {
        for event in std::mem::take(&mut self.events) {
            sink.on_event(&event);
        }
    }

    fn finish<S: BattleSink + ?Sized>(&mut self, sink: &mut S, winner: Option<TeamId>) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.flush(sink);
        tracing::info!(winner = ?winner, clock = %self.clock(), turns = self.turns, "battle over");
        sink.on_battle_end(winner);
    }
}
