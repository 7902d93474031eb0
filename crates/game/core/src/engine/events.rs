//! Presentation boundary: what the battlefield tells the outside world.
//!
//! The combat loop reports through an injected [`BattleSink`]. Snapshots only
//! carry visible statuses; hidden ones are bookkeeping.

use crate::action::Resolution;
use crate::state::{ApplyOutcome, StatusDuration, TeamId, Tick, Unit, UnitId};

use super::placement::Point;

/// State changes worth showing, buffered between sink calls.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    Joined {
        unit: UnitId,
        team: TeamId,
    },
    Left {
        unit: UnitId,
    },
    StatusApplied {
        unit: UnitId,
        status: String,
        outcome: ApplyOutcome,
    },
    StatusRemoved {
        unit: UnitId,
        status: String,
    },
    Defeated {
        unit: UnitId,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSnapshot {
    pub name: String,
    pub stacks: u32,
    pub duration: StatusDuration,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub name: String,
    pub team: TeamId,
    pub position: Point,
    pub defeated: bool,
    pub stunned: bool,
    /// Visible statuses, ordered by name.
    pub statuses: Vec<StatusSnapshot>,
}

impl UnitSnapshot {
    pub(crate) fn capture(id: UnitId, unit: &Unit, team: TeamId, position: Point) -> Self {
        Self {
            id,
            name: unit.name().to_string(),
            team,
            position,
            defeated: unit.is_defeated(),
            stunned: unit.is_stunned(),
            statuses: unit
                .statuses()
                .filter(|s| !s.is_hidden())
                .map(|s| StatusSnapshot {
                    name: s.name().to_string(),
                    stacks: s.stacks(),
                    duration: s.duration(),
                })
                .collect(),
        }
    }
}

/// Every unit on the field at one instant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSnapshot {
    pub clock: Tick,
    pub units: Vec<UnitSnapshot>,
}

impl BattleSnapshot {
    pub fn unit(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.id == id)
    }
}

/// One successful skill use.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionReport {
    pub actor: UnitId,
    pub skill: String,
    pub resolution: Resolution,
    pub snapshot: BattleSnapshot,
}

impl ActionReport {
    pub fn actor_name(&self) -> &str {
        self.snapshot
            .unit(self.actor)
            .map_or("?", |u| u.name.as_str())
    }
}

/// Receiver of battle progress.
pub trait BattleSink {
    /// Called after every successful skill use.
    fn on_action(&mut self, report: &ActionReport);

    /// Called for buffered state changes, before the report that caused them.
    fn on_event(&mut self, _event: &BattleEvent) {}

    /// Called exactly once when the battle is over.
    fn on_battle_end(&mut self, winner: Option<TeamId>);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl BattleSink for NullSink {
    fn on_action(&mut self, _report: &ActionReport) {}

    fn on_battle_end(&mut self, _winner: Option<TeamId>) {}
}

/// Sink that keeps everything, for tests and replays.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub actions: Vec<ActionReport>,
    pub events: Vec<BattleEvent>,
    /// One entry per `on_battle_end` call.
    pub endings: Vec<Option<TeamId>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skill names in the order they were used, paired with their user.
    pub fn skill_log(&self) -> Vec<(UnitId, &str)> {
        self.actions
            .iter()
            .map(|r| (r.actor, r.skill.as_str()))
            .collect()
    }
}

impl BattleSink for RecordingSink {
    fn on_action(&mut self, report: &ActionReport) {
        self.actions.push(report.clone());
    }

    fn on_event(&mut self, event: &BattleEvent) {
        self.events.push(event.clone());
    }

    fn on_battle_end(&mut self, winner: Option<TeamId>) {
        self.endings.push(winner);
    }
}
