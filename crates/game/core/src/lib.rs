//! Deterministic squad battle resolution.
//!
//! `battle-core` defines the rules of a time-based battle between squads of
//! units: statuses with stacking and stun semantics, skills with recursive
//! sub-skill chains, closeness targeting, and a discrete-event scheduler that
//! decides who acts next. All state mutation flows through
//! [`engine::Battlefield`]; content loading and presentation live in other
//! crates and talk to the core through the types re-exported here.
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{Phase, Resolution, TargetMode, resolve_targets, select_close};
pub use config::BattleConfig;
pub use engine::{
    ActionReport, BattleEvent, BattleSink, BattleSnapshot, Battlefield, Location, NullSink, Point,
    RecordingSink, StatusSnapshot, TurnItem, TurnKind, TurnOutcome, TurnScheduler, UnitSnapshot,
};
pub use env::{FixedRng, PcgRng, RngOracle};
pub use error::{ConfigError, TemplateKind};
pub use state::{
    ApplyOutcome, Cooldown, Guard, GuardFn, Reaction, Removal, Skill, SkillSpec, Status,
    StatusChange, StatusDuration, StatusEvent, StatusFlags, StatusSpec, StatusTrigger, TeamId,
    Tick, Unit, UnitId, UnitSpec,
};
