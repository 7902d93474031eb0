//! Turn scheduling and the combat loop.
//!
//! The [`Battlefield`] owns the units, their placement and the
//! [`TurnScheduler`]. All state changes with timeline consequences flow
//! through it, and [`Battlefield::next_turn`] advances the battle one
//! scheduler item at a time, reporting to an injected [`BattleSink`].

mod battlefield;
mod combat;
mod events;
mod placement;
mod turns;

pub use battlefield::Battlefield;
pub use combat::TurnOutcome;
pub use events::{
    ActionReport, BattleEvent, BattleSink, BattleSnapshot, NullSink, RecordingSink,
    StatusSnapshot, UnitSnapshot,
};
pub use placement::{Location, Point};
pub use turns::{TurnItem, TurnKind, TurnScheduler};
