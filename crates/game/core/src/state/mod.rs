//! Battle state value types: units and the skills and statuses they own.
//!
//! Everything here is plain data with local invariants. Nothing in this module
//! touches the scheduler or other units; see [`crate::engine`] for that.

mod common;
mod guard;
mod skill;
mod status;
mod unit;

pub use common::{TeamId, Tick, UnitId};
pub use guard::{Guard, GuardFn};
pub use skill::{Cooldown, Skill, SkillSpec};
pub use status::{
    Reaction, Status, StatusDuration, StatusEvent, StatusFlags, StatusSpec, StatusTrigger,
};
pub use unit::{ApplyOutcome, Removal, StatusChange, Unit, UnitSpec};
