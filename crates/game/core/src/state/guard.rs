//! Predicates over a unit used to veto status application/removal and skill use.

use std::fmt;
use std::sync::Arc;

use super::unit::Unit;

/// Boxed predicate for guards that cannot be expressed as data.
#[derive(Clone)]
pub struct GuardFn(Arc<dyn Fn(&Unit) -> bool + Send + Sync>);

impl GuardFn {
    pub fn new(predicate: impl Fn(&Unit) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }
}

impl fmt::Debug for GuardFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GuardFn(..)")
    }
}

/// Condition evaluated against the unit that owns (or would own) a status or skill.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Guard {
    /// Always passes.
    #[default]
    Always,

    /// Never passes.
    Never,

    /// Unit carries the named status.
    HasStatus(String),

    /// Unit does not carry the named status.
    LacksStatus(String),

    /// Unit carries the named status with at least this many stacks.
    MinStacks { status: String, stacks: u32 },

    /// Unit is currently stunned.
    Stunned,

    /// All guards must pass.
    And(Vec<Guard>),

    /// Any guard must pass.
    Or(Vec<Guard>),

    /// Guard must fail.
    Not(Box<Guard>),

    /// Programmatic predicate.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(GuardFn),
}

impl Guard {
    pub fn custom(predicate: impl Fn(&Unit) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(GuardFn::new(predicate))
    }

    /// Evaluates the guard for `unit`.
    pub fn allows(&self, unit: &Unit) -> bool {
        match self {
            Guard::Always => true,
            Guard::Never => false,
            Guard::HasStatus(name) => unit.has_status(name),
            Guard::LacksStatus(name) => !unit.has_status(name),
            Guard::MinStacks { status, stacks } => unit
                .status(status)
                .is_some_and(|held| held.stacks() >= *stacks),
            Guard::Stunned => unit.is_stunned(),
            Guard::And(guards) => guards.iter().all(|g| g.allows(unit)),
            Guard::Or(guards) => guards.iter().any(|g| g.allows(unit)),
            Guard::Not(inner) => !inner.allows(unit),
            Guard::Custom(predicate) => (predicate.0)(unit),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Guard::Always)
    }
}
