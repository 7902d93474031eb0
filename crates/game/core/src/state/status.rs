//! Status effect system for units.
//!
//! Statuses are named effects carried by a unit. They are either:
//! - **Instant** (duration 0): fire their `Applied` reactions and are discarded
//! - **Finite** (duration > 0): tick down with the battle clock and expire at zero
//! - **Infinite** (duration < 0 in content terms): persist until removed
//!
//! Instant and infinite statuses are *stackable*: re-applying one adds stacks.
//! Finite statuses never stack; re-applying one adds the durations instead.

use bitflags::bitflags;

use crate::error::{ConfigError, TemplateKind, require_text};

use super::guard::Guard;

bitflags! {
    /// Behavioural flags of a status.
    ///
    /// Stackability is not a flag: it follows from the duration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct StatusFlags: u8 {
        /// The carrier cannot act while this status has time left.
        const STUNNING  = 1 << 0;
        /// The carrier is out of the fight while it holds this status.
        const DEFEATING = 1 << 1;
        /// Not shown in presentation snapshots.
        const HIDDEN    = 1 << 2;
    }
}

/// How long a status lasts, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusDuration {
    /// Takes effect once and is never stored.
    Instant,
    /// Remaining milliseconds.
    Finite(u64),
    /// Lasts until removed.
    Infinite,
}

impl StatusDuration {
    /// Converts the signed content encoding (0 instant, >0 finite, <0 infinite).
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            0 => Self::Instant,
            m if m > 0 => Self::Finite(m.unsigned_abs()),
            _ => Self::Infinite,
        }
    }

    pub fn is_instant(self) -> bool {
        matches!(self, Self::Instant)
    }

    /// Instant and infinite durations carry stacks instead of time.
    pub fn is_stackable(self) -> bool {
        matches!(self, Self::Instant | Self::Infinite)
    }

    /// Duration is non-zero: infinite, or finite with time left.
    pub fn is_active(self) -> bool {
        match self {
            Self::Instant => false,
            Self::Finite(ms) => ms > 0,
            Self::Infinite => true,
        }
    }

    pub fn finite(self) -> Option<u64> {
        match self {
            Self::Finite(ms) => Some(ms),
            _ => None,
        }
    }
}

/// Lifecycle point at which a status trigger fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusEvent {
    /// After the status was applied (inserted, stacked, extended or fired instantly).
    Applied,
    /// After the status left its carrier, by expiry or by removal.
    Removed,
}

/// What a trigger does to the status carrier.
#[derive(Clone, Debug)]
pub enum Reaction {
    /// Apply a fresh copy of the status.
    Apply(Box<Status>),
    /// Remove the named status (subject to its remove-guard).
    Remove(String),
}

/// Listener attached to a status.
#[derive(Clone, Debug)]
pub struct StatusTrigger {
    pub on: StatusEvent,
    pub reaction: Reaction,
}

/// Validated construction record for [`Status`].
#[derive(Clone, Debug)]
pub struct StatusSpec {
    pub name: String,
    pub description: String,
    pub duration: StatusDuration,
    pub stacks: u32,
    pub flags: StatusFlags,
    pub apply_guard: Guard,
    pub remove_guard: Guard,
    pub triggers: Vec<StatusTrigger>,
}

impl StatusSpec {
    pub const DEFAULT_STACKS: u32 = 1;

    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        duration: StatusDuration,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            duration,
            stacks: Self::DEFAULT_STACKS,
            flags: StatusFlags::empty(),
            apply_guard: Guard::Always,
            remove_guard: Guard::Always,
            triggers: Vec::new(),
        }
    }
}

/// A status instance (or a template to copy from).
#[derive(Clone, Debug)]
pub struct Status {
    name: String,
    description: String,
    duration: StatusDuration,
    stacks: u32,
    flags: StatusFlags,
    apply_guard: Guard,
    remove_guard: Guard,
    triggers: Vec<StatusTrigger>,
}

impl Status {
    /// Builds a status, enforcing the stack/duration contract.
    pub fn new(spec: StatusSpec) -> Result<Self, ConfigError> {
        require_text(TemplateKind::Status, &spec.name, &spec.description)?;
        if spec.stacks == 0 {
            return Err(ConfigError::ZeroStacks { name: spec.name });
        }
        if spec.stacks > 1 && !spec.duration.is_stackable() {
            return Err(ConfigError::StacksOnTimedStatus {
                name: spec.name,
                stacks: spec.stacks,
            });
        }

        Ok(Self {
            name: spec.name,
            description: spec.description,
            duration: spec.duration,
            stacks: spec.stacks,
            flags: spec.flags,
            apply_guard: spec.apply_guard,
            remove_guard: spec.remove_guard,
            triggers: spec.triggers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn duration(&self) -> StatusDuration {
        self.duration
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    pub fn is_stackable(&self) -> bool {
        self.duration.is_stackable()
    }

    pub fn is_stunning(&self) -> bool {
        self.flags.contains(StatusFlags::STUNNING)
    }

    pub fn is_defeating(&self) -> bool {
        self.flags.contains(StatusFlags::DEFEATING)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(StatusFlags::HIDDEN)
    }

    /// Finite status whose time has run out.
    pub fn is_expiring(&self) -> bool {
        self.duration == StatusDuration::Finite(0)
    }

    /// Stunning status that still has time left.
    pub fn stuns(&self) -> bool {
        self.is_stunning() && self.duration.is_active()
    }

    pub fn apply_guard(&self) -> &Guard {
        &self.apply_guard
    }

    pub fn remove_guard(&self) -> &Guard {
        &self.remove_guard
    }

    pub fn triggers(&self) -> &[StatusTrigger] {
        &self.triggers
    }

    /// Reactions registered for `event`, in declaration order.
    pub fn reactions(&self, event: StatusEvent) -> impl Iterator<Item = &Reaction> + '_ {
        self.triggers
            .iter()
            .filter(move |t| t.on == event)
            .map(|t| &t.reaction)
    }

    /// Both statuses merge the same way (stacks vs. time).
    pub(crate) fn merges_with(&self, other: &Status) -> bool {
        self.is_stackable() == other.is_stackable()
    }

    pub(crate) fn add_stacks(&mut self, stacks: u32) {
        self.stacks = self.stacks.saturating_add(stacks);
    }

    /// Adds time to a finite status. Returns the new remaining time.
    pub(crate) fn extend(&mut self, millis: u64) -> Option<u64> {
        match &mut self.duration {
            StatusDuration::Finite(remaining) => {
                *remaining = remaining.saturating_add(millis);
                Some(*remaining)
            }
            _ => None,
        }
    }

    /// Counts down a finite status. Other durations are unaffected.
    pub(crate) fn elapse(&mut self, millis: u64) {
        if let StatusDuration::Finite(remaining) = &mut self.duration {
            *remaining = remaining.saturating_sub(millis);
        }
    }
}
