//! Skill actions: target selection and the recursive execution protocol.
//!
//! # Module Structure
//!
//! - `targeting`: target modes and the pure candidate resolver
//! - `execute`: skill execution on a [`crate::engine::Battlefield`]

pub mod execute;
pub mod targeting;

pub use execute::{Phase, Resolution};
pub use targeting::{Candidate, TargetMode, resolve_targets, select_close};
