//! Status catalog loader.

use std::path::Path;

use battle_core::{Guard, StatusEvent, StatusFlags, StatusSpec};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron};

/// What a trigger does, referring to other statuses by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionDef {
    Apply(String),
    Remove(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDef {
    pub on: StatusEvent,
    pub reaction: ReactionDef,
}

/// A status as authored.
///
/// `duration` uses signed milliseconds: 0 instant, positive finite, negative
/// infinite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDef {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default = "default_stacks")]
    pub stacks: u32,
    #[serde(default)]
    pub flags: StatusFlags,
    #[serde(default)]
    pub apply_guard: Guard,
    #[serde(default)]
    pub remove_guard: Guard,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
}

fn default_stacks() -> u32 {
    StatusSpec::DEFAULT_STACKS
}

/// Status catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCatalog {
    pub statuses: Vec<StatusDef>,
}

/// Loader for the status catalog from RON files.
pub struct StatusLoader;

impl StatusLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<StatusDef>> {
        let catalog: StatusCatalog = parse_ron(path)?;
        Ok(catalog.statuses)
    }
}
