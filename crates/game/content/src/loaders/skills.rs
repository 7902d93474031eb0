//! Skill catalog loader.

use std::path::Path;

use battle_core::{Guard, TargetMode};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron};

/// A skill as authored. Effects and sub-skills are referred to by name.
///
/// `cooldown` uses signed milliseconds: negative pre-battle, 0 instant
/// (sub-skills only), positive timed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDef {
    pub name: String,
    pub description: String,
    pub target: TargetMode,
    pub cooldown: i64,
    #[serde(default)]
    pub guard: Guard,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub sub_skills: Vec<String>,
}

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillDef>,
}

/// Loader for the skill catalog from RON files.
pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SkillDef>> {
        let catalog: SkillCatalog = parse_ron(path)?;
        Ok(catalog.skills)
    }
}
