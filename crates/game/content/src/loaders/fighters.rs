//! Fighter roster loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron};

/// A unit archetype: starting row and skills in priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterDef {
    pub name: String,
    #[serde(default)]
    pub row: u8,
    pub skills: Vec<String>,
}

/// Fighter catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterCatalog {
    pub fighters: Vec<FighterDef>,
}

/// Loader for the fighter roster from RON files.
pub struct FighterLoader;

impl FighterLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<FighterDef>> {
        let catalog: FighterCatalog = parse_ron(path)?;
        Ok(catalog.fighters)
    }
}
