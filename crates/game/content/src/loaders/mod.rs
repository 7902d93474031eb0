//! Content loaders for reading battle data from files.
//!
//! Each loader turns one RON/TOML file into plain definition records. Name
//! resolution into core templates happens in [`crate::ContentLibrary`].

pub mod config;
pub mod factory;
pub mod fighters;
pub mod scenario;
pub mod skills;
pub mod statuses;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use fighters::{FighterCatalog, FighterDef, FighterLoader};
pub use scenario::{ScenarioDef, ScenarioLoader};
pub use skills::{SkillCatalog, SkillDef, SkillLoader};
pub use statuses::{ReactionDef, StatusCatalog, StatusDef, StatusLoader, TriggerDef};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Helper function to parse a RON document, naming the file on failure.
pub(crate) fn parse_ron<T: serde::de::DeserializeOwned>(path: &Path) -> LoadResult<T> {
    let content = read_file(path)?;
    ron::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse RON {}: {}", path.display(), e))
}
