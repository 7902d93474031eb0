//! Data-driven battle content.
//!
//! Statuses, skills, fighters and scenarios are authored as RON files and
//! battle tuning as TOML. Loaders turn each file into plain definition
//! records; [`ContentLibrary`] resolves the names between them into
//! `battle-core` templates, and [`ContentFactory`] ties a data directory to a
//! ready-to-run battlefield.

#[cfg(feature = "loaders")]
pub mod library;
#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use library::ContentLibrary;
#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, FighterDef, FighterLoader, LoadResult, ReactionDef, ScenarioDef,
    ScenarioLoader, SkillDef, SkillLoader, StatusDef, StatusLoader, TriggerDef,
};
