//! Content factory for building battlefields from data files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use battle_core::{BattleConfig, Battlefield};

use crate::library::ContentLibrary;
use crate::loaders::{
    ConfigLoader, FighterLoader, LoadResult, ScenarioDef, ScenarioLoader, SkillLoader,
    StatusLoader,
};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── statuses.ron
/// ├── skills.ron
/// ├── fighters.ron
/// └── scenarios/
///     └── skirmish.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load and cross-check the status, skill and fighter catalogs.
    pub fn load_library(&self) -> LoadResult<ContentLibrary> {
        let statuses = StatusLoader::load(&self.data_dir.join("statuses.ron"))?;
        let skills = SkillLoader::load(&self.data_dir.join("skills.ron"))?;
        let fighters = FighterLoader::load(&self.data_dir.join("fighters.ron"))?;
        ContentLibrary::new(statuses, skills, fighters)
            .with_context(|| format!("invalid content in {}", self.data_dir.display()))
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<ScenarioDef> {
        let path = self.data_dir.join("scenarios").join(format!("{name}.ron"));
        ScenarioLoader::load(&path)
    }

    /// Builds a battlefield with every unit of the scenario placed on it.
    pub fn prepare_battle(&self, scenario: &str, config: BattleConfig) -> LoadResult<Battlefield> {
        let library = self.load_library()?;
        let scenario = self.load_scenario(scenario)?;

        let mut field = Battlefield::new(config)?;
        for (team, unit) in library.muster(&scenario)? {
            field.add_unit(unit, team);
        }
        tracing::info!(
            scenario = %scenario.name,
            units = field.units().count(),
            "battle prepared"
        );
        Ok(field)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
