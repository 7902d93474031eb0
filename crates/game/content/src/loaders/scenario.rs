//! Scenario loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, parse_ron};

/// Squads to put on the battlefield, by fighter name.
///
/// The position of a squad in `teams` is its team id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub name: String,
    pub teams: Vec<Vec<String>>,
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioDef> {
        let scenario: ScenarioDef = parse_ron(path)?;
        if scenario.teams.len() < 2 {
            anyhow::bail!(
                "scenario '{}' needs at least two teams, found {}",
                scenario.name,
                scenario.teams.len()
            );
        }
        if u8::try_from(scenario.teams.len()).is_err() {
            anyhow::bail!("scenario '{}' has too many teams", scenario.name);
        }
        Ok(scenario)
    }
}
