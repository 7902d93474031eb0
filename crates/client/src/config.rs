//! Client configuration read from the environment.
use std::env;
use std::path::PathBuf;

use battle_core::BattleConfig;

/// Where the battle comes from and how it may be overridden.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Directory holding `config.toml`, the catalogs and `scenarios/`.
    pub data_dir: PathBuf,
    /// Scenario file name without the `.ron` extension.
    pub scenario: String,
    /// Overrides `seed` from `config.toml`.
    pub seed: Option<u64>,
    /// Overrides `max_turns` from `config.toml`.
    pub max_turns: Option<u64>,
}

impl ClientConfig {
    pub const DEFAULT_SCENARIO: &'static str = "skirmish";

    /// Construct client configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_DATA_DIR` - Content directory (default: the bundled content data)
    /// - `BATTLE_SCENARIO` - Scenario name (default: `skirmish`)
    /// - `BATTLE_SEED` - Battle seed override
    /// - `BATTLE_MAX_TURNS` - Turn limit override
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("BATTLE_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(scenario) = read_env::<String>("BATTLE_SCENARIO") {
            config.scenario = scenario;
        }
        config.seed = read_env("BATTLE_SEED");
        config.max_turns = read_env::<u64>("BATTLE_MAX_TURNS").map(|turns| turns.max(1));

        config
    }

    /// Applies the overrides on top of the loaded battle configuration.
    pub fn apply(&self, mut battle: BattleConfig) -> BattleConfig {
        if let Some(seed) = self.seed {
            battle = battle.with_seed(seed);
        }
        if let Some(max_turns) = self.max_turns {
            battle = battle.with_max_turns(max_turns);
        }
        battle
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../game/content/data")),
            scenario: Self::DEFAULT_SCENARIO.to_string(),
            seed: None,
            max_turns: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
