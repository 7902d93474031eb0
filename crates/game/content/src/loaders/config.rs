//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a [`BattleConfig`]. Missing keys take their defaults.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("close_distance = 12.5\nseed = 7\n").unwrap();
        assert_eq!(config.close_distance, 12.5);
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_turns, BattleConfig::DEFAULT_MAX_TURNS);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ConfigLoader::parse("close_distance = -1.0").unwrap_err();
        assert!(err.to_string().contains("close"), "unexpected error: {err}");
    }
}
