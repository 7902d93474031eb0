//! Command-line battle runner.
//!
//! Loads content from a data directory, places every squad of the chosen
//! scenario and resolves the battle, reporting through [`LogPresenter`].

pub mod config;
pub mod presenter;

pub use config::ClientConfig;
pub use presenter::LogPresenter;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_core::TeamId;

/// Runs the configured scenario to the end and returns the winner.
pub fn run(config: &ClientConfig) -> Result<Option<TeamId>> {
    let factory = ContentFactory::new(&config.data_dir);
    let battle = config.apply(factory.load_config()?);
    tracing::debug!(?battle, "battle configuration");

    let mut field = factory
        .prepare_battle(&config.scenario, battle)
        .with_context(|| format!("failed to prepare scenario '{}'", config.scenario))?;

    let mut presenter = LogPresenter::new();
    let winner = field.run(&mut presenter);
    tracing::info!(
        clock = %field.clock(),
        turns = field.turns(),
        actions = presenter.actions(),
        defeats = presenter.defeats(),
        "battle finished"
    );
    Ok(winner)
}
