//! Battle client binary.
//!
//! ```bash
//! BATTLE_SCENARIO=melee BATTLE_SEED=7 RUST_LOG=debug cargo run -p battle-client
//! ```

use anyhow::Result;
use battle_client::ClientConfig;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        scenario = %config.scenario,
        "starting battle"
    );

    match battle_client::run(&config)? {
        Some(team) => tracing::info!("winner: {team}"),
        None => tracing::info!("the battle ended without a winner"),
    }
    Ok(())
}
