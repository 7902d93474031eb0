//! Environment collaborators injected into a battlefield.
mod rng;

pub use rng::{FixedRng, PcgRng, RngOracle, RollContext, compute_seed};
