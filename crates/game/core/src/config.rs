use crate::error::ConfigError;

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Slack added to the nearest candidate's distance for CLOSE_* targeting.
    pub close_distance: f64,
    /// Maximum absolute offset applied to display coordinates on placement.
    pub placement_jitter: f64,
    /// Upper bound (ms) of the random delay added to a unit's first action.
    pub stagger_max: u64,
    /// Combat-loop steps after which `run` gives up without a winner.
    pub max_turns: u64,
    /// Maximum nesting of status trigger reactions.
    pub reaction_depth: u8,
    /// Base seed for placement jitter and stagger rolls.
    pub seed: u64,
}

impl BattleConfig {
    // ===== layout constants =====
    /// Distance between a team's first row and the battlefield centre line.
    pub const FRONT_OFFSET: f64 = 10.0;
    /// Distance between consecutive rows of one team.
    pub const ROW_SPACING: f64 = 10.0;
    /// Distance between neighbouring slots of one row.
    pub const SLOT_SPACING: f64 = 6.0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CLOSE_DISTANCE: f64 = 8.0;
    pub const DEFAULT_PLACEMENT_JITTER: f64 = 0.5;
    pub const DEFAULT_STAGGER_MAX: u64 = 250;
    pub const DEFAULT_MAX_TURNS: u64 = 10_000;
    pub const DEFAULT_REACTION_DEPTH: u8 = 4;

    pub fn new() -> Self {
        Self {
            close_distance: Self::DEFAULT_CLOSE_DISTANCE,
            placement_jitter: Self::DEFAULT_PLACEMENT_JITTER,
            stagger_max: Self::DEFAULT_STAGGER_MAX,
            max_turns: Self::DEFAULT_MAX_TURNS,
            reaction_depth: Self::DEFAULT_REACTION_DEPTH,
            seed: 0,
        }
    }

    /// Configuration with every random source disabled.
    ///
    /// Placement is exact and units act as soon as their cooldowns allow.
    pub fn deterministic() -> Self {
        Self {
            placement_jitter: 0.0,
            stagger_max: 0,
            ..Self::new()
        }
    }

    pub fn with_close_distance(mut self, close_distance: f64) -> Self {
        self.close_distance = close_distance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u64) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Checks the values that would make targeting or placement meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.close_distance.is_nan() || self.close_distance < 0.0 {
            return Err(ConfigError::NegativeCloseDistance(self.close_distance));
        }
        if self.placement_jitter.is_nan() || self.placement_jitter < 0.0 {
            return Err(ConfigError::NegativeJitter(self.placement_jitter));
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
