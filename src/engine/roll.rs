//! Damage roll
//!
//! The only source of randomness in a run. Kept outside the game state so
//! states stay comparable and cheap to snapshot.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RollMode;

/// Lower bound of the production roll
pub const ROLL_MIN: f64 = 0.9;
/// Upper bound (exclusive) of the production roll
pub const ROLL_MAX: f64 = 1.1;

#[derive(Debug, Clone)]
pub enum DamageRoll {
    Fixed(f64),
    Uniform(StdRng),
}

impl Default for DamageRoll {
    fn default() -> Self {
        DamageRoll::Fixed(1.0)
    }
}

impl DamageRoll {
    /// Always 1.0
    pub fn deterministic() -> Self {
        Self::default()
    }

    /// Uniform in [0.9, 1.1)
    pub fn uniform(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        DamageRoll::Uniform(rng)
    }

    pub fn from_mode(mode: RollMode) -> Self {
        match mode {
            RollMode::Fixed(value) => DamageRoll::Fixed(value),
            RollMode::Uniform { seed } => Self::uniform(seed),
        }
    }

    pub fn next(&mut self) -> f64 {
        match self {
            DamageRoll::Fixed(value) => *value,
            DamageRoll::Uniform(rng) => rng.gen_range(ROLL_MIN..ROLL_MAX),
        }
    }
}
