//! Simulation settings and team configurations
//!
//! Defines everything a caller configures before a run: how damage is
//! rolled, how the driver reacts to rejected tokens, and the team itself.

use serde::{Deserialize, Serialize};

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How the damage roll is produced
    pub roll: RollMode,
    /// Stop the script at the first rejected token
    pub halt_on_failure: bool,
    /// Treat unparseable tokens as rejected instead of skipping them
    pub halt_on_unknown_token: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roll: RollMode::Fixed(1.0),
            halt_on_failure: true,
            halt_on_unknown_token: false,
        }
    }
}

impl Settings {
    /// Fixed roll of 1.0, for regression runs
    pub fn deterministic() -> Self {
        Self::default()
    }

    /// Uniform roll, reproducible when seeded
    pub fn randomized(seed: Option<u64>) -> Self {
        Self {
            roll: RollMode::Uniform { seed },
            ..Default::default()
        }
    }

    /// Keep going after rejected tokens, for exploring partial scripts
    pub fn lenient() -> Self {
        Self {
            halt_on_failure: false,
            ..Default::default()
        }
    }
}

/// Damage roll mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    /// Every roll returns this value
    Fixed(f64),
    /// Uniform in [0.9, 1.1); entropy-seeded when `seed` is None
    Uniform { seed: Option<u64> },
}

/// The party, frontline first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub servants: Vec<ServantConfig>,
}

impl TeamConfig {
    pub fn new(servants: Vec<ServantConfig>) -> Self {
        Self { servants }
    }

    /// Default configuration for each id
    pub fn from_ids(ids: &[u32]) -> Self {
        Self {
            servants: ids.iter().map(|&id| ServantConfig::new(id)).collect(),
        }
    }

    pub fn ids(&self) -> Vec<u32> {
        self.servants.iter().map(|s| s.id).collect()
    }
}

/// One party member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServantConfig {
    pub id: u32,
    /// 1-4
    #[serde(default = "default_ascension")]
    pub ascension: u8,
    #[serde(default)]
    pub costume: Option<u32>,
    /// Defaults to the rarity's max level
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default = "default_fou")]
    pub fou_atk: u32,
    /// 1-5
    #[serde(default = "default_level_one")]
    pub np_level: u8,
    /// 1-5
    #[serde(default = "default_level_one")]
    pub oc_level: u8,
    /// Starting NP gauge in percent
    #[serde(default)]
    pub initial_charge: f64,
    /// First use of each skill has its cooldown reduced by one
    #[serde(default)]
    pub append5: bool,
    #[serde(flatten)]
    pub mods: UserMods,
}

fn default_ascension() -> u8 {
    4
}

fn default_fou() -> u32 {
    1000
}

fn default_level_one() -> u8 {
    1
}

impl ServantConfig {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ascension: default_ascension(),
            costume: None,
            level: None,
            fou_atk: default_fou(),
            np_level: 1,
            oc_level: 1,
            initial_charge: 0.0,
            append5: false,
            mods: UserMods::default(),
        }
    }

    pub fn with_np_level(mut self, np_level: u8) -> Self {
        self.np_level = np_level;
        self
    }

    pub fn with_charge(mut self, percent: f64) -> Self {
        self.initial_charge = percent;
        self
    }

    pub fn with_ascension(mut self, ascension: u8, costume: Option<u32>) -> Self {
        self.ascension = ascension;
        self.costume = costume;
        self
    }

    pub fn with_append5(mut self) -> Self {
        self.append5 = true;
        self
    }

    pub fn with_mods(mut self, mods: UserMods) -> Self {
        self.mods = mods;
        self
    }

    /// Configured level, or the max level for the rarity
    pub fn level_for(&self, rarity: u32) -> u32 {
        self.level.unwrap_or(match rarity {
            5 => 90,
            4 => 80,
            3 => 70,
            2 | 1 => 65,
            _ => 60,
        })
    }
}

/// Permanent modifiers entered by the user (per-mille)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserMods {
    pub atk_up: i64,
    pub buster_up: i64,
    pub arts_up: i64,
    pub quick_up: i64,
    pub card_damage_up: i64,
    pub np_damage_up: i64,
    /// Folded into the untargeted power modifier
    pub damage_up: i64,
}

impl UserMods {
    /// Display name and value of every non-zero modifier
    pub fn entries(&self) -> Vec<(&'static str, i64)> {
        [
            ("ATK Up", self.atk_up),
            ("Buster Up", self.buster_up),
            ("Arts Up", self.arts_up),
            ("Quick Up", self.quick_up),
            ("Card Damage Up", self.card_damage_up),
            ("NP Strength Up", self.np_damage_up),
            ("Power Up", self.damage_up),
        ]
        .into_iter()
        .filter(|(_, v)| *v != 0)
        .collect()
    }
}
