//! Class and attribute tables
//!
//! Fixed game constants: class advantage, attribute affinity, the class ATK
//! multiplier applied to base ATK, and the enemy-side NP gain modifier.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::data::DataError;

/// Servant/enemy class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassName {
    Shielder,
    Saber,
    Archer,
    Lancer,
    Rider,
    Caster,
    Assassin,
    Berserker,
    Ruler,
    Avenger,
    MoonCancer,
    AlterEgo,
    Foreigner,
    Pretender,
    Beast,
}

static CLASS_NAMES: Lazy<HashMap<&'static str, ClassName>> = Lazy::new(|| {
    use ClassName::*;
    HashMap::from([
        ("shielder", Shielder),
        ("saber", Saber),
        ("archer", Archer),
        ("lancer", Lancer),
        ("rider", Rider),
        ("caster", Caster),
        ("assassin", Assassin),
        ("berserker", Berserker),
        ("ruler", Ruler),
        ("avenger", Avenger),
        ("mooncancer", MoonCancer),
        ("alterego", AlterEgo),
        ("foreigner", Foreigner),
        ("pretender", Pretender),
        ("beast", Beast),
    ])
});

impl ClassName {
    /// Parse a class name as written by the data store (`alterEgo`,
    /// `moonCancer`, `beastII`, ...)
    pub fn from_api_name(name: &str) -> Result<Self, DataError> {
        let lower = name.to_ascii_lowercase();
        if let Some(class) = CLASS_NAMES.get(lower.as_str()) {
            return Ok(*class);
        }
        // Numbered beasts (beastI, beastIIIR, ...) share the beast column
        if lower.starts_with("beast") {
            return Ok(ClassName::Beast);
        }
        Err(DataError::UnknownClass(name.to_string()))
    }

    fn is_knight(&self) -> bool {
        matches!(self, ClassName::Saber | ClassName::Archer | ClassName::Lancer)
    }

    fn is_cavalry(&self) -> bool {
        matches!(self, ClassName::Rider | ClassName::Caster | ClassName::Assassin)
    }

    /// Class advantage multiplier when attacking `defender`
    pub fn advantage_against(&self, defender: ClassName) -> f64 {
        use ClassName::*;

        match (*self, defender) {
            (Shielder, _) | (_, Shielder) => 1.0,

            (_, Beast) => 1.0,
            (Berserker, Foreigner) => 0.5,

            // Berserker deals and receives extra damage
            (Berserker, _) => 2.0,
            (_, Berserker) => 2.0,

            // Standard triangle
            (Saber, Lancer) | (Archer, Saber) | (Lancer, Archer) => 2.0,
            (Saber, Archer) | (Archer, Lancer) | (Lancer, Saber) => 0.5,

            // Cavalry triangle
            (Rider, Caster) | (Caster, Assassin) | (Assassin, Rider) => 2.0,
            (Rider, Assassin) | (Caster, Rider) | (Assassin, Caster) => 0.5,

            // Knights and cavalry are resisted by rulers
            (a, Ruler) if a.is_knight() || a.is_cavalry() => 0.5,

            // Extra classes
            (Ruler, MoonCancer) | (MoonCancer, Avenger) | (Avenger, Ruler) => 2.0,
            (Ruler, Avenger) | (MoonCancer, Ruler) | (Avenger, MoonCancer) => 0.5,

            (AlterEgo, d) if d.is_cavalry() => 1.5,
            (AlterEgo, d) if d.is_knight() => 0.5,
            (Pretender, d) if d.is_knight() => 1.5,
            (Pretender, d) if d.is_cavalry() => 0.5,
            (AlterEgo, Foreigner) | (Foreigner, Pretender) | (Pretender, AlterEgo) => 2.0,
            (AlterEgo, Pretender) | (Foreigner, AlterEgo) | (Pretender, Foreigner) => 0.5,
            (Foreigner, Foreigner) => 2.0,

            // Neutral
            _ => 1.0,
        }
    }

    /// Multiplier applied to base ATK for this class
    pub fn base_atk_multiplier(&self) -> f64 {
        match self {
            ClassName::Archer => 0.95,
            ClassName::Lancer => 1.05,
            ClassName::Caster | ClassName::Assassin => 0.9,
            ClassName::Berserker | ClassName::Ruler | ClassName::Avenger => 1.1,
            _ => 1.0,
        }
    }

    /// NP gain modifier when hitting an enemy of this class
    pub fn enemy_np_modifier(&self) -> f64 {
        match self {
            ClassName::Rider => 1.1,
            ClassName::Caster | ClassName::MoonCancer => 1.2,
            ClassName::Assassin => 0.9,
            ClassName::Berserker => 0.8,
            _ => 1.0,
        }
    }
}

/// Servant/enemy attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Man,
    Earth,
    Sky,
    Star,
    Beast,
}

impl Attribute {
    pub fn from_api_name(name: &str) -> Result<Self, DataError> {
        match name.to_ascii_lowercase().as_str() {
            "man" | "human" => Ok(Attribute::Man),
            "earth" => Ok(Attribute::Earth),
            "sky" => Ok(Attribute::Sky),
            "star" => Ok(Attribute::Star),
            "beast" => Ok(Attribute::Beast),
            _ => Err(DataError::UnknownAttribute(name.to_string())),
        }
    }

    /// Attribute affinity multiplier when attacking `defender`
    pub fn affinity_against(&self, defender: Attribute) -> f64 {
        use Attribute::*;

        match (*self, defender) {
            (Man, Sky) | (Sky, Earth) | (Earth, Man) => 1.1,
            (Man, Earth) | (Sky, Man) | (Earth, Sky) => 0.9,
            (Star, Beast) | (Beast, Star) => 1.1,
            _ => 1.0,
        }
    }
}
