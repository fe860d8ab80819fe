//! Card types
//!
//! FGO has three command card types (Buster, Arts, Quick). A Noble Phantasm
//! carries one of them, which decides its damage and NP refund constants.

use serde::{Deserialize, Serialize};

use crate::data::DataError;

/// The type of a command card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Red card - high damage, low NP gain
    Buster,
    /// Blue card - medium damage, high NP gain
    Arts,
    /// Green card - low damage, generates stars
    Quick,
}

impl CardType {
    pub fn from_api_name(name: &str) -> Result<Self, DataError> {
        match name.to_ascii_lowercase().as_str() {
            "buster" | "1" => Ok(CardType::Buster),
            "arts" | "2" => Ok(CardType::Arts),
            "quick" | "3" => Ok(CardType::Quick),
            _ => Err(DataError::UnknownCard(name.to_string())),
        }
    }

    /// Damage constant of the card
    pub fn damage_value(&self) -> f64 {
        match self {
            CardType::Buster => 1.5,
            CardType::Arts => 1.0,
            CardType::Quick => 0.8,
        }
    }

    /// NP refund constant of the card
    pub fn np_value(&self) -> f64 {
        match self {
            CardType::Arts => 3.0,
            CardType::Buster | CardType::Quick => 1.0,
        }
    }
}
