//! Configuration module
//!
//! Handles simulation settings, team configurations, and user modifiers.

pub mod settings;

pub use settings::{RollMode, ServantConfig, Settings, TeamConfig, UserMods};
