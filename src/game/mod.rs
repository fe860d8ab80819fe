//! Game state and logic module
//!
//! This module contains the combat data model: servants, enemies, buffs,
//! traits, skills, Noble Phantasms, the mystic code, quests and the state
//! that ties them together.

pub mod buffs;
pub mod cards;
pub mod class;
pub mod combatant;
pub mod enemy;
pub mod function;
pub mod mystic_code;
pub mod np;
pub mod quest;
pub mod select;
pub mod servant;
pub mod skills;
pub mod state;
pub mod stats;
pub mod traits;

pub use buffs::{Buff, BuffSource, Buffs};
pub use cards::CardType;
pub use class::{Attribute, ClassName};
pub use combatant::Combatant;
pub use enemy::Enemy;
pub use mystic_code::{McSkill, MysticCode};
pub use np::NoblePhantasm;
pub use quest::{Quest, Wave};
pub use servant::Servant;
pub use skills::{Skill, SkillSlot, Skills};
pub use state::{DamageEvent, FieldEffect, GameState, TargetRef};
pub use stats::Stats;
pub use traits::{TraitChanges, TraitSet};
