//! Enemy entity
//!
//! Enemies have no skills or NP in the simulation; they only take damage,
//! carry buffs and scale the NP refund of hits they receive.

use serde::Serialize;

use super::buffs::Buffs;
use super::class::{Attribute, ClassName};
use super::combatant::Combatant;
use super::traits::TraitSet;
use crate::data::raw::{trait_ids, RawEnemy, RawTrait};
use crate::data::DataError;

/// Trait names that raise the NP refund of hits on an enemy
const REFUND_BONUS_TRAITS: [&str; 2] = ["undead", "soldier"];

/// An enemy in battle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    pub name: String,
    pub svt_id: Option<u32>,
    pub class_name: ClassName,
    pub attribute: Attribute,
    pub hp: i64,
    pub max_hp: i64,
    /// Instant-death susceptibility, per-mille
    pub death_rate: i64,
    pub traits: TraitSet,
    pub buffs: Buffs,
    /// Multiplier on the NP refund of hits taken
    pub np_per_hit_mult: f64,
}

impl Enemy {
    pub fn from_raw(raw: &RawEnemy) -> Result<Self, DataError> {
        let svt = raw.svt.as_ref();
        let class = raw
            .class_name
            .as_deref()
            .or(svt.map(|s| s.class_name.as_str()))
            .unwrap_or_default();
        let attribute = raw
            .attribute
            .as_deref()
            .or(svt.map(|s| s.attribute.as_str()))
            .unwrap_or_default();

        let mut raw_traits: Vec<&RawTrait> = raw.traits.iter().collect();
        if let Some(svt) = svt {
            raw_traits.extend(svt.traits.iter());
        }

        let class_name = ClassName::from_api_name(class)?;
        let refund_bonus = raw_traits.iter().any(|t| {
            REFUND_BONUS_TRAITS
                .iter()
                .any(|name| t.name.eq_ignore_ascii_case(name))
        });
        let np_per_hit_mult =
            class_name.enemy_np_modifier() + if refund_bonus { 0.2 } else { 0.0 };

        let name = if raw.name.is_empty() {
            svt.map(|s| s.name.clone()).unwrap_or_default()
        } else {
            raw.name.clone()
        };

        let mut traits = trait_ids(&raw.traits);
        if let Some(svt) = svt {
            traits.extend(trait_ids(&svt.traits));
        }

        let max_hp = raw.hp.max(0);
        Ok(Self {
            name,
            svt_id: svt.map(|s| s.id),
            class_name,
            attribute: Attribute::from_api_name(attribute)?,
            hp: max_hp,
            max_hp,
            death_rate: raw.death_rate,
            traits: TraitSet::new(traits),
            buffs: Buffs::new(),
            np_per_hit_mult,
        })
    }
}

impl Combatant for Enemy {
    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> ClassName {
        self.class_name
    }

    fn attribute(&self) -> Attribute {
        self.attribute
    }

    fn traits(&self) -> &TraitSet {
        &self.traits
    }

    fn traits_mut(&mut self) -> &mut TraitSet {
        &mut self.traits
    }

    fn buffs(&self) -> &Buffs {
        &self.buffs
    }

    fn buffs_mut(&mut self) -> &mut Buffs {
        &mut self.buffs
    }

    fn hp(&self) -> i64 {
        self.hp
    }

    fn max_hp(&self) -> i64 {
        self.max_hp
    }

    fn store_hp(&mut self, hp: i64) {
        self.hp = hp;
    }
}
