//! Stats resolver
//!
//! Folds a combatant's buff list into the modifiers the damage and NP-gain
//! formulas consume. All additive modifiers are per-mille.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use super::buffs::{Buff, Buffs};
use super::cards::CardType;
use super::class::{Attribute, ClassName};
use super::traits::TraitSet;
use crate::config::UserMods;

pub const OVERCHARGE_UP: &str = "Overcharge Lv. Up";
pub const BOOST_NP_STRENGTH: &str = "Boost NP Strength Up";

/// Highest OC level
pub const MAX_OC: u8 = 5;
/// Most OC levels buffs can add
const MAX_OC_BONUS: i64 = 4;

const CARD_ARTS_TRAIT: u32 = 4001;
const CARD_BUSTER_TRAIT: u32 = 4002;
const CARD_QUICK_TRAIT: u32 = 4003;

/// What a buff modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    Atk,
    CardUp(CardType),
    /// Card damage up, for one card or all of them
    CardDamageUp(Option<CardType>),
    NpDamage,
    BoostNpDamage,
    Power,
    NpGain,
    Overcharge,
    Def,
    Resist(CardType),
    DeathResist,
    DeathChance,
}

static BY_NAME: Lazy<HashMap<&'static str, (StatKey, i64)>> = Lazy::new(|| {
    use CardType::*;
    use StatKey::*;
    HashMap::from([
        ("ATK Up", (Atk, 1)),
        ("ATK Down", (Atk, -1)),
        ("Buster Up", (CardUp(Buster), 1)),
        ("Arts Up", (CardUp(Arts), 1)),
        ("Quick Up", (CardUp(Quick), 1)),
        ("Buster Down", (CardUp(Buster), -1)),
        ("Arts Down", (CardUp(Arts), -1)),
        ("Quick Down", (CardUp(Quick), -1)),
        ("Card Damage Up", (CardDamageUp(None), 1)),
        ("Buster Card Damage Up", (CardDamageUp(Some(Buster)), 1)),
        ("Arts Card Damage Up", (CardDamageUp(Some(Arts)), 1)),
        ("Quick Card Damage Up", (CardDamageUp(Some(Quick)), 1)),
        ("NP Strength Up", (NpDamage, 1)),
        ("NP Damage Up", (NpDamage, 1)),
        ("NP Strength Down", (NpDamage, -1)),
        (BOOST_NP_STRENGTH, (BoostNpDamage, 1)),
        ("Power Up", (Power, 1)),
        ("Special Attack", (Power, 1)),
        ("NP Gain Up", (NpGain, 1)),
        ("NP Gain Down", (NpGain, -1)),
        (OVERCHARGE_UP, (Overcharge, 1)),
        ("DEF Up", (Def, 1)),
        ("DEF Down", (Def, -1)),
        ("Buster Resist Up", (Resist(Buster), 1)),
        ("Arts Resist Up", (Resist(Arts), 1)),
        ("Quick Resist Up", (Resist(Quick), 1)),
        ("Buster Resist Down", (Resist(Buster), -1)),
        ("Arts Resist Down", (Resist(Arts), -1)),
        ("Quick Resist Down", (Resist(Quick), -1)),
        ("Death Resist Up", (DeathResist, 1)),
        ("Death Resist Down", (DeathResist, -1)),
        ("Death Chance Up", (DeathChance, 1)),
    ])
});

fn card_from_tvals(buff: &Buff) -> Option<CardType> {
    buff.tvals.iter().find_map(|t| match *t {
        CARD_BUSTER_TRAIT => Some(CardType::Buster),
        CARD_ARTS_TRAIT => Some(CardType::Arts),
        CARD_QUICK_TRAIT => Some(CardType::Quick),
        _ => None,
    })
}

/// Classify a buff, by display name first and upstream type second.
/// Returns the key and the sign its value is applied with.
pub fn classify(buff: &Buff) -> Option<(StatKey, i64)> {
    if let Some(entry) = BY_NAME.get(buff.name.as_str()) {
        return Some(*entry);
    }

    let key = match buff.buff_type.as_str() {
        "upAtk" => (StatKey::Atk, 1),
        "downAtk" => (StatKey::Atk, -1),
        "upCommandall" => (StatKey::CardUp(card_from_tvals(buff)?), 1),
        "downCommandall" => (StatKey::CardUp(card_from_tvals(buff)?), -1),
        "upNpdamage" => (StatKey::NpDamage, 1),
        "downNpdamage" => (StatKey::NpDamage, -1),
        "upDamage" => (StatKey::Power, 1),
        "upDropnp" => (StatKey::NpGain, 1),
        "downDropnp" => (StatKey::NpGain, -1),
        "upChagetd" => (StatKey::Overcharge, 1),
        "upDefence" => (StatKey::Def, 1),
        "downDefence" => (StatKey::Def, -1),
        "upDefencecommandall" => (StatKey::Resist(card_from_tvals(buff)?), 1),
        "downDefencecommandall" => (StatKey::Resist(card_from_tvals(buff)?), -1),
        "upResistInstantdeath" => (StatKey::DeathResist, 1),
        "downResistInstantdeath" => (StatKey::DeathResist, -1),
        "upGrantInstantdeath" => (StatKey::DeathChance, 1),
        _ => return None,
    };
    Some(key)
}

/// Bucket of a power modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PowerKey {
    /// Applies against every target
    Global,
    /// Applies against targets with this trait
    Trait(u32),
}

/// A per-card modifier
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CardTable {
    pub buster: i64,
    pub arts: i64,
    pub quick: i64,
}

impl CardTable {
    pub fn get(&self, card: CardType) -> i64 {
        match card {
            CardType::Buster => self.buster,
            CardType::Arts => self.arts,
            CardType::Quick => self.quick,
        }
    }

    fn add(&mut self, card: CardType, value: i64) {
        match card {
            CardType::Buster => self.buster += value,
            CardType::Arts => self.arts += value,
            CardType::Quick => self.quick += value,
        }
    }

    fn add_all(&mut self, value: i64) {
        self.buster += value;
        self.arts += value;
        self.quick += value;
    }
}

/// Modifiers of one combatant at one moment
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub atk_mod: i64,
    /// Card effectiveness (Buster Up, ...)
    pub card_mod: CardTable,
    pub card_damage_mod: CardTable,
    pub np_damage_mod: i64,
    /// Multiplicative, 1.0 when unbuffed
    pub np_gain_mod: f64,
    pub power_mod: BTreeMap<PowerKey, i64>,
    pub oc_level: u8,
    /// DEF Up minus DEF Down
    pub def_mod: i64,
    /// DEF Down alone, the part that pierces defense
    pub def_down: i64,
    pub res_mod: CardTable,
    pub death_resist_mod: i64,
    pub death_chance_mod: i64,
}

impl Stats {
    /// Resolve modifiers from the user's permanent inputs and a buff list.
    /// Display-only entries are skipped.
    pub fn resolve(buffs: &Buffs, mods: &UserMods, base_oc: u8) -> Self {
        let mut stats = Self {
            atk_mod: mods.atk_up,
            card_mod: CardTable {
                buster: mods.buster_up,
                arts: mods.arts_up,
                quick: mods.quick_up,
            },
            card_damage_mod: CardTable::default(),
            np_damage_mod: mods.np_damage_up,
            np_gain_mod: 1.0,
            power_mod: BTreeMap::new(),
            oc_level: base_oc,
            def_mod: 0,
            def_down: 0,
            res_mod: CardTable::default(),
            death_resist_mod: 0,
            death_chance_mod: 0,
        };
        stats.card_damage_mod.add_all(mods.card_damage_up);
        if mods.damage_up != 0 {
            stats.power_mod.insert(PowerKey::Global, mods.damage_up);
        }

        let mut oc_bonus = 0;
        let mut boost = false;

        for buff in buffs.iter().filter(|b| !b.is_display_only()) {
            let Some((key, sign)) = classify(buff) else {
                continue;
            };
            let value = buff.value * sign;
            match key {
                StatKey::Atk => stats.atk_mod += value,
                StatKey::CardUp(card) => stats.card_mod.add(card, value),
                StatKey::CardDamageUp(Some(card)) => stats.card_damage_mod.add(card, value),
                StatKey::CardDamageUp(None) => stats.card_damage_mod.add_all(value),
                StatKey::NpDamage => stats.np_damage_mod += value,
                StatKey::BoostNpDamage => boost = true,
                StatKey::Power => {
                    if buff.tvals.is_empty() {
                        *stats.power_mod.entry(PowerKey::Global).or_default() += value;
                    } else {
                        for t in &buff.tvals {
                            *stats.power_mod.entry(PowerKey::Trait(*t)).or_default() += value;
                        }
                    }
                }
                StatKey::NpGain => stats.np_gain_mod *= 1.0 + value as f64 / 1000.0,
                StatKey::Overcharge => oc_bonus += buff.value.max(1),
                StatKey::Def => {
                    stats.def_mod += value;
                    if sign < 0 {
                        stats.def_down += buff.value;
                    }
                }
                StatKey::Resist(card) => stats.res_mod.add(card, value),
                StatKey::DeathResist => stats.death_resist_mod += value,
                StatKey::DeathChance => stats.death_chance_mod += value,
            }
        }

        if boost {
            stats.np_damage_mod *= 2;
        }

        let oc = base_oc as i64 + oc_bonus.min(MAX_OC_BONUS);
        stats.oc_level = oc.clamp(1, MAX_OC as i64) as u8;
        stats
    }

    /// Resolve an enemy's buffs; enemies carry no user inputs
    pub fn resolve_enemy(buffs: &Buffs) -> Self {
        Self::resolve(buffs, &UserMods::default(), 1)
    }

    /// (untargeted, trait-matched) power modifiers against a target
    pub fn power_against(&self, target: &TraitSet) -> (i64, i64) {
        let mut generic = 0;
        let mut matched = 0;
        for (key, value) in &self.power_mod {
            match key {
                PowerKey::Global => generic += value,
                PowerKey::Trait(t) if target.contains(*t) => matched += value,
                PowerKey::Trait(_) => {}
            }
        }
        (generic, matched)
    }
}

/// Per-mille to fraction
pub fn frac(per_mille: i64) -> f64 {
    per_mille as f64 / 1000.0
}

pub fn class_multiplier(attacker: ClassName, defender: ClassName) -> f64 {
    attacker.advantage_against(defender)
}

pub fn attribute_multiplier(attacker: Attribute, defender: Attribute) -> f64 {
    attacker.affinity_against(defender)
}
