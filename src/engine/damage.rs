//! NP damage and refund math
//!
//! Pure functions over already-resolved modifiers. Per-mille values are
//! converted to fractions by the caller.

use crate::game::cards::CardType;

/// Fixed scaling constant of the damage formula
pub const DAMAGE_CONSTANT: f64 = 0.23;
/// Refund multiplier for hits that land on a dead enemy
pub const OVERKILL_BONUS: f64 = 1.5;

/// Everything the damage formula reads
#[derive(Debug, Clone, PartialEq)]
pub struct DamageInputs {
    pub atk: f64,
    pub np_multiplier: f64,
    pub se_multiplier: f64,
    pub card: CardType,
    pub card_mod: f64,
    pub card_damage_mod: f64,
    pub enemy_res_mod: f64,
    pub class_multiplier: f64,
    pub attribute_multiplier: f64,
    pub atk_mod: f64,
    pub enemy_def_mod: f64,
    pub np_damage_mod: f64,
    pub generic_power_mod: f64,
    pub trait_power_mod: f64,
    pub roll: f64,
}

impl DamageInputs {
    /// Unbuffed inputs for a card, neutral matchups, roll 1.0
    pub fn base(atk: f64, np_multiplier: f64, card: CardType) -> Self {
        Self {
            atk,
            np_multiplier,
            se_multiplier: 1.0,
            card,
            card_mod: 0.0,
            card_damage_mod: 0.0,
            enemy_res_mod: 0.0,
            class_multiplier: 1.0,
            attribute_multiplier: 1.0,
            atk_mod: 0.0,
            enemy_def_mod: 0.0,
            np_damage_mod: 0.0,
            generic_power_mod: 0.0,
            trait_power_mod: 0.0,
            roll: 1.0,
        }
    }
}

/// Total damage of one NP damage function on one enemy
pub fn np_damage(i: &DamageInputs) -> f64 {
    let card = i.card.damage_value() * (1.0 + i.card_mod + i.card_damage_mod - i.enemy_res_mod);
    let damage = i.atk
        * i.np_multiplier
        * i.se_multiplier
        * card
        * i.class_multiplier
        * i.attribute_multiplier
        * DAMAGE_CONSTANT
        * (1.0 + i.atk_mod - i.enemy_def_mod)
        * (1.0 + i.np_damage_mod + i.generic_power_mod + i.trait_power_mod)
        * i.roll;
    damage.max(0.0)
}

/// Everything the refund formula reads
#[derive(Debug, Clone, PartialEq)]
pub struct RefundInputs {
    /// Per-hit gain of the NP, in percent
    pub np_gain: f64,
    pub np_gain_mod: f64,
    pub card: CardType,
    pub card_mod: f64,
    pub enemy_np_mult: f64,
}

/// NP refunded by one hit, in percent
pub fn refund_per_hit(i: &RefundInputs, overkill: bool) -> f64 {
    let bonus = if overkill { OVERKILL_BONUS } else { 1.0 };
    let refund = i.np_gain
        * i.np_gain_mod
        * i.card.np_value()
        * (1.0 + i.card_mod)
        * i.enemy_np_mult
        * bonus;
    refund.max(0.0)
}

/// Split total damage by a percent distribution
pub fn distribute(total: f64, distribution: &[u32]) -> Vec<f64> {
    distribution
        .iter()
        .map(|pct| total * *pct as f64 / 100.0)
        .collect()
}

/// Result of landing every hit of an NP on one enemy
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub damage: f64,
    pub refund: f64,
    pub overkill_hits: usize,
}

/// Land the hits in order. A hit is overkill once cumulative damage,
/// including that hit, exceeds the enemy's HP at the start of the NP.
pub fn resolve_hits(
    total: f64,
    distribution: &[u32],
    hp_at_start: i64,
    refund: &RefundInputs,
) -> HitResult {
    let mut cumulative = 0.0;
    let mut result = HitResult {
        damage: 0.0,
        refund: 0.0,
        overkill_hits: 0,
    };
    for hit in distribute(total, distribution) {
        cumulative += hit;
        let overkill = cumulative > hp_at_start as f64;
        if overkill {
            result.overkill_hits += 1;
        }
        result.refund += refund_per_hit(refund, overkill);
    }
    result.damage = cumulative;
    result
}
