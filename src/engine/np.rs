//! NP manager
//!
//! Fires a servant's Noble Phantasm: overcharge, damage and refund on each
//! enemy hit, side effects, trigger consumption and the post-NP transform.

use super::damage::{np_damage, resolve_hits, DamageInputs, RefundInputs};
use super::effects::{apply_function, resolve_targets, EffectContext};
use super::roll::DamageRoll;
use super::triggers::{consume_counts, TriggerEvent};
use super::ActionError;
use crate::game::buffs::{Buff, BuffSource, Buffs, MAGIC_BULLET, MAGIC_BULLET_TRAIT};
use crate::game::cards::CardType;
use crate::game::class::{Attribute, ClassName};
use crate::game::combatant::Combatant;
use crate::game::function::{CountSide, FuncType, Function, SuperEffective, SuperEffectiveKind};
use crate::game::servant::{transform_target, uses_magic_bullets};
use crate::game::state::{DamageEvent, GameState, TargetRef, FRONTLINE};
use crate::game::stats::{attribute_multiplier, class_multiplier, frac, Stats, OVERCHARGE_UP};
use crate::game::traits::TraitSet;

/// Most magic bullets one NP spends
pub const MAX_BULLETS_SPENT: usize = 10;

/// Turns the OC boost shared with allies stays up: the rest of the current
/// turn and the next one
const SHARED_OC_TURNS: i32 = 2;

/// Count matching traits and buffs for a super-effective NP
fn count_matches(se: &SuperEffective, traits: &TraitSet, buffs: &Buffs) -> u32 {
    let in_ids = |id: u32| se.ids.contains(&id);
    let trait_hits = traits.iter().filter(|t| in_ids(*t)).count();
    let buff_hits = buffs
        .iter()
        .filter(|b| se.ids.iter().any(|id| b.has_individuality(*id)))
        .count();
    let count = match se.kind {
        SuperEffectiveKind::Trait | SuperEffectiveKind::Sum => trait_hits + buff_hits,
        SuperEffectiveKind::State => buff_hits,
    };
    count as u32
}

fn overcharge_buff(turns: i32, source: BuffSource) -> Buff {
    Buff::new(OVERCHARGE_UP, 1, turns).with_source(source)
}

/// What the damage functions of one NP need from the caster
struct Attacker {
    id: u32,
    atk: f64,
    class_name: ClassName,
    attribute: Attribute,
    traits: TraitSet,
    buffs: Buffs,
    stats: Stats,
    np_gain: f64,
    distribution: Vec<u32>,
    card: CardType,
}

/// Fires Noble Phantasms with its own damage roll
#[derive(Debug, Clone, Default)]
pub struct NpManager {
    roll: DamageRoll,
}

impl NpManager {
    pub fn new(roll: DamageRoll) -> Self {
        Self { roll }
    }

    /// Fire the NP of frontline servant `idx`
    pub fn use_np(&mut self, state: &mut GameState, idx: usize) -> Result<(), ActionError> {
        if idx >= state.frontline().len() {
            return Err(ActionError::InvalidSlot(idx));
        }
        let servant = &mut state.servants[idx];
        if !servant.can_np() {
            return Err(ActionError::NpNotReady {
                servant: idx,
                gauge: servant.np_gauge,
            });
        }
        let Some(np) = servant.np.clone() else {
            return Err(ActionError::NpNotReady {
                servant: idx,
                gauge: servant.np_gauge,
            });
        };

        let extra = servant.overcharge_extra();
        for _ in 0..extra {
            servant.buffs.add(overcharge_buff(1, BuffSource::System));
        }
        let oc = Stats::resolve(&servant.buffs, &servant.mods, servant.oc_level).oc_level;
        let functions = np.values(servant.np_level, oc);
        log::info!(
            "{} fires {} at {:.1}% (NP{} OC{})",
            servant.name,
            np.name,
            servant.np_gauge,
            servant.np_level,
            oc
        );
        servant.np_gauge = 0.0;

        let main_enemy = state.highest_hp_enemy();
        let ctx = EffectContext::new(idx, BuffSource::Np, state.turn).with_main_enemy(main_enemy);

        for function in &functions {
            if function.kind.is_damage() {
                self.deal_damage(state, function, &ctx);
            } else {
                apply_function(state, function, &ctx);
            }
        }

        let front = state.servants.len().min(FRONTLINE);
        for (i, ally) in state.servants[..front].iter_mut().enumerate() {
            if i != idx {
                ally.buffs.add(overcharge_buff(SHARED_OC_TURNS, BuffSource::Np));
            }
        }

        let depleted = consume_counts(
            &mut state.servants[idx].buffs,
            TriggerEvent::NoblePhantasm(np.card),
        );
        if depleted > 0 {
            log::debug!("{} buffs used up by the NP", depleted);
        }

        if transform_target(state.servants[idx].id).is_some() {
            if let Err(e) = state.transform_aoko(idx) {
                log::warn!("Transform after NP failed: {}", e);
            }
        }

        let caster = &mut state.servants[idx];
        if uses_magic_bullets(caster.id) {
            let spent = caster.buffs.remove_matching(Some(MAX_BULLETS_SPENT), |b| {
                b.name == MAGIC_BULLET && b.tvals.contains(&MAGIC_BULLET_TRAIT)
            });
            log::debug!("{} spends {} magic bullets", caster.name, spent);
        }

        if state.servants[idx].kill {
            if let Some(fallen) = state.remove_servant(idx) {
                log::info!("{} falls after the NP", fallen.name);
            }
        }
        Ok(())
    }

    fn attacker(state: &GameState, idx: usize, np_level: u8) -> Option<Attacker> {
        let servant = state.servants.get(idx)?;
        let np = servant.np.as_ref()?;
        Some(Attacker {
            id: servant.id,
            atk: servant.atk,
            class_name: servant.class_name,
            attribute: servant.attribute,
            traits: servant.traits.clone(),
            buffs: servant.buffs.clone(),
            stats: Stats::resolve(&servant.buffs, &servant.mods, servant.oc_level),
            np_gain: np.gain_per_hit(np_level),
            distribution: np.distribution(),
            card: np.card,
        })
    }

    /// Apply one damage function to each of its enemy targets
    fn deal_damage(&mut self, state: &mut GameState, function: &Function, ctx: &EffectContext) {
        let np_level = state.servants[ctx.caster].np_level;
        let Some(attacker) = Self::attacker(state, ctx.caster, np_level) else {
            return;
        };
        let params = function.np_damage();
        let pierce = function.kind == FuncType::DamageNpPierce;
        let caster_matches = params
            .super_effective
            .as_ref()
            .map(|se| count_matches(se, &attacker.traits, &attacker.buffs));

        let mut refund_total = 0.0;
        for target in resolve_targets(state, &function.target, ctx) {
            let TargetRef::Enemy(e) = target else {
                log::debug!("Damage function aimed at ally {:?}, skipping", target);
                continue;
            };
            let roll = self.roll.next();
            let Some(enemy) = state.enemies.get_mut(e) else {
                continue;
            };
            let enemy_stats = Stats::resolve_enemy(&enemy.buffs);

            let se_multiplier = match &params.super_effective {
                Some(se) => {
                    let matches = match se.side {
                        CountSide::Caster => caster_matches.unwrap_or(0),
                        CountSide::Target => {
                            count_matches(se, &enemy.traits, &enemy.buffs)
                        }
                    };
                    se.multiplier(matches)
                }
                None => 1.0,
            };

            let stats = &attacker.stats;
            let (generic_power, trait_power) = stats.power_against(&enemy.traits);
            let enemy_def_mod = if pierce {
                -frac(enemy_stats.def_down)
            } else {
                frac(enemy_stats.def_mod)
            };
            let inputs = DamageInputs {
                se_multiplier,
                card_mod: frac(stats.card_mod.get(attacker.card)),
                card_damage_mod: frac(stats.card_damage_mod.get(attacker.card)),
                enemy_res_mod: frac(enemy_stats.res_mod.get(attacker.card)),
                class_multiplier: class_multiplier(attacker.class_name, enemy.class_name),
                attribute_multiplier: attribute_multiplier(attacker.attribute, enemy.attribute),
                atk_mod: frac(stats.atk_mod),
                enemy_def_mod,
                np_damage_mod: frac(stats.np_damage_mod),
                generic_power_mod: frac(generic_power),
                trait_power_mod: frac(trait_power),
                roll,
                ..DamageInputs::base(attacker.atk, params.multiplier, attacker.card)
            };
            let total = np_damage(&inputs);

            let refund = RefundInputs {
                np_gain: attacker.np_gain,
                np_gain_mod: stats.np_gain_mod,
                card: attacker.card,
                card_mod: frac(stats.card_mod.get(attacker.card)),
                enemy_np_mult: enemy.np_per_hit_mult,
            };
            let hits = resolve_hits(total, &attacker.distribution, enemy.hp, &refund);

            let remaining = enemy.hp - hits.damage.floor() as i64;
            enemy.set_hp(remaining);
            log::debug!(
                "{} takes {:.0} ({} overkill hits, SE x{:.2}), {} HP left",
                enemy.name,
                hits.damage,
                hits.overkill_hits,
                se_multiplier,
                enemy.hp
            );

            refund_total += hits.refund;
            state.damage_log.push(DamageEvent {
                turn: state.turn,
                wave: state.wave,
                caster_id: attacker.id,
                enemy: e,
                damage: hits.damage,
                refund: hits.refund,
                overkill_hits: hits.overkill_hits,
            });
        }

        if let Some(caster) = state.servants.get_mut(ctx.caster) {
            caster.gain_np(refund_total);
        }
    }
}
