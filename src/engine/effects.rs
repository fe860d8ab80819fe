//! Effect dispatch
//!
//! Resolves the targets of a function and applies its typed effect to each
//! of them. Shared by skills, mystic code skills and NP side effects.

use crate::game::buffs::BuffSource;
use crate::game::combatant::Combatant;
use crate::game::function::{Effect, FuncTarget, Function};
use crate::game::state::{GameState, TargetRef, FRONTLINE};
use crate::game::stats::{frac, Stats};

/// Threshold the instant-death chance must exceed
pub const INSTANT_DEATH_THRESHOLD: f64 = 0.5;

/// Who is acting and on whom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectContext {
    /// Party index of the acting servant
    pub caster: usize,
    /// Party index picked for single-ally functions
    pub chosen: Option<usize>,
    /// Enemy single-target functions hit, when fixed in advance
    pub main_enemy: Option<usize>,
    pub source: BuffSource,
    pub turn: u32,
}

impl EffectContext {
    pub fn new(caster: usize, source: BuffSource, turn: u32) -> Self {
        Self {
            caster,
            chosen: None,
            main_enemy: None,
            source,
            turn,
        }
    }

    pub fn with_chosen(mut self, chosen: Option<usize>) -> Self {
        self.chosen = chosen;
        self
    }

    pub fn with_main_enemy(mut self, main_enemy: Option<usize>) -> Self {
        self.main_enemy = main_enemy;
        self
    }
}

/// Targets of a function, in party order or wave-spawn order
pub fn resolve_targets(
    state: &mut GameState,
    target: &FuncTarget,
    ctx: &EffectContext,
) -> Vec<TargetRef> {
    let front = state.servants.len().min(FRONTLINE);
    let chosen = ctx.chosen.unwrap_or(ctx.caster);

    match target {
        FuncTarget::Caster => vec![TargetRef::Servant(ctx.caster)],
        FuncTarget::PtOne => vec![TargetRef::Servant(chosen)],
        FuncTarget::PtAll => (0..front).map(TargetRef::Servant).collect(),
        FuncTarget::PtFull => (0..state.servants.len()).map(TargetRef::Servant).collect(),
        FuncTarget::PtOther => (0..front)
            .filter(|i| *i != ctx.caster)
            .map(TargetRef::Servant)
            .collect(),
        FuncTarget::PtOneOther => (0..front)
            .filter(|i| *i != chosen)
            .map(TargetRef::Servant)
            .collect(),
        FuncTarget::Enemy => ctx
            .main_enemy
            .filter(|i| state.enemies.get(*i).map_or(false, |e| e.is_alive()))
            .or_else(|| state.highest_hp_enemy())
            .map(TargetRef::Enemy)
            .into_iter()
            .collect(),
        FuncTarget::EnemyAll => state
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(i, _)| TargetRef::Enemy(i))
            .collect(),
        FuncTarget::Unsupported(name) => {
            state.warn_unsupported(&format!("target {}", name));
            Vec::new()
        }
    }
}

/// Trait and field requirements of a function against one target
pub fn conditions_hold(state: &GameState, function: &Function, target: TargetRef) -> bool {
    if !function.cond_target.is_empty() {
        let Some(combatant) = state.combatant(target) else {
            return false;
        };
        if !combatant.traits().contains_all(&function.cond_target) {
            return false;
        }
    }
    if !function.field_req.is_empty() {
        let active = state.active_field_traits();
        if !function.field_req.iter().any(|t| active.contains(t)) {
            return false;
        }
    }
    true
}

/// Apply one function to all of its targets
pub fn apply_function(state: &mut GameState, function: &Function, ctx: &EffectContext) {
    let effect = function.effect();
    match &effect {
        Effect::Unsupported(name) => {
            state.warn_unsupported(name);
            return;
        }
        Effect::NoModel(name) => {
            log::debug!("{} has no modelled state, skipping", name);
            return;
        }
        Effect::Damage(_) => {
            log::warn!("Damage function {} outside an NP, skipping", function.func_id);
            return;
        }
        _ => {}
    }

    for target in resolve_targets(state, &function.target, ctx) {
        if !conditions_hold(state, function, target) {
            log::debug!("{:?}: conditions not met for function {}", target, function.func_id);
            continue;
        }
        apply_effect(state, &effect, target, ctx);
    }
}

/// Apply a typed effect to one target
pub fn apply_effect(
    state: &mut GameState,
    effect: &Effect,
    target: TargetRef,
    ctx: &EffectContext,
) {
    match effect {
        Effect::AddState(template) => {
            let mut buff = template.clone();
            buff.source = ctx.source;
            if ctx.source == BuffSource::Skill {
                buff.skill_turn = Some(ctx.turn);
            }
            if let Some(combatant) = state.combatant_mut(target) {
                log::debug!("{} gains {} ({})", combatant.name(), buff.name, buff.value);
                combatant.buffs_mut().add(buff);
            }
        }
        Effect::SubState { traits, limit } => {
            if let Some(combatant) = state.combatant_mut(target) {
                let removed = combatant.buffs_mut().remove_matching(*limit, |b| {
                    traits.iter().any(|t| b.has_individuality(*t))
                });
                log::debug!("{} loses {} buffs", combatant.name(), removed);
            }
        }
        Effect::GainNp { percent } => with_servant(state, target, |s| s.gain_np(*percent)),
        Effect::MultiplyNp { ratio } => {
            with_servant(state, target, |s| s.gain_np(s.np_gauge * (ratio - 1.0)))
        }
        Effect::LossNp { percent } => with_servant(state, target, |s| s.gain_np(-percent)),
        Effect::GainNpPerBuff { percent, traits } => with_servant(state, target, |s| {
            let matches = s
                .buffs
                .iter()
                .filter(|b| traits.iter().any(|t| b.has_individuality(*t)))
                .count();
            s.gain_np(percent * matches as f64);
        }),
        Effect::ShortenSkill { turns } => with_servant(state, target, |s| s.skills.shorten(*turns)),
        Effect::ExtendSkill { turns } => with_servant(state, target, |s| s.skills.extend(*turns)),
        Effect::GainHp { amount } => {
            if let Some(combatant) = state.combatant_mut(target) {
                let hp = combatant.hp() + amount;
                combatant.set_hp(hp);
            }
        }
        Effect::LossHp { amount, safe } => {
            if let Some(combatant) = state.combatant_mut(target) {
                let floor = if *safe { 1 } else { 0 };
                let hp = (combatant.hp() - amount).max(floor.min(combatant.hp()));
                combatant.set_hp(hp);
            }
            if let TargetRef::Servant(i) = target {
                if let Some(servant) = state.servants.get_mut(i) {
                    if servant.hp == 0 {
                        servant.kill = true;
                    }
                }
            }
        }
        Effect::AddField { trait_id, turns } => {
            log::debug!("Field {} added for {} turns", trait_id, turns);
            state.add_field(*trait_id, *turns);
        }
        Effect::TransformServant => {
            // The only modelled transform happens after the NP that grants it
            log::debug!("transformServant on {:?} ignored", target);
        }
        Effect::InstantDeath { rate, forced } => instant_death(state, target, *rate, *forced, ctx),
        Effect::Damage(_) | Effect::NoModel(_) | Effect::Unsupported(_) => {}
    }
}

fn with_servant(
    state: &mut GameState,
    target: TargetRef,
    f: impl FnOnce(&mut crate::game::Servant),
) {
    match target {
        TargetRef::Servant(i) => match state.servants.get_mut(i) {
            Some(servant) => f(servant),
            None => log::debug!("No servant at {}", i),
        },
        TargetRef::Enemy(_) => log::debug!("Servant-only effect aimed at {:?}", target),
    }
}

fn instant_death(
    state: &mut GameState,
    target: TargetRef,
    rate: i64,
    forced: bool,
    ctx: &EffectContext,
) {
    match target {
        TargetRef::Servant(i) => {
            let Some(servant) = state.servants.get_mut(i) else {
                return;
            };
            if forced || frac(rate) > INSTANT_DEATH_THRESHOLD {
                log::info!("{} will fall at the end of the turn", servant.name);
                servant.kill = true;
            }
        }
        TargetRef::Enemy(i) => {
            let chance_mod = state
                .servants
                .get(ctx.caster)
                .map(|s| Stats::resolve(&s.buffs, &s.mods, s.oc_level).death_chance_mod)
                .unwrap_or(0);
            let Some(enemy) = state.enemies.get_mut(i) else {
                return;
            };
            let resist = Stats::resolve_enemy(&enemy.buffs).death_resist_mod;
            let chance = frac(rate)
                * (1.0 + frac(chance_mod))
                * frac(enemy.death_rate)
                * (1.0 - frac(resist)).max(0.0);
            if forced || chance > INSTANT_DEATH_THRESHOLD {
                log::info!("{} is killed instantly ({:.3})", enemy.name, chance);
                enemy.set_hp(0);
            } else {
                log::debug!("{} resists instant death ({:.3})", enemy.name, chance);
            }
        }
    }
}
