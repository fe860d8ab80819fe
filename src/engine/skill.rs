//! Skill manager
//!
//! Servant skills, mystic code skills and party swaps.

use super::effects::{apply_function, EffectContext};
use super::{ActionError, Choice};
use crate::game::buffs::BuffSource;
use crate::game::function::Function;
use crate::game::mystic_code::McSkill;
use crate::game::state::{GameState, FRONTLINE};

/// Applies skills to a game state
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillManager;

/// Functions of the selected branch plus the unbranched ones
fn functions_for_choice(functions: &[Function], choice: Option<Choice>) -> Vec<Function> {
    let picked = choice.map_or(0, |c| c.index);
    functions
        .iter()
        .filter(|f| f.choice_index().map_or(true, |i| i == picked))
        .cloned()
        .collect()
}

fn check_target(state: &GameState, target: Option<usize>) -> Result<(), ActionError> {
    match target {
        Some(t) if t >= state.frontline().len() => Err(ActionError::InvalidTarget(t)),
        _ => Ok(()),
    }
}

impl SkillManager {
    pub fn new() -> Self {
        Self
    }

    /// Use skill `slot` of frontline servant `servant`. `target` is the
    /// frontline index picked for single-ally functions.
    pub fn use_skill(
        &self,
        state: &mut GameState,
        servant: usize,
        slot: usize,
        target: Option<usize>,
        choice: Option<Choice>,
    ) -> Result<(), ActionError> {
        if servant >= state.frontline().len() {
            return Err(ActionError::InvalidSlot(slot));
        }
        let skill_slot = state.servants[servant]
            .skills
            .slot(slot)
            .ok_or(ActionError::InvalidSlot(slot))?;
        check_target(state, target)?;
        if let Some(choice) = choice {
            choice.validate()?;
        }
        if !skill_slot.is_ready() {
            return Err(ActionError::OnCooldown {
                servant,
                slot,
                remaining: skill_slot.cooldown,
            });
        }

        let functions = functions_for_choice(&skill_slot.skill.functions, choice);
        let name = skill_slot.skill.name.clone();

        let caster = &mut state.servants[servant];
        let reduce = caster.reduces_first_cooldown();
        if let Some(slot) = caster.skills.slot_mut(slot) {
            slot.start_cooldown(reduce);
        }
        log::debug!("{} uses {} (target {:?})", caster.name, name, target);

        let ctx = EffectContext::new(servant, BuffSource::Skill, state.turn).with_chosen(target);
        for function in &functions {
            apply_function(state, function, &ctx);
        }
        Ok(())
    }

    /// Use mystic code skill `slot`. Single-ally functions hit `target`, or
    /// the first frontline servant when none is given.
    pub fn use_mystic_code_skill(
        &self,
        state: &mut GameState,
        slot: usize,
        target: Option<usize>,
        choice: Option<Choice>,
    ) -> Result<(), ActionError> {
        let skill = state
            .mystic_code
            .slot(slot)
            .ok_or(ActionError::InvalidSlot(slot))?;
        let McSkill::Effect(effect) = skill else {
            return Err(ActionError::NoSwapTarget);
        };
        check_target(state, target)?;
        if let Some(choice) = choice {
            choice.validate()?;
        }
        if !effect.is_ready() {
            return Err(ActionError::McOnCooldown {
                slot,
                remaining: effect.cooldown,
            });
        }

        let functions = functions_for_choice(&effect.skill.functions, choice);
        log::debug!("Mystic code uses {} (target {:?})", effect.skill.name, target);
        if let Some(skill) = state.mystic_code.slot_mut(slot) {
            skill.start_cooldown();
        }

        let ctx = EffectContext::new(target.unwrap_or(0), BuffSource::Skill, state.turn)
            .with_chosen(target);
        for function in &functions {
            apply_function(state, function, &ctx);
        }
        Ok(())
    }

    /// Swap frontline `frontline` with bench `bench` (both 0-based). Spends
    /// the mystic code's swap skill when it has one.
    pub fn swap_servants(
        &self,
        state: &mut GameState,
        frontline: usize,
        bench: usize,
    ) -> Result<(), ActionError> {
        let invalid = ActionError::InvalidSwap { frontline, bench };
        if frontline >= state.frontline().len() || FRONTLINE + bench >= state.servants.len() {
            return Err(invalid);
        }

        match state.mystic_code.swap_slot() {
            Some(slot) => {
                let remaining = state.mystic_code.skills[slot].cooldown();
                if remaining > 0 {
                    return Err(ActionError::McOnCooldown { slot, remaining });
                }
                state.mystic_code.skills[slot].start_cooldown();
            }
            None => log::debug!(
                "Mystic code {} has no swap skill, swapping positions directly",
                state.mystic_code.id
            ),
        }

        if !state.swap_servants(frontline, bench) {
            return Err(invalid);
        }
        Ok(())
    }
}
