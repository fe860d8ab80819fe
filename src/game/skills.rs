//! Servant skill table
//!
//! Three slots, each holding the level-10 record selected for the current
//! form and its cooldown.

use serde::{Deserialize, Serialize};

use super::function::Function;
use super::select::{select, Form};
use crate::data::raw::{RawServant, RawSkill};

/// A skill resolved at level 10
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: u32,
    pub name: String,
    pub svt_id: Option<u32>,
    /// Cooldown after use
    pub cooldown_max: u32,
    pub functions: Vec<Function>,
}

impl Skill {
    pub fn from_raw(raw: &RawSkill) -> Self {
        Self {
            id: raw.id,
            name: raw.name.clone(),
            svt_id: raw.svt_id,
            cooldown_max: raw.cool_down.last().copied().unwrap_or(0),
            functions: raw.functions.iter().map(Function::at_max_level).collect(),
        }
    }
}

/// A skill slot and its cooldown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSlot {
    pub skill: Skill,
    /// Current cooldown (0 = ready)
    pub cooldown: u32,
    /// Whether the one-shot cooldown reduction has been spent
    pub reduction_spent: bool,
}

impl SkillSlot {
    /// Check if the skill is ready to use
    pub fn is_ready(&self) -> bool {
        self.cooldown == 0
    }

    /// Put the skill on cooldown, spending the one-shot reduction if granted
    pub fn start_cooldown(&mut self, reduce_first_use: bool) {
        self.cooldown = self.skill.cooldown_max;
        if reduce_first_use && !self.reduction_spent {
            self.cooldown = self.cooldown.saturating_sub(1);
            self.reduction_spent = true;
        }
    }

    /// Reduce cooldown by 1 turn
    pub fn tick_cooldown(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    slots: [Option<SkillSlot>; 3],
}

impl Skills {
    /// Select every slot's record for `form`
    pub fn build(raw: &RawServant, form: &Form) -> Self {
        let mut candidates = raw.skills.for_ascension(form.ascension);
        candidates.extend(raw.skill_svts.iter().cloned());

        let mut skills = Self::default();
        for (idx, slot) in skills.slots.iter_mut().enumerate() {
            let num = idx as u32 + 1;
            let for_slot: Vec<RawSkill> =
                candidates.iter().filter(|s| s.num == num).cloned().collect();

            *slot = select(&for_slot, form).map(|raw| SkillSlot {
                skill: Skill::from_raw(raw),
                cooldown: 0,
                reduction_spent: false,
            });
            if slot.is_none() {
                log::debug!("{}: no skill selected for slot {}", raw.name, num);
            }
        }
        skills
    }

    /// Re-select records for a new form, keeping cooldown state per slot
    pub fn rebuild(&mut self, raw: &RawServant, form: &Form) {
        let mut next = Self::build(raw, form);
        for (new, old) in next.slots.iter_mut().zip(&self.slots) {
            if let (Some(new), Some(old)) = (new.as_mut(), old.as_ref()) {
                new.cooldown = old.cooldown.min(new.skill.cooldown_max);
                new.reduction_spent = old.reduction_spent;
            }
        }
        *self = next;
    }

    pub fn slot(&self, idx: usize) -> Option<&SkillSlot> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut SkillSlot> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillSlot> {
        self.slots.iter().flatten()
    }

    /// Tick all skill cooldowns
    pub fn tick_cooldowns(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.tick_cooldown();
        }
    }

    /// Subtract `turns` from every cooldown
    pub fn shorten(&mut self, turns: u32) {
        for slot in self.slots.iter_mut().flatten() {
            slot.cooldown = slot.cooldown.saturating_sub(turns);
        }
    }

    /// Add `turns` to every running cooldown, capped at each slot's maximum.
    /// Ready skills stay ready.
    pub fn extend(&mut self, turns: u32) {
        for slot in self.slots.iter_mut().flatten() {
            if slot.cooldown > 0 {
                slot.cooldown = (slot.cooldown + turns).min(slot.skill.cooldown_max);
            }
        }
    }

    pub fn cooldowns(&self) -> [u32; 3] {
        let mut out = [0; 3];
        for (cd, slot) in out.iter_mut().zip(&self.slots) {
            *cd = slot.as_ref().map_or(0, |s| s.cooldown);
        }
        out
    }

    /// Carry cooldowns over from another form
    pub fn restore_cooldowns(&mut self, cooldowns: [u32; 3]) {
        for (slot, cd) in self.slots.iter_mut().zip(cooldowns) {
            if let Some(slot) = slot {
                slot.cooldown = cd.min(slot.skill.cooldown_max);
            }
        }
    }
}
