//! Mystic code
//!
//! Three shared skills with their own cooldowns. Some mystic codes replace
//! their third skill with a frontline/bench position swap.

use serde::Serialize;

use super::skills::{Skill, SkillSlot};
use crate::data::raw::RawMysticCode;

/// Mystic codes whose third skill swaps party positions
pub const SWAP_MYSTIC_CODES: [u32; 2] = [20, 260];

/// Cooldown used for the swap when the document carries none
const DEFAULT_SWAP_COOLDOWN: u32 = 10;

/// What a mystic code slot does
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum McSkill {
    Effect(SkillSlot),
    /// Position swap between a frontline and a bench member
    Swap { cooldown: u32, cooldown_max: u32 },
}

impl McSkill {
    pub fn cooldown(&self) -> u32 {
        match self {
            McSkill::Effect(slot) => slot.cooldown,
            McSkill::Swap { cooldown, .. } => *cooldown,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown() == 0
    }

    pub fn start_cooldown(&mut self) {
        match self {
            McSkill::Effect(slot) => slot.start_cooldown(false),
            McSkill::Swap {
                cooldown,
                cooldown_max,
            } => *cooldown = *cooldown_max,
        }
    }

    pub fn tick_cooldown(&mut self) {
        match self {
            McSkill::Effect(slot) => slot.tick_cooldown(),
            McSkill::Swap { cooldown, .. } => *cooldown = cooldown.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MysticCode {
    pub id: u32,
    pub name: String,
    pub skills: Vec<McSkill>,
}

impl MysticCode {
    pub fn from_raw(raw: &RawMysticCode) -> Self {
        let mut records = raw.skills.clone();
        records.sort_by_key(|s| s.num);

        let swaps = SWAP_MYSTIC_CODES.contains(&raw.id);
        let skills = records
            .iter()
            .take(3)
            .enumerate()
            .map(|(idx, record)| {
                let skill = Skill::from_raw(record);
                if swaps && idx == 2 {
                    let cooldown_max = if skill.cooldown_max > 0 {
                        skill.cooldown_max
                    } else {
                        DEFAULT_SWAP_COOLDOWN
                    };
                    McSkill::Swap {
                        cooldown: 0,
                        cooldown_max,
                    }
                } else {
                    McSkill::Effect(SkillSlot {
                        skill,
                        cooldown: 0,
                        reduction_spent: false,
                    })
                }
            })
            .collect();

        Self {
            id: raw.id,
            name: raw.name.clone(),
            skills,
        }
    }

    pub fn slot(&self, idx: usize) -> Option<&McSkill> {
        self.skills.get(idx)
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut McSkill> {
        self.skills.get_mut(idx)
    }

    /// Index of the swap slot, if this mystic code has one
    pub fn swap_slot(&self) -> Option<usize> {
        self.skills
            .iter()
            .position(|s| matches!(s, McSkill::Swap { .. }))
    }

    pub fn tick_cooldowns(&mut self) {
        for skill in &mut self.skills {
            skill.tick_cooldown();
        }
    }
}
