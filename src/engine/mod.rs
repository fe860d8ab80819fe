//! Combat engine
//!
//! Applies player actions to a [`GameState`]: skills, mystic code skills,
//! party swaps, Noble Phantasms and the end of a turn. Every action either
//! applies fully or is refused with an [`ActionError`] before it mutates
//! anything.

pub mod damage;
pub mod effects;
pub mod np;
pub mod roll;
pub mod skill;
pub mod triggers;
pub mod turn;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::game::GameState;

pub use np::NpManager;
pub use roll::DamageRoll;
pub use skill::SkillManager;
pub use turn::{TurnManager, TurnOutcome};

/// Why an action was refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("Skill {slot} of servant {servant} is on cooldown ({remaining} turns)")]
    OnCooldown {
        servant: usize,
        slot: usize,
        remaining: u32,
    },
    #[error("Mystic code skill {slot} is on cooldown ({remaining} turns)")]
    McOnCooldown { slot: usize, remaining: u32 },
    #[error("Servant {servant} cannot fire its NP (gauge {gauge:.1}%)")]
    NpNotReady { servant: usize, gauge: f64 },
    #[error("{0} enemies still standing")]
    EnemiesRemaining(usize),
    #[error("Cannot swap frontline {frontline} with bench {bench}")]
    InvalidSwap { frontline: usize, bench: usize },
    #[error("No ally at target index {0}")]
    InvalidTarget(usize),
    #[error("No skill at slot {0}")]
    InvalidSlot(usize),
    #[error("Swap needs a frontline and a bench index")]
    NoSwapTarget,
    #[error("Choice {index} out of range for {num} options")]
    InvalidChoice { num: usize, index: usize },
    #[error("The run is already finished")]
    RunFinished,
}

/// A selectable branch of a skill: pick `index` (0-based) out of `num`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub num: usize,
    pub index: usize,
}

impl Choice {
    pub fn new(num: usize, index: usize) -> Self {
        Self { num, index }
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        if self.index >= self.num {
            return Err(ActionError::InvalidChoice {
                num: self.num,
                index: self.index,
            });
        }
        Ok(())
    }
}

/// The managers of one run plus its damage roll
#[derive(Debug, Clone, Default)]
pub struct CombatEngine {
    skills: SkillManager,
    nps: NpManager,
    turns: TurnManager,
}

impl CombatEngine {
    pub fn new(roll: DamageRoll) -> Self {
        Self {
            skills: SkillManager::new(),
            nps: NpManager::new(roll),
            turns: TurnManager::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(DamageRoll::from_mode(settings.roll))
    }

    fn ensure_running(state: &GameState) -> Result<(), ActionError> {
        if state.finished {
            return Err(ActionError::RunFinished);
        }
        Ok(())
    }

    /// Use skill `slot` (0-2) of frontline servant `servant` (0-2)
    pub fn use_skill(
        &self,
        state: &mut GameState,
        servant: usize,
        slot: usize,
        target: Option<usize>,
        choice: Option<Choice>,
    ) -> Result<(), ActionError> {
        Self::ensure_running(state)?;
        self.skills.use_skill(state, servant, slot, target, choice)
    }

    pub fn use_mystic_code_skill(
        &self,
        state: &mut GameState,
        slot: usize,
        target: Option<usize>,
        choice: Option<Choice>,
    ) -> Result<(), ActionError> {
        Self::ensure_running(state)?;
        self.skills.use_mystic_code_skill(state, slot, target, choice)
    }

    /// Swap frontline `frontline` with bench `bench`, both 0-based
    pub fn swap_servants(
        &self,
        state: &mut GameState,
        frontline: usize,
        bench: usize,
    ) -> Result<(), ActionError> {
        Self::ensure_running(state)?;
        self.skills.swap_servants(state, frontline, bench)
    }

    /// A swap without positions has no defined target
    pub fn swap_default(&self, state: &mut GameState) -> Result<(), ActionError> {
        Self::ensure_running(state)?;
        Err(ActionError::NoSwapTarget)
    }

    pub fn use_np(&mut self, state: &mut GameState, servant: usize) -> Result<(), ActionError> {
        Self::ensure_running(state)?;
        self.nps.use_np(state, servant)
    }

    pub fn end_turn(&self, state: &mut GameState) -> Result<TurnOutcome, ActionError> {
        Self::ensure_running(state)?;
        self.turns.end_turn(state)
    }
}
