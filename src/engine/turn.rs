//! Turn manager
//!
//! Resolves the end of a turn: end-of-turn triggers, deaths, wave
//! advancement and the buff/cooldown tick.

use serde::Serialize;

use super::triggers::process_end_of_turn;
use super::ActionError;
use crate::game::combatant::Combatant;
use crate::game::state::GameState;

/// What ending the turn led to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnOutcome {
    /// The next wave (1-based) is up
    NextWave(usize),
    /// The last wave was cleared
    Cleared,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TurnManager;

impl TurnManager {
    pub fn new() -> Self {
        Self
    }

    /// End the turn. Refused while any enemy of the wave is standing.
    pub fn end_turn(&self, state: &mut GameState) -> Result<TurnOutcome, ActionError> {
        if state.finished {
            return Err(ActionError::RunFinished);
        }
        let standing = state.enemies.iter().filter(|e| e.is_alive()).count();
        if standing > 0 {
            return Err(ActionError::EnemiesRemaining(standing));
        }

        process_end_of_turn(state);
        state.remove_killed();

        let outcome = if state.wave >= state.total_waves() {
            state.decrement();
            state.finished = true;
            log::info!("Quest {} cleared on turn {}", state.quest.id, state.turn);
            TurnOutcome::Cleared
        } else {
            state.get_next_wave();
            state.decrement();
            TurnOutcome::NextWave(state.wave)
        };
        state.turn += 1;
        Ok(outcome)
    }
}
