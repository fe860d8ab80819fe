//! Command execution
//!
//! Maps a parsed [`Command`] onto the combat engine.

use super::token::Command;
use crate::engine::{ActionError, CombatEngine, TurnOutcome};
use crate::game::GameState;

/// Run one command against the state. Returns the turn outcome for `#`.
pub fn execute(
    engine: &mut CombatEngine,
    state: &mut GameState,
    command: Command,
) -> Result<Option<TurnOutcome>, ActionError> {
    log::debug!("Turn {} wave {}: {}", state.turn, state.wave, command);
    match command {
        Command::Skill {
            servant,
            skill,
            target,
            choice,
        } => engine.use_skill(state, servant, skill, target, choice)?,
        Command::MysticCode {
            slot,
            target,
            choice,
        } => engine.use_mystic_code_skill(state, slot, target, choice)?,
        Command::Swap { frontline, bench } => engine.swap_servants(state, frontline, bench)?,
        Command::SwapDefault => engine.swap_default(state)?,
        Command::NoblePhantasm { servant } => engine.use_np(state, servant)?,
        Command::EndTurn => return engine.end_turn(state).map(Some),
    }
    Ok(None)
}
