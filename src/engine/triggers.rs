//! Buff triggers
//!
//! Count-limited buffs are spent when the action they modify happens.
//! A handful of named buffs also act at the end of every turn.

use crate::game::buffs::{Buff, BuffSource, Buffs, MAGIC_BULLET, MAGIC_BULLET_TRAIT};
use crate::game::cards::CardType;
use crate::game::servant::{Servant, SUPER_AOKO_ID};
use crate::game::state::{GameState, FRONTLINE};
use crate::game::stats::{classify, StatKey};

pub const NP_GAIN_EACH_TURN: &str = "NP Gain Each Turn";
pub const DELAYED_DEATH: &str = "Delayed Effect (Death)";

/// Bullets the transformed form loads every turn
const BULLETS_PER_TURN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// The holder fired an NP of this card
    NoblePhantasm(CardType),
}

/// Whether the buff takes part in the event
pub fn fires(buff: &Buff, event: TriggerEvent) -> bool {
    if buff.is_display_only() {
        return false;
    }
    let Some((key, _)) = classify(buff) else {
        return false;
    };
    match event {
        TriggerEvent::NoblePhantasm(card) => match key {
            StatKey::Atk
            | StatKey::NpDamage
            | StatKey::BoostNpDamage
            | StatKey::Power
            | StatKey::NpGain
            | StatKey::CardDamageUp(None) => true,
            StatKey::CardUp(c) | StatKey::CardDamageUp(Some(c)) => c == card,
            _ => false,
        },
    }
}

/// Spend one use of every count-limited buff the event fires. Returns the
/// number of depleted entries.
pub fn consume_counts(buffs: &mut Buffs, event: TriggerEvent) -> usize {
    let mut depleted = 0;
    let mut idx = 0;
    while idx < buffs.len() {
        let fired = buffs
            .get(idx)
            .map_or(false, |b| b.count.is_some() && fires(b, event));
        if fired && buffs.consume_at(idx) {
            depleted += 1;
            continue;
        }
        idx += 1;
    }
    depleted
}

/// A fresh magic bullet
pub fn magic_bullet() -> Buff {
    Buff::new(MAGIC_BULLET, 0, -1)
        .with_tvals(vec![MAGIC_BULLET_TRAIT])
        .with_source(BuffSource::System)
}

fn end_of_turn_servant(servant: &mut Servant) {
    let charge: i64 = servant
        .buffs
        .iter()
        .filter(|b| b.name == NP_GAIN_EACH_TURN)
        .map(|b| b.value)
        .sum();
    if charge != 0 {
        servant.gain_np(charge as f64 / 100.0);
        log::debug!("{} charges {:.2}% at end of turn", servant.name, charge as f64 / 100.0);
    }

    if servant.buffs.has(DELAYED_DEATH) {
        log::info!("{}: delayed death takes effect", servant.name);
        servant.kill = true;
    }

    if servant.id == SUPER_AOKO_ID {
        for _ in 0..BULLETS_PER_TURN {
            servant.buffs.add(magic_bullet());
        }
    }
}

/// End-of-turn triggers for every frontline servant
pub fn process_end_of_turn(state: &mut GameState) {
    let front = state.servants.len().min(FRONTLINE);
    for servant in &mut state.servants[..front] {
        end_of_turn_servant(servant);
    }
}
