//! Game state representation
//!
//! Owns everything a run mutates: the party, the enemies of the current
//! wave, the mystic code and field effects. The state is plain data, so a
//! clone is an independent snapshot.

use std::collections::BTreeSet;

use serde::Serialize;

use super::buffs::BuffSource;
use super::combatant::Combatant;
use super::enemy::Enemy;
use super::mystic_code::MysticCode;
use super::quest::Quest;
use super::servant::{transform_target, Servant};
use crate::config::TeamConfig;
use crate::data::{Catalog, DataError, DataStore};

/// Number of frontline slots
pub const FRONTLINE: usize = 3;

/// A combatant addressed by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetRef {
    /// Party index (frontline first)
    Servant(usize),
    /// Index into the current wave
    Enemy(usize),
}

/// A field trait added during battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEffect {
    pub trait_id: u32,
    /// Remaining turns, -1 permanent
    pub turns: i32,
}

/// One NP's damage on one enemy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageEvent {
    pub turn: u32,
    pub wave: usize,
    pub caster_id: u32,
    pub enemy: usize,
    pub damage: f64,
    /// NP refunded to the caster, in percent
    pub refund: f64,
    pub overkill_hits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    /// Party, frontline first
    pub servants: Vec<Servant>,
    pub mystic_code: MysticCode,
    pub quest: Quest,
    /// Current wave, 1-based
    pub wave: usize,
    pub enemies: Vec<Enemy>,
    pub fields: Vec<FieldEffect>,
    /// Current turn, 1-based
    pub turn: u32,
    /// Set once the last wave is cleared
    pub finished: bool,
    pub damage_log: Vec<DamageEvent>,
    #[serde(skip)]
    catalog: Catalog,
    #[serde(skip)]
    warned: BTreeSet<String>,
}

impl GameState {
    pub fn new(
        servants: Vec<Servant>,
        mystic_code: MysticCode,
        quest: Quest,
        catalog: Catalog,
    ) -> Self {
        let enemies = quest.wave(1).map(|w| w.enemies.clone()).unwrap_or_default();
        Self {
            servants,
            mystic_code,
            quest,
            wave: 1,
            enemies,
            fields: Vec::new(),
            turn: 1,
            finished: false,
            damage_log: Vec::new(),
            catalog,
            warned: BTreeSet::new(),
        }
    }

    /// Build every entity from the store
    pub fn build(
        store: &dyn DataStore,
        team: &TeamConfig,
        quest_id: u32,
        mystic_code_id: u32,
    ) -> Result<Self, DataError> {
        let catalog = Catalog::load(store, &team.ids())?;
        let servants = team
            .servants
            .iter()
            .map(|config| {
                let raw = catalog
                    .get(config.id)
                    .ok_or(DataError::ServantNotFound(config.id))?;
                Servant::new(raw, config)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let quest = Quest::from_raw(&store.quest(quest_id)?)?;
        let mystic_code = MysticCode::from_raw(&store.mystic_code(mystic_code_id)?);

        log::info!(
            "State built: {} servants, quest {} ({} waves), mystic code {}",
            servants.len(),
            quest.id,
            quest.total_waves(),
            mystic_code.id
        );
        Ok(Self::new(servants, mystic_code, quest, catalog))
    }

    pub fn get_enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn frontline(&self) -> &[Servant] {
        &self.servants[..self.servants.len().min(FRONTLINE)]
    }

    pub fn bench(&self) -> &[Servant] {
        &self.servants[self.servants.len().min(FRONTLINE)..]
    }

    pub fn total_waves(&self) -> usize {
        self.quest.total_waves()
    }

    pub fn enemies_alive(&self) -> bool {
        self.enemies.iter().any(|e| e.is_alive())
    }

    /// Advance to the next wave. Returns false on the last wave.
    pub fn get_next_wave(&mut self) -> bool {
        let Some(next) = self.quest.wave(self.wave + 1) else {
            return false;
        };
        self.enemies = next.enemies.clone();
        self.wave += 1;
        log::info!("Wave {}/{}", self.wave, self.total_waves());
        true
    }

    /// Swap frontline slot `frontline` with bench slot `bench` (both
    /// 0-based). Returns false when either index is out of range.
    pub fn swap_servants(&mut self, frontline: usize, bench: usize) -> bool {
        let bench_idx = FRONTLINE + bench;
        if frontline >= self.frontline().len() || bench_idx >= self.servants.len() {
            return false;
        }
        self.servants.swap(frontline, bench_idx);
        log::debug!(
            "Swapped {} in for {}",
            self.servants[frontline].name,
            self.servants[bench_idx].name
        );
        true
    }

    /// Replace the servant at `idx` with its transformed form, carrying
    /// over buffs, cooldowns and gauge. Returns false when the servant has
    /// no transform or its data is unavailable.
    pub fn transform_aoko(&mut self, idx: usize) -> Result<bool, DataError> {
        let Some(current) = self.servants.get(idx) else {
            return Ok(false);
        };
        let Some(target) = transform_target(current.id) else {
            return Ok(false);
        };
        let Some(raw) = self.catalog.get(target) else {
            log::warn!("{} cannot transform: no data for {}", current.name, target);
            return Ok(false);
        };

        let mut config = current.config().clone();
        config.id = target;
        config.costume = None;
        config.initial_charge = 0.0;
        let mut next = Servant::new(raw, &config)?;

        let cooldowns = current.skills.cooldowns();
        next.skills.restore_cooldowns(cooldowns);
        next.np_gauge = current.np_gauge;
        next.hp = current.hp.min(next.max_hp);
        next.kill = current.kill;

        let mut buffs = next.buffs.clone();
        buffs.remove_matching(None, |b| b.source == BuffSource::User);
        for buff in current.buffs.iter().filter(|b| b.source != BuffSource::Passive) {
            buffs.add(buff.clone());
        }
        next.buffs = buffs;

        log::info!("{} transformed into {}", current.name, next.name);
        self.servants[idx] = next;
        Ok(true)
    }

    /// Field traits of the current wave plus those added in battle
    pub fn active_field_traits(&self) -> Vec<u32> {
        let mut traits: Vec<u32> = self
            .quest
            .wave(self.wave)
            .map(|w| w.field_traits.clone())
            .unwrap_or_default();
        for field in &self.fields {
            if !traits.contains(&field.trait_id) {
                traits.push(field.trait_id);
            }
        }
        traits
    }

    pub fn add_field(&mut self, trait_id: u32, turns: i32) {
        self.fields.push(FieldEffect { trait_id, turns });
    }

    /// Remove the servant at `idx`. A frontline vacancy is filled by the
    /// first bench member, which takes the same slot.
    pub fn remove_servant(&mut self, idx: usize) -> Option<Servant> {
        if idx >= self.servants.len() {
            return None;
        }
        if idx < FRONTLINE && self.servants.len() > FRONTLINE {
            let promoted = self.servants.remove(FRONTLINE);
            log::info!("{} moves up to slot {}", promoted.name, idx + 1);
            Some(std::mem::replace(&mut self.servants[idx], promoted))
        } else {
            Some(self.servants.remove(idx))
        }
    }

    /// Remove every servant flagged for death
    pub fn remove_killed(&mut self) -> Vec<Servant> {
        let mut removed = Vec::new();
        while let Some(idx) = self.servants.iter().position(|s| s.kill) {
            if let Some(servant) = self.remove_servant(idx) {
                log::info!("{} has fallen", servant.name);
                removed.push(servant);
            }
        }
        removed
    }

    /// Index of the living enemy with the most HP, first in spawn order on
    /// ties
    pub fn highest_hp_enemy(&self) -> Option<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .fold(None, |best: Option<(usize, i64)>, (idx, e)| match best {
                Some((_, hp)) if hp >= e.hp => best,
                _ => Some((idx, e.hp)),
            })
            .map(|(idx, _)| idx)
    }

    pub fn combatant(&self, target: TargetRef) -> Option<&dyn Combatant> {
        match target {
            TargetRef::Servant(i) => self.servants.get(i).map(|s| s as &dyn Combatant),
            TargetRef::Enemy(i) => self.enemies.get(i).map(|e| e as &dyn Combatant),
        }
    }

    pub fn combatant_mut(&mut self, target: TargetRef) -> Option<&mut dyn Combatant> {
        match target {
            TargetRef::Servant(i) => self
                .servants
                .get_mut(i)
                .map(|s| s as &mut dyn Combatant),
            TargetRef::Enemy(i) => self.enemies.get_mut(i).map(|e| e as &mut dyn Combatant),
        }
    }

    /// Log an unsupported function type once per run
    pub fn warn_unsupported(&mut self, name: &str) {
        if self.warned.insert(name.to_string()) {
            log::warn!("Unsupported function type {}, skipping", name);
        }
    }

    /// End-of-turn tick: buffs on every combatant, frontline and mystic
    /// code cooldowns, field durations
    pub fn decrement(&mut self) {
        for servant in &mut self.servants {
            servant.buffs.decrement();
        }
        for enemy in &mut self.enemies {
            enemy.buffs.decrement();
        }
        let front = self.servants.len().min(FRONTLINE);
        for servant in &mut self.servants[..front] {
            servant.skills.tick_cooldowns();
        }
        self.mystic_code.tick_cooldowns();

        for field in &mut self.fields {
            if field.turns > 0 {
                field.turns -= 1;
            }
        }
        self.fields.retain(|f| f.turns != 0);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
