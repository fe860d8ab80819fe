//! Servant entity
//!
//! A servant is built from its raw document plus the user's configuration.
//! Skills, NP and trait layers are derived from the raw data for the current
//! form and rebuilt whenever the form changes.

use std::sync::Arc;

use serde::Serialize;

use super::buffs::{Buff, BuffSource, Buffs};
use super::class::{Attribute, ClassName};
use super::combatant::Combatant;
use super::function::{Effect, Function};
use super::np::NoblePhantasm;
use super::select::Form;
use super::skills::Skills;
use super::traits::{TraitChanges, TraitSet};
use crate::config::{ServantConfig, UserMods};
use crate::data::raw::{trait_ids, RawServant};
use crate::data::DataError;

/// Aoko Aozaki
pub const AOKO_ID: u32 = 413;
/// Aoko's transformed form
pub const SUPER_AOKO_ID: u32 = 4132;

/// Most NP gauge a servant can hold, in percent
pub const MAX_NP_GAUGE: f64 = 300.0;

/// Form a servant turns into after firing its NP, if any
pub fn transform_target(id: u32) -> Option<u32> {
    (id == AOKO_ID).then_some(SUPER_AOKO_ID)
}

/// Whether the servant spends magic bullets on its NP
pub fn uses_magic_bullets(id: u32) -> bool {
    id == AOKO_ID || id == SUPER_AOKO_ID
}

/// A servant in battle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Servant {
    /// Store id (collection number)
    pub id: u32,
    pub name: String,
    pub class_name: ClassName,
    pub attribute: Attribute,
    pub rarity: u32,
    /// Form that drives skill and NP selection
    pub variant_svt_id: u32,
    /// 1-4
    pub ascension: u8,
    pub costume: Option<u32>,
    pub level: u32,
    /// 1-5
    pub np_level: u8,
    /// Base OC level before buffs, 1-5
    pub oc_level: u8,
    /// NP gauge in percent (0-300)
    pub np_gauge: f64,
    pub hp: i64,
    pub max_hp: i64,
    pub atk: f64,
    pub traits: TraitSet,
    pub buffs: Buffs,
    pub skills: Skills,
    pub np: Option<NoblePhantasm>,
    /// Class passive functions at max level
    pub passives: Vec<Function>,
    pub mods: UserMods,
    /// First use of each skill has its cooldown reduced by one
    pub append_5: bool,
    /// Remove from the party at the next end of turn
    pub kill: bool,
    #[serde(skip)]
    config: ServantConfig,
    #[serde(skip)]
    raw: Arc<RawServant>,
}

impl Servant {
    pub fn new(raw: Arc<RawServant>, config: &ServantConfig) -> Result<Self, DataError> {
        let class_name = ClassName::from_api_name(&raw.class_name)?;
        let attribute = Attribute::from_api_name(&raw.attribute)?;
        let level = config.level_for(raw.rarity);
        let ascension = config.ascension.clamp(1, 4);

        let base_atk = growth_at(&raw.atk_growth, level);
        let atk = (base_atk + config.fou_atk as f64) * class_name.base_atk_multiplier();
        let max_hp = growth_at(&raw.hp_growth, level).max(1.0) as i64;

        let mut servant = Self {
            id: config.id,
            name: raw.name.clone(),
            class_name,
            attribute,
            rarity: raw.rarity,
            variant_svt_id: 0,
            ascension,
            costume: config.costume,
            level,
            np_level: config.np_level.clamp(1, 5),
            oc_level: config.oc_level.clamp(1, 5),
            np_gauge: 0.0,
            hp: max_hp,
            max_hp,
            atk,
            traits: TraitSet::new(trait_ids(&raw.traits)),
            buffs: Buffs::new(),
            skills: Skills::default(),
            np: None,
            passives: Vec::new(),
            mods: config.mods,
            append_5: config.append5,
            kill: false,
            config: config.clone(),
            raw,
        };

        servant.refresh_form()?;
        servant.apply_passives(true);
        servant.install_user_mods();
        servant.gain_np(config.initial_charge);

        log::debug!(
            "Built {} ({}): ATK {:.0}, HP {}, NP{} {:?}",
            servant.name,
            servant.id,
            servant.atk,
            servant.max_hp,
            servant.np_level,
            servant.np.as_ref().map(|np| np.card)
        );
        Ok(servant)
    }

    pub fn config(&self) -> &ServantConfig {
        &self.config
    }

    pub fn raw(&self) -> &Arc<RawServant> {
        &self.raw
    }

    /// Game-side id of the base form
    pub fn base_svt_id(&self) -> u32 {
        self.raw.id.unwrap_or(self.id)
    }

    pub fn form(&self) -> Form {
        Form {
            base_svt_id: self.base_svt_id(),
            variant_svt_id: self.variant_svt_id,
            ascension: self.ascension,
            costume: self.costume,
        }
    }

    fn resolve_variant(&self) -> u32 {
        if let Some(costume) = self.costume {
            return costume;
        }
        self.raw
            .limits
            .iter()
            .filter_map(|(k, v)| k.parse::<u8>().ok().map(|k| (k, *v)))
            .filter(|(k, _)| *k <= self.ascension)
            .max_by_key(|(k, _)| *k)
            .map(|(_, v)| v)
            .unwrap_or_else(|| self.base_svt_id())
    }

    /// Recompute everything derived from the form
    fn refresh_form(&mut self) -> Result<(), DataError> {
        self.variant_svt_id = self.resolve_variant();

        let individuality = &self.raw.ascension_add.individuality;
        self.traits
            .apply_ascension(individuality.for_ascension(self.ascension));
        self.traits.apply_costume(
            self.costume
                .map(|c| individuality.for_costume(c))
                .unwrap_or_default(),
        );

        let form = self.form();
        self.skills.rebuild(&self.raw, &form);
        self.np = NoblePhantasm::build(&self.raw, &form)?;
        self.passives = self
            .raw
            .class_passive
            .iter()
            .flat_map(|skill| skill.functions.iter().map(Function::at_max_level))
            .collect();
        Ok(())
    }

    /// Install passive buffs. Gauge-granting passives only apply once, at
    /// construction.
    fn apply_passives(&mut self, first_time: bool) {
        for function in &self.passives {
            match function.effect() {
                Effect::AddState(mut buff) => {
                    buff.turns = -1;
                    buff.source = BuffSource::Passive;
                    self.buffs.add(buff);
                }
                Effect::GainNp { percent } if first_time => {
                    self.np_gauge = (self.np_gauge + percent).clamp(0.0, MAX_NP_GAUGE);
                }
                Effect::GainNp { .. } => {}
                other => log::trace!("{}: passive {:?} not modelled", self.name, other),
            }
        }
    }

    fn install_user_mods(&mut self) {
        for (name, value) in self.mods.entries() {
            self.buffs
                .add(Buff::display_only(name, value, BuffSource::User));
        }
        if self.config.initial_charge > 0.0 {
            self.buffs.add(Buff::display_only(
                "Initial Charge",
                self.config.initial_charge as i64,
                BuffSource::User,
            ));
        }
    }

    /// Switch ascension and costume, rebuilding skills, NP, traits and
    /// passive buffs for the new form
    pub fn change_ascension(
        &mut self,
        ascension: u8,
        costume: Option<u32>,
    ) -> Result<(), DataError> {
        self.ascension = ascension.clamp(1, 4);
        self.costume = costume;
        self.refresh_form()?;

        self.buffs
            .remove_matching(None, |b| b.source == BuffSource::Passive);
        self.apply_passives(false);
        log::debug!(
            "{} now ascension {} (variant {})",
            self.name,
            self.ascension,
            self.variant_svt_id
        );
        Ok(())
    }

    /// Add and remove dynamic traits
    pub fn apply_trait_transformation(&mut self, changes: &TraitChanges) {
        self.traits.apply_changes(changes);
    }

    /// Change the gauge by `percent`, clamped to [0, 300]
    pub fn gain_np(&mut self, percent: f64) {
        self.np_gauge = (self.np_gauge + percent).clamp(0.0, MAX_NP_GAUGE);
    }

    pub fn can_np(&self) -> bool {
        self.np_gauge >= 100.0 && self.np.is_some()
    }

    /// Extra OC levels granted by the gauge: +1 at 200, +2 at 300
    pub fn overcharge_extra(&self) -> u8 {
        ((self.np_gauge / 100.0).floor() as i64 - 1).clamp(0, 2) as u8
    }

    /// Whether the one-shot cooldown reduction applies
    pub fn reduces_first_cooldown(&self) -> bool {
        self.append_5
    }
}

fn growth_at(table: &[u32], level: u32) -> f64 {
    let idx = (level.max(1) as usize - 1).min(table.len().saturating_sub(1));
    match table.get(idx) {
        Some(v) => *v as f64,
        None => {
            log::warn!("Growth table missing, using 0");
            0.0
        }
    }
}

impl Combatant for Servant {
    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> ClassName {
        self.class_name
    }

    fn attribute(&self) -> Attribute {
        self.attribute
    }

    fn traits(&self) -> &TraitSet {
        &self.traits
    }

    fn traits_mut(&mut self) -> &mut TraitSet {
        &mut self.traits
    }

    fn buffs(&self) -> &Buffs {
        &self.buffs
    }

    fn buffs_mut(&mut self) -> &mut Buffs {
        &mut self.buffs
    }

    fn hp(&self) -> i64 {
        self.hp
    }

    fn max_hp(&self) -> i64 {
        self.max_hp
    }

    fn store_hp(&mut self, hp: i64) {
        self.hp = hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn build(doc: serde_json::Value, config: ServantConfig) -> Servant {
        Servant::new(Arc::new(fixtures::raw_servant(doc)), &config).unwrap()
    }

    #[test]
    fn test_atk_from_growth_and_fou() {
        let servant = build(fixtures::caster_support(), ServantConfig::new(314));
        // (11000 + 1000) * 0.9
        assert!((servant.atk - 10800.0).abs() < 1e-9);
        assert_eq!(servant.level, 90);
        assert_eq!(servant.class_name, ClassName::Caster);
    }

    #[test]
    fn test_user_mods_are_display_only() {
        let config = ServantConfig::new(3)
            .with_charge(100.0)
            .with_mods(UserMods {
                damage_up: 150,
                ..Default::default()
            });
        let servant = build(fixtures::saber_arts(), config);

        assert_eq!(servant.np_gauge, 100.0);
        let user: Vec<&Buff> = servant
            .buffs
            .iter()
            .filter(|b| b.source == BuffSource::User)
            .collect();
        assert_eq!(user.len(), 2);
        assert!(user.iter().all(|b| b.is_display_only() && b.turns == -1 && b.value == 0));
    }

    #[test]
    fn test_passives_are_permanent() {
        let servant = build(fixtures::caster_support(), ServantConfig::new(314));
        let passive = servant
            .buffs
            .iter()
            .find(|b| b.source == BuffSource::Passive)
            .unwrap();
        assert_eq!(passive.name, "Debuff Resist Up");
        assert_eq!(passive.turns, -1);
    }

    #[test]
    fn test_gauge_clamps() {
        let mut servant = build(fixtures::caster_support(), ServantConfig::new(314));
        servant.gain_np(500.0);
        assert_eq!(servant.np_gauge, 300.0);
        assert_eq!(servant.overcharge_extra(), 2);
        servant.gain_np(-1000.0);
        assert_eq!(servant.np_gauge, 0.0);
        assert_eq!(servant.overcharge_extra(), 0);
    }

    #[test]
    fn test_overcharge_extra_by_gauge() {
        let mut servant = build(fixtures::caster_support(), ServantConfig::new(314));
        for (gauge, extra) in [(100.0, 0), (199.0, 0), (200.0, 1), (300.0, 2)] {
            servant.np_gauge = gauge;
            assert_eq!(servant.overcharge_extra(), extra);
        }
    }

    #[test]
    fn test_costume_change_rebuilds_skills() {
        let config = ServantConfig::new(1).with_ascension(1, Some(800102));
        let mut mash = build(fixtures::shielder_with_costumes(), config);
        assert_eq!(mash.variant_svt_id, 800102);
        assert_eq!(mash.skills.slot(0).unwrap().skill.name, "Kenzoku no Tate");
        assert!(mash.traits.contains(9001));

        mash.change_ascension(1, None).unwrap();
        assert_eq!(mash.variant_svt_id, 800100);
        assert_eq!(mash.skills.slot(0).unwrap().skill.name, "Honorable Shield");
        assert!(!mash.traits.contains(9001));
        assert!(mash.traits.is_consistent());

        mash.change_ascension(1, Some(800101)).unwrap();
        assert_eq!(mash.skills.slot(0).unwrap().skill.name, "Black Barrel");
    }

    #[test]
    fn test_ascension_change_swaps_np_and_traits() {
        let config = ServantConfig::new(1).with_ascension(1, None);
        let mut mash = build(fixtures::shielder_with_costumes(), config);
        assert_eq!(mash.np.as_ref().unwrap().name, "Lord Chaldeas");
        assert!(mash.traits.contains(8001));

        mash.change_ascension(4, None).unwrap();
        assert_eq!(mash.np.as_ref().unwrap().name, "Lord Camelot");
        assert!(!mash.traits.contains(8001));
        assert!(mash.traits.contains(8004));
        assert_eq!(
            mash.buffs
                .iter()
                .filter(|b| b.source == BuffSource::Passive)
                .count(),
            1
        );
    }

    #[test]
    fn test_trait_transformation_round_trip() {
        let mut servant = build(fixtures::caster_support(), ServantConfig::new(314));
        let before = servant.traits.clone();
        servant.apply_trait_transformation(&TraitChanges {
            add: vec![77],
            remove: vec![],
        });
        assert!(servant.traits.contains(77));
        servant.apply_trait_transformation(&TraitChanges {
            add: vec![],
            remove: vec![77],
        });
        assert_eq!(servant.traits, before);
    }

    #[test]
    fn test_hp_clamps() {
        let mut servant = build(fixtures::caster_support(), ServantConfig::new(314));
        servant.set_hp(servant.max_hp + 500);
        assert_eq!(servant.hp, servant.max_hp);
        servant.set_hp(-5);
        assert_eq!(servant.hp, 0);
        assert!(!servant.is_alive());
    }

    #[test]
    fn test_transform_target() {
        assert_eq!(transform_target(AOKO_ID), Some(SUPER_AOKO_ID));
        assert_eq!(transform_target(SUPER_AOKO_ID), None);
        assert!(uses_magic_bullets(SUPER_AOKO_ID));
    }
}
