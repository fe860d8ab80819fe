//! Raw document shapes
//!
//! These mirror the JSON documents served by the upstream data store. They
//! are immutable once loaded; everything the engine mutates is derived from
//! them in `crate::game`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A trait (individuality) reference as it appears in documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrait {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

/// Collect the ids of a trait list
pub fn trait_ids(traits: &[RawTrait]) -> Vec<u32> {
    traits.iter().map(|t| t.id).collect()
}

/// Candidate records for a skill slot or NP, in one of the three layouts
/// the store produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidates<T> {
    /// Every candidate in a single list
    Flat(Vec<T>),
    /// One list per ascension, starting at ascension 1
    ByAscension(Vec<Vec<T>>),
    /// Blocks keyed by the first ascension they apply to
    Blocks(BTreeMap<String, Vec<T>>),
}

impl<T> Default for Candidates<T> {
    fn default() -> Self {
        Candidates::Flat(Vec::new())
    }
}

impl<T: Clone> Candidates<T> {
    /// The candidate records visible at the given ascension
    pub fn for_ascension(&self, ascension: u8) -> Vec<T> {
        match self {
            Candidates::Flat(records) => records.clone(),
            Candidates::ByAscension(lists) => {
                if lists.is_empty() {
                    return Vec::new();
                }
                let idx = (ascension.max(1) as usize - 1).min(lists.len() - 1);
                lists[idx].clone()
            }
            Candidates::Blocks(blocks) => {
                let mut keyed: Vec<(u32, &Vec<T>)> = blocks
                    .iter()
                    .filter_map(|(k, v)| k.parse::<u32>().ok().map(|k| (k, v)))
                    .collect();
                keyed.sort_by_key(|(k, _)| *k);

                keyed
                    .iter()
                    .rev()
                    .find(|(k, _)| *k <= ascension as u32)
                    .or_else(|| keyed.first())
                    .map(|(_, v)| (*v).clone())
                    .unwrap_or_default()
            }
        }
    }
}

/// A servant document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawServant {
    /// Game-side svt id of the base form
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub collection_no: u32,
    #[serde(default)]
    pub name: String,
    pub class_name: String,
    #[serde(default)]
    pub class_id: u32,
    pub attribute: String,
    #[serde(default)]
    pub rarity: u32,
    #[serde(default)]
    pub atk_growth: Vec<u32>,
    #[serde(default)]
    pub hp_growth: Vec<u32>,
    #[serde(default)]
    pub traits: Vec<RawTrait>,
    #[serde(default)]
    pub cards: Vec<String>,
    #[serde(default)]
    pub skills: Candidates<RawSkill>,
    #[serde(default)]
    pub noble_phantasms: Candidates<RawNoblePhantasm>,
    #[serde(default)]
    pub class_passive: Vec<RawSkill>,
    #[serde(default)]
    pub ascension_add: RawAscensionAdd,
    /// Extra skill candidates belonging to other variants
    #[serde(default)]
    pub skill_svts: Vec<RawSkill>,
    /// Extra NP candidates belonging to other variants
    #[serde(default)]
    pub np_svts: Vec<RawNoblePhantasm>,
    /// Ascension -> variant svt id
    #[serde(default)]
    pub limits: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAscensionAdd {
    #[serde(default)]
    pub individuality: RawLayeredTraits,
}

/// Trait lists keyed by ascension number or costume id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLayeredTraits {
    #[serde(default)]
    pub ascension: BTreeMap<String, Vec<RawTrait>>,
    #[serde(default)]
    pub costume: BTreeMap<String, Vec<RawTrait>>,
}

impl RawLayeredTraits {
    pub fn for_ascension(&self, ascension: u8) -> Vec<u32> {
        self.ascension
            .get(&ascension.to_string())
            .map(|t| trait_ids(t))
            .unwrap_or_default()
    }

    pub fn for_costume(&self, costume: u32) -> Vec<u32> {
        self.costume
            .get(&costume.to_string())
            .map(|t| trait_ids(t))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReleaseCondition {
    pub cond_type: String,
    #[serde(default)]
    pub cond_num: i64,
    #[serde(default)]
    pub cond_group: u32,
}

/// A skill record (servant skill, class passive or mystic code skill)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSkill {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub num: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub svt_id: Option<u32>,
    #[serde(default)]
    pub cool_down: Vec<u32>,
    #[serde(default)]
    pub release_conditions: Vec<RawReleaseCondition>,
    #[serde(default)]
    pub functions: Vec<RawFunction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNpGain {
    #[serde(default)]
    pub np: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNoblePhantasm {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub num: u32,
    #[serde(default)]
    pub name: String,
    pub card: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub svt_id: Option<u32>,
    #[serde(default)]
    pub np_distribution: Vec<u32>,
    #[serde(default)]
    pub np_gain: RawNpGain,
    #[serde(default)]
    pub release_conditions: Vec<RawReleaseCondition>,
    #[serde(default)]
    pub functions: Vec<RawFunction>,
}

pub type RawSvals = Map<String, Value>;

/// One effect function inside a skill or NP
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFunction {
    #[serde(default)]
    pub func_id: u32,
    pub func_type: String,
    #[serde(default)]
    pub func_target_type: String,
    #[serde(default)]
    pub functvals: Vec<RawTrait>,
    #[serde(default, rename = "funcquestTvals")]
    pub funcquest_tvals: Vec<RawTrait>,
    #[serde(default)]
    pub trait_vals: Vec<RawTrait>,
    #[serde(default)]
    pub buffs: Vec<RawBuff>,
    #[serde(default)]
    pub svals: Vec<RawSvals>,
    #[serde(default)]
    pub svals2: Vec<RawSvals>,
    #[serde(default)]
    pub svals3: Vec<RawSvals>,
    #[serde(default)]
    pub svals4: Vec<RawSvals>,
    #[serde(default)]
    pub svals5: Vec<RawSvals>,
}

impl RawFunction {
    /// Scalar rows for an overcharge level (1-5)
    pub fn svals_for_oc(&self, oc_level: u8) -> &[RawSvals] {
        let row = match oc_level {
            0 | 1 => &self.svals,
            2 => &self.svals2,
            3 => &self.svals3,
            4 => &self.svals4,
            _ => &self.svals5,
        };
        // Functions that do not scale with overcharge only carry `svals`
        if row.is_empty() {
            &self.svals
        } else {
            row
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBuff {
    pub name: String,
    #[serde(default, rename = "type")]
    pub buff_type: String,
    #[serde(default)]
    pub vals: Vec<RawTrait>,
    #[serde(default)]
    pub tvals: Vec<RawTrait>,
}

/// A quest document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuest {
    pub id: u32,
    #[serde(default)]
    pub individuality: Vec<RawTrait>,
    #[serde(default)]
    pub stages: Vec<RawStage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStage {
    #[serde(default)]
    pub enemies: Vec<RawEnemy>,
    #[serde(default)]
    pub individuality: Vec<RawTrait>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnemy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub svt: Option<RawEnemySvt>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
    pub hp: i64,
    #[serde(default)]
    pub death_rate: i64,
    #[serde(default)]
    pub traits: Vec<RawTrait>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnemySvt {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub traits: Vec<RawTrait>,
}

/// A mystic code document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMysticCode {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skills: Vec<RawSkill>,
}
