//! Effect functions
//!
//! Skills and NPs are lists of functions. A [`Function`] is one function with
//! its scalars already resolved for a skill level or an (OC, NP level) pair.
//! [`Function::effect`] turns it into a typed [`Effect`] that the engine
//! dispatches on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::buffs::Buff;
use crate::data::raw::{trait_ids, RawFunction, RawSvals};

/// Scalar parameters of a function at one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Svals(BTreeMap<String, Value>);

impl Svals {
    pub fn from_raw(raw: &RawSvals) -> Self {
        Self(raw.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        let value = self.0.get(key)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
    }

    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.int(key).unwrap_or(default)
    }

    /// A list-valued scalar; a single number reads as a one-element list
    pub fn ints(&self, key: &str) -> Vec<i64> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_i64).collect(),
            Some(_) => self.int(key).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// Upstream `funcType`, parsed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuncType {
    AddState,
    AddStateShort,
    SubState,
    GainNp,
    GainMultiplyNp,
    LossNp,
    GainNpBuffIndividualSum,
    ShortenSkill,
    ExtendSkill,
    GainHp,
    LossHp,
    LossHpSafe,
    AddFieldChangeToField,
    TransformServant,
    InstantDeath,
    ForceInstantDeath,
    DamageNp,
    DamageNpPierce,
    DamageNpIndividual,
    DamageNpIndividualSum,
    DamageNpStateIndividualFix,
    /// Recognised, but touches state the engine does not model
    NoModel(String),
    Unsupported(String),
}

impl FuncType {
    pub fn parse(name: &str) -> Self {
        match name {
            "addState" => FuncType::AddState,
            "addStateShort" => FuncType::AddStateShort,
            "subState" => FuncType::SubState,
            "gainNp" => FuncType::GainNp,
            "gainMultiplyNp" => FuncType::GainMultiplyNp,
            "lossNp" => FuncType::LossNp,
            "gainNpBuffIndividualSum" => FuncType::GainNpBuffIndividualSum,
            "shortenSkill" => FuncType::ShortenSkill,
            "extendSkill" => FuncType::ExtendSkill,
            "gainHp" => FuncType::GainHp,
            "lossHp" => FuncType::LossHp,
            "lossHpSafe" => FuncType::LossHpSafe,
            "addFieldChangeToField" => FuncType::AddFieldChangeToField,
            "transformServant" => FuncType::TransformServant,
            "instantDeath" => FuncType::InstantDeath,
            "forceInstantDeath" => FuncType::ForceInstantDeath,
            "damageNp" => FuncType::DamageNp,
            "damageNpPierce" => FuncType::DamageNpPierce,
            "damageNpIndividual" => FuncType::DamageNpIndividual,
            "damageNpIndividualSum" => FuncType::DamageNpIndividualSum,
            "damageNpStateIndividualFix" => FuncType::DamageNpStateIndividualFix,
            "gainStar" | "lossStar" | "cardReset" | "none" | "eventDropUp"
            | "eventPointUp" | "expUp" | "qpUp" | "friendPointUp" => {
                FuncType::NoModel(name.to_string())
            }
            other => FuncType::Unsupported(other.to_string()),
        }
    }

    pub fn is_damage(&self) -> bool {
        matches!(
            self,
            FuncType::DamageNp
                | FuncType::DamageNpPierce
                | FuncType::DamageNpIndividual
                | FuncType::DamageNpIndividualSum
                | FuncType::DamageNpStateIndividualFix
        )
    }
}

/// Upstream `funcTargetType`, parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuncTarget {
    /// The caster
    Caster,
    /// One chosen ally
    PtOne,
    /// Every frontline ally
    PtAll,
    /// Frontline and bench
    PtFull,
    /// Frontline except the caster
    PtOther,
    /// Frontline except the chosen ally
    PtOneOther,
    /// The highest-HP enemy
    Enemy,
    /// Every enemy
    EnemyAll,
    Unsupported(String),
}

impl FuncTarget {
    pub fn parse(name: &str) -> Self {
        match name {
            "self" => FuncTarget::Caster,
            "ptOne" | "ptselectOneSub" => FuncTarget::PtOne,
            "ptAll" => FuncTarget::PtAll,
            "ptFull" => FuncTarget::PtFull,
            "ptOther" => FuncTarget::PtOther,
            "ptOneOther" => FuncTarget::PtOneOther,
            "enemy" => FuncTarget::Enemy,
            "enemyAll" | "enemyFull" => FuncTarget::EnemyAll,
            other => FuncTarget::Unsupported(other.to_string()),
        }
    }
}

/// Buff shape a state-adding function applies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffTemplate {
    pub name: String,
    pub buff_type: String,
    pub vals: Vec<u32>,
    pub tvals: Vec<u32>,
}

/// A function with resolved scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub func_id: u32,
    pub kind: FuncType,
    pub target: FuncTarget,
    /// Traits a target must carry (all of them)
    pub cond_target: Vec<u32>,
    /// Field traits of which at least one must be active
    pub field_req: Vec<u32>,
    /// Traits a state-removing function matches on
    pub trait_vals: Vec<u32>,
    pub buff: Option<BuffTemplate>,
    pub svals: Svals,
}

impl Function {
    pub fn from_raw(raw: &RawFunction, svals: Svals) -> Self {
        Self {
            func_id: raw.func_id,
            kind: FuncType::parse(&raw.func_type),
            target: FuncTarget::parse(&raw.func_target_type),
            cond_target: trait_ids(&raw.functvals),
            field_req: trait_ids(&raw.funcquest_tvals),
            trait_vals: trait_ids(&raw.trait_vals),
            buff: raw.buffs.first().map(|b| BuffTemplate {
                name: b.name.clone(),
                buff_type: b.buff_type.clone(),
                vals: trait_ids(&b.vals),
                tvals: trait_ids(&b.tvals),
            }),
            svals,
        }
    }

    /// Resolve with level-10 scalars (the last `svals` row)
    pub fn at_max_level(raw: &RawFunction) -> Self {
        let svals = raw.svals.last().map(Svals::from_raw).unwrap_or_else(|| {
            log::warn!("Function {} ({}) has no scalars", raw.func_id, raw.func_type);
            Svals::default()
        });
        Self::from_raw(raw, svals)
    }

    /// Selectable branch this function belongs to, if any
    pub fn choice_index(&self) -> Option<usize> {
        self.svals.int("ChoiceIndex").map(|i| i.max(0) as usize)
    }

    /// Typed view of what the function does
    pub fn effect(&self) -> Effect {
        let value = self.svals.int_or("Value", 0);
        match &self.kind {
            FuncType::AddState | FuncType::AddStateShort => match &self.buff {
                Some(template) => Effect::AddState(self.build_buff(template)),
                None => Effect::Unsupported(format!("{:?} without buff", self.kind)),
            },
            FuncType::SubState => Effect::SubState {
                traits: self.trait_vals.clone(),
                limit: (value > 0).then_some(value as usize),
            },
            FuncType::GainNp => Effect::GainNp {
                percent: value as f64 / 100.0,
            },
            FuncType::GainMultiplyNp => Effect::MultiplyNp {
                ratio: 1.0 + value as f64 / 1000.0,
            },
            FuncType::LossNp => Effect::LossNp {
                percent: value as f64 / 100.0,
            },
            FuncType::GainNpBuffIndividualSum => Effect::GainNpPerBuff {
                percent: value as f64 / 100.0,
                traits: self.list("TargetList"),
            },
            FuncType::ShortenSkill => Effect::ShortenSkill {
                turns: value.max(0) as u32,
            },
            FuncType::ExtendSkill => Effect::ExtendSkill {
                turns: value.max(0) as u32,
            },
            FuncType::GainHp => Effect::GainHp { amount: value },
            FuncType::LossHp => Effect::LossHp {
                amount: value,
                safe: false,
            },
            FuncType::LossHpSafe => Effect::LossHp {
                amount: value,
                safe: true,
            },
            FuncType::AddFieldChangeToField => {
                let trait_id = self.svals.int("FieldIndividuality").unwrap_or(value);
                Effect::AddField {
                    trait_id: trait_id.max(0) as u32,
                    turns: self.svals.int_or("Turn", -1) as i32,
                }
            }
            FuncType::TransformServant => Effect::TransformServant,
            FuncType::InstantDeath => Effect::InstantDeath {
                rate: self.svals.int_or("Rate", 1000),
                forced: false,
            },
            FuncType::ForceInstantDeath => Effect::InstantDeath {
                rate: 1000,
                forced: true,
            },
            kind if kind.is_damage() => Effect::Damage(self.np_damage()),
            FuncType::NoModel(name) => Effect::NoModel(name.clone()),
            FuncType::Unsupported(name) => Effect::Unsupported(name.clone()),
            other => Effect::Unsupported(format!("{:?}", other)),
        }
    }

    fn list(&self, key: &str) -> Vec<u32> {
        self.svals
            .ints(key)
            .into_iter()
            .filter_map(|i| u32::try_from(i).ok())
            .collect()
    }

    fn build_buff(&self, template: &BuffTemplate) -> Buff {
        let count = self
            .svals
            .int("Count")
            .filter(|c| *c >= 0)
            .map(|c| c as u32);
        Buff {
            name: template.name.clone(),
            buff_type: template.buff_type.clone(),
            value: self.svals.int_or("Value", 0),
            display_value: None,
            turns: self.svals.int_or("Turn", -1) as i32,
            count,
            tvals: template.tvals.clone(),
            vals: template.vals.clone(),
            functvals: self.cond_target.clone(),
            source: super::buffs::BuffSource::Unknown,
            svals: self.svals.clone(),
            skill_turn: None,
        }
    }

    /// Damage parameters of an NP damage function
    pub fn np_damage(&self) -> NpDamage {
        let multiplier = self.svals.int_or("Value", 0) as f64 / 1000.0;
        let correction = self.svals.int_or("Correction", 1000) as f64 / 1000.0;
        let single = || self.list("Target");

        let super_effective = match self.kind {
            FuncType::DamageNpIndividual => Some(SuperEffective {
                kind: SuperEffectiveKind::Trait,
                init: correction,
                step: 0.0,
                ids: single(),
                side: CountSide::Target,
                max_count: None,
            }),
            FuncType::DamageNpStateIndividualFix => Some(SuperEffective {
                kind: SuperEffectiveKind::State,
                init: correction,
                step: 0.0,
                ids: single(),
                side: CountSide::Target,
                max_count: None,
            }),
            FuncType::DamageNpIndividualSum => Some(SuperEffective {
                kind: SuperEffectiveKind::Sum,
                init: self.svals.int_or("Value2", 1000) as f64 / 1000.0,
                step: correction,
                ids: self.list("TargetList"),
                side: if self.svals.int_or("Target", 0) == 0 {
                    CountSide::Caster
                } else {
                    CountSide::Target
                },
                max_count: self
                    .svals
                    .int("ParamAddMaxCount")
                    .filter(|c| *c > 0)
                    .map(|c| c as u32),
            }),
            _ => None,
        };

        NpDamage {
            multiplier,
            super_effective,
        }
    }
}

/// How a super-effective NP counts matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuperEffectiveKind {
    /// Bonus if the target carries one of the traits
    Trait,
    /// Bonus if the target carries a buff with one of the individualities
    State,
    /// Bonus growing with the number of matching traits and buffs
    Sum,
}

/// Whose traits and buffs a super-effective NP counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountSide {
    Caster,
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperEffective {
    pub kind: SuperEffectiveKind,
    pub init: f64,
    pub step: f64,
    pub ids: Vec<u32>,
    pub side: CountSide,
    pub max_count: Option<u32>,
}

impl SuperEffective {
    /// Multiplier for a given number of matches
    pub fn multiplier(&self, matches: u32) -> f64 {
        let matches = match self.max_count {
            Some(cap) => matches.min(cap),
            None => matches,
        };
        match self.kind {
            SuperEffectiveKind::Trait | SuperEffectiveKind::State => {
                if matches > 0 {
                    self.init
                } else {
                    1.0
                }
            }
            SuperEffectiveKind::Sum => self.init.max(1.0 + self.step * matches as f64),
        }
    }
}

/// NP damage parameters at one (OC, NP level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpDamage {
    pub multiplier: f64,
    pub super_effective: Option<SuperEffective>,
}

/// What a function does, with typed parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AddState(Buff),
    SubState { traits: Vec<u32>, limit: Option<usize> },
    GainNp { percent: f64 },
    MultiplyNp { ratio: f64 },
    LossNp { percent: f64 },
    GainNpPerBuff { percent: f64, traits: Vec<u32> },
    ShortenSkill { turns: u32 },
    ExtendSkill { turns: u32 },
    GainHp { amount: i64 },
    LossHp { amount: i64, safe: bool },
    AddField { trait_id: u32, turns: i32 },
    TransformServant,
    InstantDeath { rate: i64, forced: bool },
    Damage(NpDamage),
    NoModel(String),
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn function(doc: Value) -> Function {
        let raw: RawFunction = serde_json::from_value(doc).unwrap();
        Function::at_max_level(&raw)
    }

    #[test]
    fn test_add_state_builds_buff() {
        let f = function(json!({
            "funcType": "addState",
            "funcTargetType": "ptAll",
            "buffs": [{"name": "ATK Up", "type": "upAtk", "tvals": []}],
            "svals": [
                {"Rate": 1000, "Turn": 3, "Count": -1, "Value": 100},
                {"Rate": 1000, "Turn": 3, "Count": -1, "Value": 200},
            ],
        }));
        assert_eq!(f.target, FuncTarget::PtAll);
        match f.effect() {
            Effect::AddState(buff) => {
                assert_eq!(buff.name, "ATK Up");
                assert_eq!(buff.value, 200);
                assert_eq!(buff.turns, 3);
                assert_eq!(buff.count, None);
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_gain_np_percent() {
        let f = function(json!({
            "funcType": "gainNp",
            "funcTargetType": "ptOne",
            "svals": [{"Value": 3000}, {"Value": 5000}],
        }));
        assert_eq!(f.effect(), Effect::GainNp { percent: 50.0 });
    }

    #[test]
    fn test_unknown_function_type() {
        let f = function(json!({"funcType": "someFutureThing", "svals": [{}]}));
        assert_eq!(f.kind, FuncType::Unsupported("someFutureThing".into()));
        assert!(matches!(f.effect(), Effect::Unsupported(_)));
    }

    #[test]
    fn test_sum_super_effective() {
        let f = function(json!({
            "funcType": "damageNpIndividualSum",
            "funcTargetType": "enemyAll",
            "svals": [{
                "Value": 4500, "Correction": 100, "Value2": 1000,
                "TargetList": [2885], "Target": 0, "ParamAddMaxCount": 10
            }],
        }));
        let damage = f.np_damage();
        assert_eq!(damage.multiplier, 4.5);
        let se = damage.super_effective.unwrap();
        assert_eq!(se.side, CountSide::Caster);
        assert_eq!(se.ids, vec![2885]);
        assert!((se.multiplier(5) - 1.5).abs() < 1e-9);
        assert!((se.multiplier(30) - 2.0).abs() < 1e-9);
        assert_eq!(se.multiplier(0), 1.0);
    }

    #[test]
    fn test_trait_super_effective() {
        let f = function(json!({
            "funcType": "damageNpIndividual",
            "svals": [{"Value": 3000, "Correction": 1500, "Target": 2002}],
        }));
        let se = f.np_damage().super_effective.unwrap();
        assert_eq!(se.multiplier(1), 1.5);
        assert_eq!(se.multiplier(0), 1.0);
    }
}
