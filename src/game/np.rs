//! Noble Phantasm table
//!
//! Every NP function carries a 5x5 scalar matrix: rows are overcharge
//! levels, columns NP levels. The table resolves a function list for any
//! (NP level, OC level) pair on demand.

use serde::{Deserialize, Serialize};

use super::cards::CardType;
use super::function::{Function, NpDamage, Svals};
use super::select::{select, Form};
use crate::data::raw::{RawFunction, RawNoblePhantasm, RawServant};
use crate::data::DataError;

const LEVELS: usize = 5;

/// One NP function with its scalar matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpFunction {
    /// The function with empty scalars
    pub template: Function,
    /// `matrix[oc - 1][np_level - 1]`
    pub matrix: Vec<Vec<Svals>>,
}

impl NpFunction {
    fn from_raw(raw: &RawFunction, np_name: &str) -> Self {
        let matrix = (1..=LEVELS as u8)
            .map(|oc| {
                let row = raw.svals_for_oc(oc);
                if !row.is_empty() && row.len() < LEVELS {
                    log::warn!(
                        "{}: {} has {} scalar columns at OC {}, padding with the last",
                        np_name,
                        raw.func_type,
                        row.len(),
                        oc
                    );
                }
                (0..LEVELS)
                    .map(|level| {
                        row.get(level)
                            .or_else(|| row.last())
                            .map(Svals::from_raw)
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Self {
            template: Function::from_raw(raw, Svals::default()),
            matrix,
        }
    }

    /// The function with scalars for the given levels (both 1-based, clamped)
    pub fn at(&self, np_level: u8, oc_level: u8) -> Function {
        let oc = (oc_level.clamp(1, LEVELS as u8) - 1) as usize;
        let np = (np_level.clamp(1, LEVELS as u8) - 1) as usize;
        let svals = self
            .matrix
            .get(oc)
            .and_then(|row| row.get(np))
            .cloned()
            .unwrap_or_default();
        Function {
            svals,
            ..self.template.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoblePhantasm {
    pub id: u32,
    pub name: String,
    pub card: CardType,
    pub svt_id: Option<u32>,
    /// Percent of total damage dealt by each hit
    pub np_distribution: Vec<u32>,
    /// Per-hit NP gain by NP level, in hundredths of a percent
    pub np_gain: Vec<u32>,
    pub functions: Vec<NpFunction>,
}

impl NoblePhantasm {
    pub fn from_raw(raw: &RawNoblePhantasm) -> Result<Self, DataError> {
        let card = CardType::from_api_name(&raw.card)?;
        Ok(Self {
            id: raw.id,
            name: raw.name.clone(),
            card,
            svt_id: raw.svt_id,
            np_distribution: raw.np_distribution.clone(),
            np_gain: raw.np_gain.np.clone(),
            functions: raw
                .functions
                .iter()
                .map(|f| NpFunction::from_raw(f, &raw.name))
                .collect(),
        })
    }

    /// Select the NP record for `form`.
    ///
    /// When no candidate survives the variant and release filters, the
    /// highest-id candidate is used.
    pub fn build(raw: &RawServant, form: &Form) -> Result<Option<Self>, DataError> {
        let mut candidates = raw.noble_phantasms.for_ascension(form.ascension);
        candidates.extend(raw.np_svts.iter().cloned());

        let chosen = select(&candidates, form).or_else(|| candidates.iter().max_by_key(|c| c.id));
        match chosen {
            Some(np) => Self::from_raw(np).map(Some),
            None => {
                log::warn!("{} has no Noble Phantasm records", raw.name);
                Ok(None)
            }
        }
    }

    /// Function list resolved at the given NP and OC levels
    pub fn values(&self, np_level: u8, oc_level: u8) -> Vec<Function> {
        self.functions
            .iter()
            .map(|f| f.at(np_level, oc_level))
            .collect()
    }

    /// Damage parameters of the first damaging function
    pub fn damage_values(&self, oc_level: u8, np_level: u8) -> Option<NpDamage> {
        self.functions
            .iter()
            .find(|f| f.template.kind.is_damage())
            .map(|f| f.at(np_level, oc_level).np_damage())
    }

    pub fn is_damaging(&self) -> bool {
        self.functions.iter().any(|f| f.template.kind.is_damage())
    }

    /// Per-hit NP gain in percent
    pub fn gain_per_hit(&self, np_level: u8) -> f64 {
        let idx = (np_level.max(1) as usize - 1).min(self.np_gain.len().saturating_sub(1));
        self.np_gain.get(idx).copied().unwrap_or(0) as f64 / 100.0
    }

    /// Hit distribution, a single full hit when the record has none
    pub fn distribution(&self) -> Vec<u32> {
        if self.np_distribution.is_empty() {
            vec![100]
        } else {
            self.np_distribution.clone()
        }
    }
}
