//! Variant-aware record selection
//!
//! Servants that change form (ascension, costume, transformation) carry
//! several candidate records for the same skill slot or NP. The rule is the
//! same for both: keep the records of the current variant, drop the ones
//! whose release conditions fail, then take the highest priority and break
//! ties on the highest id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::raw::{RawNoblePhantasm, RawReleaseCondition, RawSkill};

/// The form a servant is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// Base svt id of the record, used when no candidate carries the variant
    pub base_svt_id: u32,
    pub variant_svt_id: u32,
    pub ascension: u8,
    pub costume: Option<u32>,
}

/// A record that takes part in selection
pub trait Candidate {
    fn id(&self) -> u32;
    fn priority(&self) -> i32;
    fn svt_id(&self) -> Option<u32>;
    fn release_conditions(&self) -> &[RawReleaseCondition];
}

impl Candidate for RawSkill {
    fn id(&self) -> u32 {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn svt_id(&self) -> Option<u32> {
        self.svt_id
    }

    fn release_conditions(&self) -> &[RawReleaseCondition] {
        &self.release_conditions
    }
}

impl Candidate for RawNoblePhantasm {
    fn id(&self) -> u32 {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn svt_id(&self) -> Option<u32> {
        self.svt_id
    }

    fn release_conditions(&self) -> &[RawReleaseCondition] {
        &self.release_conditions
    }
}

fn condition_met(cond: &RawReleaseCondition, form: &Form) -> bool {
    match cond.cond_type.as_str() {
        "limitCount" | "limitCountAbove" => form.ascension as i64 >= cond.cond_num,
        "limitCountBelow" => form.ascension as i64 <= cond.cond_num,
        "equipWithTargetCostume" => form.costume.map(i64::from) == Some(cond.cond_num),
        "notEquipWithTargetCostume" => form.costume.map(i64::from) != Some(cond.cond_num),
        other => {
            log::trace!("Release condition {} treated as satisfied", other);
            true
        }
    }
}

/// Groups are OR-combined, conditions inside a group AND-combined
pub fn conditions_met(conditions: &[RawReleaseCondition], form: &Form) -> bool {
    if conditions.is_empty() {
        return true;
    }

    let mut groups: BTreeMap<u32, Vec<&RawReleaseCondition>> = BTreeMap::new();
    for cond in conditions {
        groups.entry(cond.cond_group).or_default().push(cond);
    }

    groups
        .values()
        .any(|group| group.iter().all(|cond| condition_met(cond, form)))
}

/// Pick the record for the given form
pub fn select<'a, T: Candidate>(candidates: &'a [T], form: &Form) -> Option<&'a T> {
    let carries = |svt: u32| candidates.iter().any(|c| c.svt_id() == Some(svt));

    // Fall back to the base form's records when the variant has none of
    // its own (costumes that only restyle some slots)
    let wanted = if carries(form.variant_svt_id) {
        form.variant_svt_id
    } else {
        form.base_svt_id
    };

    candidates
        .iter()
        .filter(|c| c.svt_id().map_or(true, |svt| svt == wanted))
        .filter(|c| conditions_met(c.release_conditions(), form))
        .max_by_key(|c| (c.priority(), c.id()))
}
