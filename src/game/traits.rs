//! Trait (individuality) sets
//!
//! A combatant's traits come from four layers: the base record, the current
//! ascension, the equipped costume, and dynamic changes made in battle. The
//! active set is always the union of the four.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Traits to add and remove in one transformation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitChanges {
    #[serde(default)]
    pub add: Vec<u32>,
    #[serde(default)]
    pub remove: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitSet {
    base: BTreeSet<u32>,
    ascension: BTreeSet<u32>,
    costume: BTreeSet<u32>,
    dynamic: BTreeSet<u32>,
    active: BTreeSet<u32>,
}

impl TraitSet {
    pub fn new(base: impl IntoIterator<Item = u32>) -> Self {
        let mut set = Self {
            base: base.into_iter().collect(),
            ..Default::default()
        };
        set.recompute();
        set
    }

    pub fn contains(&self, id: u32) -> bool {
        self.active.contains(&id)
    }

    pub fn contains_all(&self, ids: &[u32]) -> bool {
        ids.iter().all(|id| self.contains(*id))
    }

    pub fn contains_any(&self, ids: &[u32]) -> bool {
        ids.iter().any(|id| self.contains(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.active.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Replace the ascension layer
    pub fn apply_ascension(&mut self, traits: impl IntoIterator<Item = u32>) {
        self.ascension = traits.into_iter().collect();
        self.recompute();
    }

    /// Replace the costume layer (empty when no costume is equipped)
    pub fn apply_costume(&mut self, traits: impl IntoIterator<Item = u32>) {
        self.costume = traits.into_iter().collect();
        self.recompute();
    }

    /// Mutate the dynamic layer only
    pub fn apply_changes(&mut self, changes: &TraitChanges) {
        for id in &changes.add {
            self.dynamic.insert(*id);
        }
        for id in &changes.remove {
            self.dynamic.remove(id);
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.active = self
            .base
            .iter()
            .chain(&self.ascension)
            .chain(&self.costume)
            .chain(&self.dynamic)
            .copied()
            .collect();
    }

    /// Whether the cached union matches its layers
    pub fn is_consistent(&self) -> bool {
        let union: BTreeSet<u32> = self
            .base
            .union(&self.ascension)
            .chain(self.costume.iter())
            .chain(self.dynamic.iter())
            .copied()
            .collect();
        union == self.active
    }
}
