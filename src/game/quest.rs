//! Quest and waves

use serde::Serialize;

use super::enemy::Enemy;
use crate::data::raw::{trait_ids, RawQuest};
use crate::data::DataError;

/// One enemy group and the field traits active while it is up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wave {
    pub enemies: Vec<Enemy>,
    pub field_traits: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quest {
    pub id: u32,
    pub waves: Vec<Wave>,
}

impl Quest {
    pub fn from_raw(raw: &RawQuest) -> Result<Self, DataError> {
        let quest_traits = trait_ids(&raw.individuality);
        let waves = raw
            .stages
            .iter()
            .map(|stage| {
                let enemies = stage
                    .enemies
                    .iter()
                    .map(Enemy::from_raw)
                    .collect::<Result<Vec<_>, _>>()?;
                let mut field_traits = quest_traits.clone();
                for t in trait_ids(&stage.individuality) {
                    if !field_traits.contains(&t) {
                        field_traits.push(t);
                    }
                }
                Ok(Wave {
                    enemies,
                    field_traits,
                })
            })
            .collect::<Result<Vec<_>, DataError>>()?;

        if waves.is_empty() {
            log::warn!("Quest {} has no stages", raw.id);
        }
        Ok(Self { id: raw.id, waves })
    }

    pub fn total_waves(&self) -> usize {
        self.waves.len()
    }

    /// Wave by 1-based index
    pub fn wave(&self, index: usize) -> Option<&Wave> {
        index.checked_sub(1).and_then(|i| self.waves.get(i))
    }
}
