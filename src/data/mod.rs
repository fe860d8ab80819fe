//! External data contract
//!
//! The engine never talks to a database directly. Servant, quest and
//! mystic code documents come from a [`DataStore`]; [`MemoryStore`] is the
//! in-process implementation used by tests and embedders that already hold
//! the documents.

pub mod raw;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};

pub use raw::{RawMysticCode, RawQuest, RawServant};

use crate::game::servant::transform_target;

/// Source of raw game documents
pub trait DataStore: Send + Sync {
    fn servant(&self, id: u32) -> Result<RawServant, DataError>;
    fn quest(&self, id: u32) -> Result<RawQuest, DataError>;
    fn mystic_code(&self, id: u32) -> Result<RawMysticCode, DataError>;
}

/// Documents held in memory, keyed by id
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    servants: HashMap<u32, Value>,
    quests: HashMap<u32, Value>,
    mystic_codes: HashMap<u32, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_servant(&mut self, id: u32, doc: Value) {
        self.servants.insert(id, unwrap_envelopes(doc));
    }

    pub fn insert_quest(&mut self, id: u32, doc: Value) {
        self.quests.insert(id, unwrap_envelopes(doc));
    }

    pub fn insert_mystic_code(&mut self, id: u32, doc: Value) {
        self.mystic_codes.insert(id, unwrap_envelopes(doc));
    }

    pub fn with_servant(mut self, id: u32, doc: Value) -> Self {
        self.insert_servant(id, doc);
        self
    }

    pub fn with_quest(mut self, id: u32, doc: Value) -> Self {
        self.insert_quest(id, doc);
        self
    }

    pub fn with_mystic_code(mut self, id: u32, doc: Value) -> Self {
        self.insert_mystic_code(id, doc);
        self
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    id: u32,
    doc: &Value,
) -> Result<T, DataError> {
    serde_json::from_value(doc.clone()).map_err(|source| DataError::Malformed { kind, id, source })
}

impl DataStore for MemoryStore {
    fn servant(&self, id: u32) -> Result<RawServant, DataError> {
        let doc = self.servants.get(&id).ok_or(DataError::ServantNotFound(id))?;
        decode("servant", id, doc)
    }

    fn quest(&self, id: u32) -> Result<RawQuest, DataError> {
        let doc = self.quests.get(&id).ok_or(DataError::QuestNotFound(id))?;
        decode("quest", id, doc)
    }

    fn mystic_code(&self, id: u32) -> Result<RawMysticCode, DataError> {
        let doc = self
            .mystic_codes
            .get(&id)
            .ok_or(DataError::MysticCodeNotFound(id))?;
        decode("mystic code", id, doc)
    }
}

/// Replace `{"$numberInt": "1"}`-style envelopes with plain numbers
pub fn unwrap_envelopes(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(number) = envelope_number(&map) {
                    return number;
                }
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, unwrap_envelopes(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_envelopes).collect()),
        other => other,
    }
}

fn envelope_number(map: &Map<String, Value>) -> Option<Value> {
    let (key, inner) = map.iter().next()?;
    let text = inner.as_str()?;
    match key.as_str() {
        "$numberInt" | "$numberLong" => text.parse::<i64>().ok().map(Value::from),
        "$numberDouble" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

/// Raw servant documents a run may need, shared between state copies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    servants: BTreeMap<u32, Arc<RawServant>>,
}

impl Catalog {
    /// Load the given servants plus any form they can transform into.
    ///
    /// A missing team member is fatal; a missing transform target is only
    /// reported, since the run may never reach the transform.
    pub fn load(store: &dyn DataStore, ids: &[u32]) -> Result<Self, DataError> {
        let mut catalog = Self::default();
        for &id in ids {
            if catalog.servants.contains_key(&id) {
                continue;
            }
            catalog.insert(id, store.servant(id)?);

            if let Some(target) = transform_target(id) {
                match store.servant(target) {
                    Ok(raw) => catalog.insert(target, raw),
                    Err(e) => log::warn!("Transform data for {} unavailable: {}", target, e),
                }
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, id: u32, raw: RawServant) {
        self.servants.insert(id, Arc::new(raw));
    }

    pub fn get(&self, id: u32) -> Option<Arc<RawServant>> {
        self.servants.get(&id).cloned()
    }
}

/// Data store errors
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Servant {0} not found in data store")]
    ServantNotFound(u32),
    #[error("Quest {0} not found in data store")]
    QuestNotFound(u32),
    #[error("Mystic code {0} not found in data store")]
    MysticCodeNotFound(u32),
    #[error("Malformed {kind} document {id}: {source}")]
    Malformed {
        kind: &'static str,
        id: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown class name: {0}")]
    UnknownClass(String),
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("Unknown card type: {0}")]
    UnknownCard(String),
}
