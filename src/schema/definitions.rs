use super::reference::{namespaced_key, DEFINITIONS_KEY};
use crate::config::CollisionPolicy;
use crate::error::{ConsolidationError, ConsolidationResult};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Harvested definitions keyed by `<document-stem>_<definition-name>`.
///
/// Keys are kept sorted so the merged output does not depend on the order
/// in which documents were harvested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionTable {
    entries: BTreeMap<String, Value>,
}

/// Counts produced by [`DefinitionTable::merge_into`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Harvested entries added under a key the root did not use
    pub inserted: usize,
    /// Root entries replaced by harvested ones
    pub overwritten: usize,
    /// Harvested entries dropped in favour of root entries
    pub kept_root: usize,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` for `name` declared in `filename`, returning its key.
    /// Re-inserting the same definition replaces it.
    pub fn insert(&mut self, filename: &str, name: &str, value: Value) -> String {
        let key = namespaced_key(filename, name);
        debug!("Added definition: {}", key);
        self.entries.insert(key.clone(), value);
        key
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merge every entry into `root["definitions"]`, creating the field when
    /// absent. Collisions with entries the root already declares are settled
    /// by `policy`.
    pub fn merge_into(
        &self,
        root: &mut Value,
        policy: CollisionPolicy,
    ) -> ConsolidationResult<MergeOutcome> {
        let mut outcome = MergeOutcome::default();
        let Value::Object(root_map) = root else {
            warn!(
                "Resolved root is not an object; {} harvested definitions cannot be attached",
                self.entries.len()
            );
            return Ok(outcome);
        };

        if policy == CollisionPolicy::Reject {
            if let Some(Value::Object(existing)) = root_map.get(DEFINITIONS_KEY) {
                let collisions: Vec<&str> = self
                    .entries
                    .keys()
                    .filter(|key| existing.contains_key(key.as_str()))
                    .map(String::as_str)
                    .collect();
                if !collisions.is_empty() {
                    return Err(ConsolidationError::DefinitionCollision(format!(
                        "root already defines {}",
                        collisions.join(", ")
                    )));
                }
            }
        }

        let definitions = root_map
            .entry(DEFINITIONS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !definitions.is_object() {
            warn!("Root '{}' field is not an object; replacing it", DEFINITIONS_KEY);
            *definitions = Value::Object(Map::new());
        }
        let Value::Object(definitions) = definitions else {
            return Ok(outcome);
        };

        for (key, value) in &self.entries {
            match (definitions.contains_key(key), policy) {
                (false, _) => {
                    definitions.insert(key.clone(), value.clone());
                    outcome.inserted += 1;
                }
                (true, CollisionPolicy::RootWins) => {
                    debug!("Keeping root definition '{}'", key);
                    outcome.kept_root += 1;
                }
                (true, _) => {
                    warn!("Harvested definition '{}' overwrites the root's entry", key);
                    definitions.insert(key.clone(), value.clone());
                    outcome.overwritten += 1;
                }
            }
        }

        Ok(outcome)
    }
}
