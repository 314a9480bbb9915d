//! Client-local persisted state.
//!
//! The engine never touches a concrete store; callers inject anything that
//! implements [`KeyValueStore`]. Values are JSON strings under fixed keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::RoundResult;

pub const WEIGHTS_KEY: &str = "coastle-infinite-choice-values";
pub const STATS_KEY: &str = "coastle-infinite-stats";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and parse a JSON value. Missing, unreadable and unparsable values all
/// come back as `None`; the latter two are logged.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding corrupt persisted state");
            None
        }
    }
}

pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), String>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.set(key, &json)
}

/// Cumulative score across infinite-mode rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotals {
    #[serde(default)]
    pub total_score: u64,
    #[serde(default)]
    pub locations_played: u64,
}

impl RunningTotals {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        load_json(store, STATS_KEY).unwrap_or_default()
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), String> {
        save_json(store, STATS_KEY, self)
    }

    pub fn record(&mut self, result: &RoundResult) {
        self.total_score += u64::from(result.final_score);
        self.locations_played += 1;
    }
}
