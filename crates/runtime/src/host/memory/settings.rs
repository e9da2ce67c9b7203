//! In-memory SettingsStore implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::host::{HostError, HostResult, SettingsStore};

/// Settings held in a map, with a log of every write.
#[derive(Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, Value>>,
    writes: RwLock<Vec<(String, Value)>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value without recording a write.
    pub fn with(self, key: impl Into<String>, value: Value) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.into(), value);
        }
        self
    }

    /// Every `set` call so far, oldest first.
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.writes
            .read()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> HostResult<Option<Value>> {
        let values = self
            .values
            .read()
            .map_err(|_| HostError::LockPoisoned("settings"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> HostResult<()> {
        self.values
            .write()
            .map_err(|_| HostError::LockPoisoned("settings"))?
            .insert(key.to_owned(), value.clone());
        self.writes
            .write()
            .map_err(|_| HostError::LockPoisoned("settings log"))?
            .push((key.to_owned(), value));
        Ok(())
    }
}
