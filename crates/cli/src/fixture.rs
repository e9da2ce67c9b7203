//! JSON fixtures describing a world and the hooks fired against it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use workflow_runtime::host::memory::{
    MemoryHookBus, MemorySettings, MemoryWorld, RecordingActionHost, StoredActor,
};
use workflow_runtime::{HookPayload, HostPorts};

/// Settings, actors and the documents their actions may reference.
///
/// ```json
/// {
///   "settings": { "workflows.enable": true, "workflows.workflows": {} },
///   "actors": [{ "id": "hero", "type": "character", "token": "tok-1" }],
///   "macros": { "Macro.abc": "Bless" },
///   "tables": { "RollTable.loot": "Loot" }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldFixture {
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,
    #[serde(default)]
    pub actors: Vec<StoredActor>,
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
    #[serde(default)]
    pub tables: BTreeMap<String, String>,
    /// Macros that resolve but fail when executed.
    #[serde(default)]
    pub failing_macros: Vec<String>,
}

/// In-memory host built from a fixture.
pub struct MemoryHost {
    pub ports: HostPorts,
    pub actions: Arc<RecordingActionHost>,
}

impl WorldFixture {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn into_host(self) -> MemoryHost {
        let settings = self
            .settings
            .into_iter()
            .fold(MemorySettings::new(), |store, (key, value)| store.with(key, value));
        let world = self
            .actors
            .into_iter()
            .fold(MemoryWorld::new(), MemoryWorld::with_actor);

        let mut actions = RecordingActionHost::new();
        for (uuid, name) in self.macros {
            actions = actions.with_macro(uuid, name);
        }
        for (uuid, name) in self.tables {
            actions = actions.with_table(uuid, name);
        }
        for uuid in self.failing_macros {
            actions = actions.failing_macro(uuid);
        }
        let actions = Arc::new(actions);

        let ports = HostPorts::new(
            Arc::new(settings),
            Arc::new(world),
            Arc::new(MemoryHookBus::new()),
            actions.clone(),
        );
        MemoryHost { ports, actions }
    }
}

/// Hook deliveries, in firing order.
pub fn load_scenario(path: &Path) -> Result<Vec<HookPayload>> {
    read_json(path)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
