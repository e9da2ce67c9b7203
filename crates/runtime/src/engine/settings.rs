//! Typed access to persisted workflow configuration.
//!
//! Both scopes store a `group id -> group` object. Groups are decoded one by
//! one, and inside a group every trigger and action row is checked on its
//! own, so a malformed row is dropped without hiding its siblings and a
//! malformed group without hiding the rest of the scope.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::warn;
use workflow_core::{Action, OrderedMap, Trigger, TriggerGroup, TriggerGroups};

use crate::api::{Result, WorkflowError};
use crate::config::RuntimeConfig;
use crate::host::{SettingsStore, WorldDirectory};

pub(crate) struct WorkflowSettings<'a> {
    store: &'a dyn SettingsStore,
    config: &'a RuntimeConfig,
}

impl<'a> WorkflowSettings<'a> {
    pub(crate) fn new(store: &'a dyn SettingsStore, config: &'a RuntimeConfig) -> Self {
        Self { store, config }
    }

    /// Master switch. An unset switch reads as off.
    pub(crate) fn enabled(&self) -> Result<bool> {
        let key = self.config.enable_key();
        match self.store.get(&key)? {
            None | Some(Value::Null) => Ok(false),
            Some(raw) => serde_json::from_value(raw)
                .map_err(|source| WorkflowError::MalformedSetting { key, source }),
        }
    }

    pub(crate) fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.store.set(&self.config.enable_key(), Value::Bool(enabled))?;
        Ok(())
    }

    pub(crate) fn world_groups(&self) -> Result<TriggerGroups> {
        let key = self.config.groups_key();
        match self.store.get(&key)? {
            None => Ok(TriggerGroups::new()),
            Some(raw) => decode_groups(raw, &key)
                .map_err(|source| WorkflowError::MalformedSetting { key, source }),
        }
    }

    /// Collection-replace: clears the stored mapping, then writes the new one,
    /// so groups removed in the editor do not survive a merge on the host.
    pub(crate) fn replace_world_groups(&self, groups: &TriggerGroups) -> Result<()> {
        let key = self.config.groups_key();
        let encoded = encode_groups(groups, &key)?;
        self.store.set(&key, json!({}))?;
        self.store.set(&key, encoded)?;
        Ok(())
    }
}

/// Groups stored in an actor's `triggers` flag.
pub(crate) fn actor_groups(world: &dyn WorldDirectory, actor: &str) -> Result<TriggerGroups> {
    match world.actor_triggers(actor)? {
        None => Ok(TriggerGroups::new()),
        Some(raw) => {
            decode_groups(raw, actor).map_err(|source| WorkflowError::MalformedActorFlag {
                actor: actor.to_owned(),
                source,
            })
        }
    }
}

pub(crate) fn replace_actor_groups(
    world: &dyn WorldDirectory,
    actor: &str,
    groups: &TriggerGroups,
) -> Result<()> {
    let encoded = encode_groups(groups, actor)?;
    world.set_actor_triggers(actor, json!({}))?;
    world.set_actor_triggers(actor, encoded)?;
    Ok(())
}

fn encode_groups(groups: &TriggerGroups, origin: &str) -> Result<Value> {
    serde_json::to_value(groups).map_err(|source| WorkflowError::MalformedSetting {
        key: origin.to_owned(),
        source,
    })
}

fn decode_groups(raw: Value, origin: &str) -> serde_json::Result<TriggerGroups> {
    if raw.is_null() {
        return Ok(TriggerGroups::new());
    }
    let entries: OrderedMap<Value> = serde_json::from_value(raw)?;
    let mut groups = TriggerGroups::new();
    for (id, mut raw_group) in entries {
        if let Value::Object(fields) = &mut raw_group {
            retain_rows::<Trigger>(fields, "triggers", origin, &id);
            retain_rows::<Action>(fields, "actions", origin, &id);
        }
        match serde_json::from_value::<TriggerGroup>(raw_group) {
            Ok(group) => {
                groups.insert(id, group);
            }
            Err(e) => warn!(
                target: "workflows::index",
                origin,
                group = %id,
                error = %e,
                "skipping malformed workflow"
            ),
        }
    }
    Ok(groups)
}

/// Drops the rows of `section` that do not decode as `T`.
fn retain_rows<T: DeserializeOwned>(
    group: &mut Map<String, Value>,
    section: &str,
    origin: &str,
    group_id: &str,
) {
    let Some(Value::Object(rows)) = group.get_mut(section) else {
        return;
    };
    rows.retain(|row_id, row| match T::deserialize(&*row) {
        Ok(_) => true,
        Err(e) => {
            warn!(
                target: "workflows::index",
                origin,
                group = group_id,
                section,
                row = %row_id,
                error = %e,
                "skipping malformed workflow row"
            );
            false
        }
    });
}
