//! In-memory WorldDirectory implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::{ActorId, ActorSnapshot, HostError, HostResult, TokenId, WorldDirectory};

/// An actor document with the pieces of state the engine touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredActor {
    #[serde(flatten)]
    pub snapshot: ActorSnapshot,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenId>,

    /// The `triggers` flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Value>,
}

impl StoredActor {
    pub fn new(snapshot: ActorSnapshot) -> Self {
        Self {
            snapshot,
            token: None,
            triggers: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<TokenId>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_triggers(mut self, triggers: Value) -> Self {
        self.triggers = Some(triggers);
        self
    }
}

#[derive(Default)]
pub struct MemoryWorld {
    actors: RwLock<BTreeMap<ActorId, StoredActor>>,
    flag_writes: RwLock<Vec<(ActorId, Value)>>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(self, actor: StoredActor) -> Self {
        if let Ok(mut actors) = self.actors.write() {
            actors.insert(actor.snapshot.id.clone(), actor);
        }
        self
    }

    /// Replaces the snapshot of an existing actor, keeping its flag and token.
    pub fn replace_snapshot(&self, snapshot: ActorSnapshot) -> HostResult<()> {
        let mut actors = self
            .actors
            .write()
            .map_err(|_| HostError::LockPoisoned("world"))?;
        let stored = actors
            .get_mut(&snapshot.id)
            .ok_or_else(|| HostError::UnknownActor(snapshot.id.clone()))?;
        stored.snapshot = snapshot;
        Ok(())
    }

    /// Every `set_actor_triggers` call so far, oldest first.
    pub fn flag_writes(&self) -> Vec<(ActorId, Value)> {
        self.flag_writes
            .read()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
}

impl WorldDirectory for MemoryWorld {
    fn actor(&self, id: &str) -> HostResult<Option<ActorSnapshot>> {
        let actors = self
            .actors
            .read()
            .map_err(|_| HostError::LockPoisoned("world"))?;
        Ok(actors.get(id).map(|stored| stored.snapshot.clone()))
    }

    fn actor_ids(&self) -> HostResult<Vec<ActorId>> {
        let actors = self
            .actors
            .read()
            .map_err(|_| HostError::LockPoisoned("world"))?;
        Ok(actors.keys().cloned().collect())
    }

    fn actor_triggers(&self, id: &str) -> HostResult<Option<Value>> {
        let actors = self
            .actors
            .read()
            .map_err(|_| HostError::LockPoisoned("world"))?;
        Ok(actors.get(id).and_then(|stored| stored.triggers.clone()))
    }

    fn set_actor_triggers(&self, id: &str, groups: Value) -> HostResult<()> {
        let mut actors = self
            .actors
            .write()
            .map_err(|_| HostError::LockPoisoned("world"))?;
        let stored = actors
            .get_mut(id)
            .ok_or_else(|| HostError::UnknownActor(id.to_owned()))?;
        stored.triggers = Some(groups.clone());
        self.flag_writes
            .write()
            .map_err(|_| HostError::LockPoisoned("world log"))?
            .push((id.to_owned(), groups));
        Ok(())
    }

    fn active_token(&self, id: &str) -> HostResult<Option<TokenId>> {
        let actors = self
            .actors
            .read()
            .map_err(|_| HostError::LockPoisoned("world"))?;
        Ok(actors.get(id).and_then(|stored| stored.token.clone()))
    }
}
