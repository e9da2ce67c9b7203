//! Event handlers: one adapter per host hook.
//!
//! A handler turns a raw [`HookPayload`] into zero or more [`Dispatch`]es,
//! each a normalized event key plus its [`EventContext`]. Handlers resolve the
//! acting document, drop deliveries for documents this client does not own,
//! and compute the numeric result triggers compare against. They never run
//! actions themselves.

mod combat;
mod hp;
mod rest;
mod rolls;

pub use combat::{CombatChanges, CombatSnapshot, CombatTurn, Combatant};
pub use hp::{hp_thresholds, incoming_hp};
pub use rest::RestResult;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use workflow_core::{EventKey, HookName};

use crate::engine::EventContext;
use crate::host::{ActorId, ActorSnapshot, HostResult, Roll, WorldDirectory};

/// Arguments of one host hook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HookPayload {
    /// Any of the roll-completed hooks. `subject` is the rolling actor.
    Roll {
        hook: HookName,
        rolls: Vec<Roll>,
        subject: ActorId,
        #[serde(default)]
        data: Value,
    },

    /// Pending update of an actor, delivered before it is committed.
    PreUpdateActor {
        actor: ActorId,
        #[serde(default)]
        changes: Value,
    },

    CombatStart {
        combat: CombatSnapshot,
    },

    DeleteCombat {
        combat: CombatSnapshot,
    },

    UpdateCombat {
        combat: CombatSnapshot,
        #[serde(default)]
        changes: CombatChanges,
    },

    RestCompleted {
        actor: ActorId,
        #[serde(default)]
        result: RestResult,
    },
}

impl HookPayload {
    /// Host hook this payload was delivered through.
    pub fn hook(&self) -> HookName {
        match self {
            Self::Roll { hook, .. } => *hook,
            Self::PreUpdateActor { .. } => HookName::PreUpdateActor,
            Self::CombatStart { .. } => HookName::CombatStart,
            Self::DeleteCombat { .. } => HookName::DeleteCombat,
            Self::UpdateCombat { .. } => HookName::UpdateCombat,
            Self::RestCompleted { .. } => HookName::RestCompleted,
        }
    }
}

/// A normalized event ready for the dispatch core.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub event: EventKey,
    pub context: EventContext,
}

impl Dispatch {
    pub fn new(event: EventKey, context: EventContext) -> Self {
        Self { event, context }
    }
}

/// Resolves acting documents, admitting only those this client owns.
#[derive(Clone, Copy)]
pub struct OwnershipGate<'a> {
    world: &'a dyn WorldDirectory,
    require_ownership: bool,
}

impl<'a> OwnershipGate<'a> {
    pub fn new(world: &'a dyn WorldDirectory, require_ownership: bool) -> Self {
        Self {
            world,
            require_ownership,
        }
    }

    /// The actor, or `None` when it is unknown or owned by another client.
    pub fn admit(&self, id: &str) -> HostResult<Option<ActorSnapshot>> {
        let Some(actor) = self.world.actor(id)? else {
            trace!(target: "workflows::dispatch", actor = id, "unknown actor");
            return Ok(None);
        };
        if self.require_ownership && !actor.is_owner {
            trace!(target: "workflows::dispatch", actor = id, "not owned by this client");
            return Ok(None);
        }
        Ok(Some(actor))
    }
}

/// Routes a payload to its handler.
pub fn normalize(payload: &HookPayload, gate: OwnershipGate<'_>) -> HostResult<Vec<Dispatch>> {
    match payload {
        HookPayload::Roll {
            hook,
            rolls,
            subject,
            data,
        } => rolls::on_roll(*hook, rolls, subject, data, gate),
        HookPayload::PreUpdateActor { actor, changes } => hp::on_pre_update_actor(actor, changes, gate),
        HookPayload::CombatStart { combat } => combat::on_combat_start(combat, gate),
        HookPayload::DeleteCombat { combat } => combat::on_delete_combat(combat, gate),
        HookPayload::UpdateCombat { combat, changes } => {
            combat::on_update_combat(combat, changes, gate)
        }
        HookPayload::RestCompleted { actor, result } => rest::on_rest_completed(actor, result, gate),
    }
}
