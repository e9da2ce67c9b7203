//! Combat lifecycle hooks: start, end and turn changes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workflow_core::EventKey;

use super::{Dispatch, OwnershipGate};
use crate::engine::EventContext;
use crate::host::{ActorId, HostResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    /// Actor behind the combatant. Absent for tokens without an actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorId>,
}

/// A position in the turn order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatTurn {
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default)]
    pub turn: Option<usize>,
    #[serde(default)]
    pub combatant_id: Option<String>,
}

/// Combat encounter as delivered by the combat hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    #[serde(default)]
    pub id: String,
    /// 0 until the encounter has been started.
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub turn: Option<usize>,
    #[serde(default)]
    pub combatants: Vec<Combatant>,
    /// Turn that was active before the update being delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<CombatTurn>,
}

impl CombatSnapshot {
    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.combatants.iter().find(|combatant| combatant.id == id)
    }

    /// Combatant whose turn it is.
    pub fn current(&self) -> Option<&Combatant> {
        self.turn.and_then(|turn| self.combatants.get(turn))
    }

    /// Combatant whose turn just ended.
    pub fn previous_combatant(&self) -> Option<&Combatant> {
        let previous = self.previous.as_ref()?;
        match &previous.combatant_id {
            Some(id) => self.combatant(id),
            None => previous.turn.and_then(|turn| self.combatants.get(turn)),
        }
    }

    fn as_data(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Fields changed by a combat update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<usize>,
}

impl CombatChanges {
    pub fn advances_turn(&self) -> bool {
        self.round.is_some() || self.turn.is_some()
    }
}

pub(super) fn on_combat_start(
    combat: &CombatSnapshot,
    gate: OwnershipGate<'_>,
) -> HostResult<Vec<Dispatch>> {
    every_combatant(combat, EventKey::StartOfCombat, gate)
}

/// Encounters deleted before they started fire nothing.
pub(super) fn on_delete_combat(
    combat: &CombatSnapshot,
    gate: OwnershipGate<'_>,
) -> HostResult<Vec<Dispatch>> {
    if combat.round == 0 {
        return Ok(Vec::new());
    }
    every_combatant(combat, EventKey::EndOfCombat, gate)
}

pub(super) fn on_update_combat(
    combat: &CombatSnapshot,
    changes: &CombatChanges,
    gate: OwnershipGate<'_>,
) -> HostResult<Vec<Dispatch>> {
    if !changes.advances_turn() {
        return Ok(Vec::new());
    }
    let mut dispatches = Vec::new();
    if let Some(previous) = combat.previous_combatant() {
        dispatches.extend(for_combatant(combat, previous, EventKey::EndOfTurn, gate)?);
    }
    if let Some(current) = combat.current() {
        dispatches.extend(for_combatant(combat, current, EventKey::StartOfTurn, gate)?);
    }
    Ok(dispatches)
}

fn every_combatant(
    combat: &CombatSnapshot,
    event: EventKey,
    gate: OwnershipGate<'_>,
) -> HostResult<Vec<Dispatch>> {
    let mut dispatches = Vec::new();
    for combatant in &combat.combatants {
        dispatches.extend(for_combatant(combat, combatant, event, gate)?);
    }
    Ok(dispatches)
}

fn for_combatant(
    combat: &CombatSnapshot,
    combatant: &Combatant,
    event: EventKey,
    gate: OwnershipGate<'_>,
) -> HostResult<Option<Dispatch>> {
    let Some(actor_id) = &combatant.actor else {
        return Ok(None);
    };
    Ok(gate.admit(actor_id)?.map(|actor| {
        Dispatch::new(event, EventContext::for_actor(actor).with_data(combat.as_data()))
    }))
}
