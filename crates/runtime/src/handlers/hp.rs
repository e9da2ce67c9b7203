//! HP threshold events derived from a pending actor update.
//!
//! One update can fire several events at once: dropping from 21/40 to 0
//! crosses half and zero and loses HP in the same hit.

use serde_json::{Value, json};
use workflow_core::EventKey;

use super::{Dispatch, OwnershipGate};
use crate::engine::EventContext;
use crate::host::{HitPoints, HostResult};

const HP_POINTER: &str = "/system/attributes/hp/value";
const HP_DOTTED: &str = "system.attributes.hp.value";

/// Incoming HP value of a pending update, if the update touches HP.
///
/// Accepts both the nested form and a flattened `system.attributes.hp.value`
/// key.
pub fn incoming_hp(changes: &Value) -> Option<f64> {
    changes
        .pointer(HP_POINTER)
        .or_else(|| changes.get(HP_DOTTED))
        .and_then(Value::as_f64)
}

/// Threshold events for an HP change, in firing order.
///
/// The checks are independent:
/// - `zeroHp` when HP goes from above 0 to exactly 0
/// - `halfHp` when HP goes from above half the effective max to at or below it
/// - `loseHp` with the amount lost
/// - `gainHp` with the amount gained
pub fn hp_thresholds(previous: &HitPoints, incoming: f64) -> Vec<(EventKey, Option<f64>)> {
    let current = previous.value;
    let half = previous.effective_max() / 2.0;
    let mut events = Vec::new();

    if current > 0.0 && incoming == 0.0 {
        events.push((EventKey::ZeroHp, None));
    }
    if half > 0.0 && current > half && incoming <= half {
        events.push((EventKey::HalfHp, None));
    }
    if incoming < current {
        events.push((EventKey::LoseHp, Some(current - incoming)));
    }
    if incoming > current {
        events.push((EventKey::GainHp, Some(incoming - current)));
    }
    events
}

pub(super) fn on_pre_update_actor(
    actor_id: &str,
    changes: &Value,
    gate: OwnershipGate<'_>,
) -> HostResult<Vec<Dispatch>> {
    let Some(incoming) = incoming_hp(changes) else {
        return Ok(Vec::new());
    };
    let Some(actor) = gate.admit(actor_id)? else {
        return Ok(Vec::new());
    };
    let Some(previous) = actor.hp else {
        return Ok(Vec::new());
    };

    let data = json!({
        "previous": previous.value,
        "incoming": incoming,
        "changes": changes,
    });
    Ok(hp_thresholds(&previous, incoming)
        .into_iter()
        .map(|(event, delta)| {
            let mut context = EventContext::for_actor(actor.clone()).with_data(data.clone());
            context.die_total = delta;
            Dispatch::new(event, context)
        })
        .collect())
}
