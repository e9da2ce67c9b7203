//! Roll-completed hooks: attacks, checks, saves, damage and the rest.

use serde_json::Value;
use tracing::warn;
use workflow_core::HookName;

use super::{Dispatch, OwnershipGate};
use crate::engine::EventContext;
use crate::host::{HostResult, Roll};

pub(super) fn on_roll(
    hook: HookName,
    rolls: &[Roll],
    subject: &str,
    data: &Value,
    gate: OwnershipGate<'_>,
) -> HostResult<Vec<Dispatch>> {
    let Some(event) = hook.roll_event() else {
        warn!(
            target: "workflows::dispatch",
            hook = hook.host_name(),
            "roll payload delivered through a non-roll hook"
        );
        return Ok(Vec::new());
    };
    let Some(actor) = gate.admit(subject)? else {
        return Ok(Vec::new());
    };

    let mut context = EventContext::for_actor(actor)
        .with_rolls(rolls.to_vec())
        .with_data(data.clone());
    context.die_total = rolls.first().map(Roll::die_total);
    Ok(vec![Dispatch::new(event, context)])
}
