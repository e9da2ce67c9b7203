//! Rest-completed hook.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workflow_core::EventKey;

use super::{Dispatch, OwnershipGate};
use crate::engine::EventContext;
use crate::host::HostResult;

/// Outcome of a completed rest. Fields other than the rest length are passed
/// through to macros untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestResult {
    #[serde(default)]
    pub long_rest: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

pub(super) fn on_rest_completed(
    actor_id: &str,
    result: &RestResult,
    gate: OwnershipGate<'_>,
) -> HostResult<Vec<Dispatch>> {
    let Some(actor) = gate.admit(actor_id)? else {
        return Ok(Vec::new());
    };
    let event = if result.long_rest {
        EventKey::LongRest
    } else {
        EventKey::ShortRest
    };
    let data = serde_json::to_value(result)?;
    Ok(vec![Dispatch::new(
        event,
        EventContext::for_actor(actor).with_data(data),
    )])
}
