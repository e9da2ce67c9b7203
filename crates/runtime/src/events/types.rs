//! Events published on the observer bus.

use serde::Serialize;
use workflow_core::{ActionKind, EventKey, GroupId, HookName};

use crate::host::ActorId;

/// Where a fired group is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupScope {
    /// World settings, applies to every eligible actor.
    World,
    /// The acting actor's own `triggers` flag.
    Actor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkflowEvent {
    /// The event index was rebuilt from settings.
    #[serde(rename_all = "camelCase")]
    IndexRebuilt {
        enabled: bool,
        indexed_groups: usize,
        active_events: Vec<EventKey>,
    },

    HookSubscribed { hook: HookName },

    HookUnsubscribed { hook: HookName },

    /// A group matched an event and its actions are about to run.
    #[serde(rename_all = "camelCase")]
    GroupFired {
        event: EventKey,
        actor: ActorId,
        scope: GroupScope,
        group: GroupId,
        label: String,
    },

    /// An action finished. `performed` is false when the action was left
    /// incomplete in its definition and did nothing.
    ActionCompleted {
        event: EventKey,
        actor: ActorId,
        group: GroupId,
        action: String,
        kind: ActionKind,
        performed: bool,
    },

    ActionFailed {
        event: EventKey,
        actor: ActorId,
        group: GroupId,
        action: String,
        kind: ActionKind,
        error: String,
    },
}

impl WorkflowEvent {
    pub fn topic(&self) -> super::Topic {
        match self {
            Self::IndexRebuilt { .. } | Self::HookSubscribed { .. } | Self::HookUnsubscribed { .. } => {
                super::Topic::Registry
            }
            Self::GroupFired { .. } | Self::ActionCompleted { .. } | Self::ActionFailed { .. } => {
                super::Topic::Dispatch
            }
        }
    }
}
