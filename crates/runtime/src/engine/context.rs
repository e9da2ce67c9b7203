//! Context carried from an event handler through dispatch into actions.

use serde_json::Value;
use workflow_core::EventKey;

use crate::host::{ActorSnapshot, MacroContext, Roll, TokenId};

/// Normalized parameters of a fired event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventContext {
    /// Acting document. Dispatch is a no-op without one.
    pub actor: Option<ActorSnapshot>,
    /// Numeric result compared against trigger values: the first die of a
    /// roll, or an HP delta.
    pub die_total: Option<f64>,
    pub rolls: Vec<Roll>,
    /// Hook-specific payload passed through to macros untouched.
    pub data: Value,
}

impl EventContext {
    pub fn for_actor(actor: ActorSnapshot) -> Self {
        Self {
            actor: Some(actor),
            ..Self::default()
        }
    }

    pub fn with_die_total(mut self, die_total: f64) -> Self {
        self.die_total = Some(die_total);
        self
    }

    pub fn with_rolls(mut self, rolls: Vec<Roll>) -> Self {
        self.rolls = rolls;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// One event occurrence for a known actor, shared by every action it runs.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub event: EventKey,
    pub actor: ActorSnapshot,
    pub die_total: Option<f64>,
    pub rolls: Vec<Roll>,
    pub data: Value,
}

impl Invocation {
    pub(crate) fn new(event: EventKey, actor: ActorSnapshot, context: EventContext) -> Self {
        Self {
            event,
            actor,
            die_total: context.die_total,
            rolls: context.rolls,
            data: context.data,
        }
    }

    pub(crate) fn macro_context(&self, token: Option<TokenId>) -> MacroContext {
        MacroContext {
            actor: self.actor.clone(),
            token,
            event: self.event,
            die_total: self.die_total,
            rolls: self.rolls.clone(),
            data: self.data.clone(),
        }
    }
}
