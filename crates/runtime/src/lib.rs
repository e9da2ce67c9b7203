//! Trigger-dispatch engine for tabletop workflows.
//!
//! This crate wires the rule schema from `workflow-core` to a host platform:
//! it watches host hooks, turns each delivery into a normalized game event,
//! finds the workflows listening for it and performs their actions. Consumers
//! build a [`WorkflowEngine`] over a set of [`HostPorts`] and feed it hook
//! deliveries as [`HookPayload`]s.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the engine service, its event index, hook table and
//!   dispatcher
//! - [`handlers`] adapts each host hook to the dispatcher
//! - [`host`] declares the host ports and in-memory implementations
//! - [`events`] publishes engine activity to observers
//! - [`api`] and [`config`] carry errors and configuration
pub mod api;
pub mod config;
pub mod engine;
pub mod events;
pub mod handlers;
pub mod host;

pub use api::{ActionError, Result, WorkflowError};
pub use config::{DEFAULT_ACTION_TIMEOUT, RuntimeConfig};
pub use engine::{
    ActionExecutor, ActionOutcome, DispatchSummary, EventContext, EventIndex, HookChanges,
    IndexedGroup, Invocation, WorkflowEngine, WorkflowEngineBuilder,
};
pub use events::{EventBus, GroupScope, Topic, WorkflowEvent};
pub use handlers::{
    CombatChanges, CombatSnapshot, CombatTurn, Combatant, Dispatch, HookPayload, OwnershipGate,
    RestResult,
};
pub use host::{
    ActionHost, ActorId, ActorSnapshot, DocumentRef, HitPoints, HookBus, HookId, HostError,
    HostPorts, HostResult, MacroContext, Roll, SettingsStore, WorldDirectory,
};
