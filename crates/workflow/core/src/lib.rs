//! Rule schema and pure evaluation logic for the workflow trigger engine.
//!
//! A workflow is a [`TriggerGroup`]: a labelled bundle of [`Trigger`]s (the
//! game events it listens for) and [`Action`]s (the effects it performs). This
//! crate defines how those groups are persisted, how a trigger decides whether
//! an incoming event satisfies it, and how edit forms flatten and rebuild a
//! group.
//!
//! Modules are organized leaves first:
//! - [`event`] names every normalized game event and the host hook carrying it
//! - [`compare`] evaluates numeric trigger conditions
//! - [`fields`] and [`ordered`] hold the loosely typed persisted primitives
//! - [`trigger`], [`action`] and [`group`] make up the rule schema
//! - [`form`] converts groups to and from flat edit-form entries
pub mod action;
pub mod compare;
pub mod error;
pub mod event;
pub mod fields;
pub mod form;
pub mod group;
pub mod ordered;
pub mod trigger;

pub use action::{
    Action, ActionKind, DEFAULT_SOUND_VOLUME, RollCategory, RollRequest, UpdateValue,
};
pub use compare::{Operator, compare};
pub use error::{FormError, RollRequestError};
pub use event::{EventKey, HookName, required_hooks};
pub use fields::NumberInput;
pub use form::{FormEntry, expand, flatten};
pub use group::{GroupId, TriggerGroup, TriggerGroups};
pub use ordered::OrderedMap;
pub use trigger::Trigger;
