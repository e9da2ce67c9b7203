//! Unified error types surfaced by the runtime API.
//!
//! [`WorkflowError`] covers the administrative surface (loading, saving and
//! rebuilding configuration) and is returned to callers. [`ActionError`] is
//! the failure of a single action; it is logged and reported, never returned
//! from dispatch.
use std::time::Duration;

use thiserror::Error;
use workflow_core::{ActionKind, FormError, RollRequestError};

use crate::host::HostError;

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("setting `{key}` holds malformed data")]
    MalformedSetting {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("triggers flag of actor `{actor}` holds malformed data")]
    MalformedActorFlag {
        actor: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown actor `{0}`")]
    UnknownActor(String),

    #[error("{0} lock was poisoned")]
    LockPoisoned(&'static str),

    #[error("engine requires host ports to be configured before building")]
    MissingHost,
}

/// Failure of one action. Sibling actions and groups are unaffected.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("macro `{0}` could not be found")]
    MacroNotFound(String),

    #[error("roll table `{0}` could not be found")]
    TableNotFound(String),

    #[error("actor `{0}` has no active token")]
    NoActiveToken(String),

    #[error(transparent)]
    InvalidRollRequest(#[from] RollRequestError),

    #[error("{kind} action did not finish within {after:?}")]
    TimedOut { kind: ActionKind, after: Duration },

    #[error("{kind} action aborted: {reason}")]
    Aborted { kind: ActionKind, reason: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

impl ActionError {
    /// Broken references are shown to the user; everything else is only
    /// logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::MacroNotFound(_) | Self::TableNotFound(_))
    }
}
