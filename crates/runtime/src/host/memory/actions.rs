//! ActionHost that records calls instead of touching a real host.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Serialize;
use workflow_core::{EventKey, RollCategory, RollRequest, UpdateValue};

use crate::host::{
    ActionHost, ActorId, AwardSeed, DocumentRef, HostError, HostResult, MacroContext, TokenId,
};

/// One side effect requested by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum HostCall {
    #[serde(rename_all = "camelCase")]
    ExecuteMacro {
        uuid: String,
        actor: ActorId,
        token: Option<TokenId>,
        event: EventKey,
        die_total: Option<f64>,
    },
    PlaySound {
        path: String,
        volume: f64,
    },
    ToggleStatus {
        actor: ActorId,
        condition: String,
        active: Option<bool>,
    },
    DrawTable {
        uuid: String,
    },
    OpenAward,
    RequestRoll {
        actor: ActorId,
        category: RollCategory,
        key: String,
        dc: Option<f64>,
    },
    UpdateActor {
        actor: ActorId,
        path: String,
        value: UpdateValue,
    },
    UpdateToken {
        token: TokenId,
        path: String,
        value: UpdateValue,
    },
    NotifyError {
        message: String,
    },
}

/// Records every call in order.
///
/// Only macros and tables registered with [`with_macro`](Self::with_macro) and
/// [`with_table`](Self::with_table) resolve. Individual macros can be made to
/// fail or to never finish.
#[derive(Default)]
pub struct RecordingActionHost {
    macros: HashMap<String, DocumentRef>,
    tables: HashMap<String, DocumentRef>,
    failing: HashSet<String>,
    stalled: HashSet<String>,
    calls: RwLock<Vec<HostCall>>,
}

impl RecordingActionHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_macro(mut self, uuid: impl Into<String>, name: impl Into<String>) -> Self {
        let uuid = uuid.into();
        self.macros
            .insert(uuid.clone(), DocumentRef::new(uuid, name));
        self
    }

    pub fn with_table(mut self, uuid: impl Into<String>, name: impl Into<String>) -> Self {
        let uuid = uuid.into();
        self.tables
            .insert(uuid.clone(), DocumentRef::new(uuid, name));
        self
    }

    /// Registers a macro whose execution returns a host error.
    pub fn failing_macro(mut self, uuid: impl Into<String>) -> Self {
        let uuid = uuid.into();
        self.failing.insert(uuid.clone());
        self.with_macro(uuid, "failing")
    }

    /// Registers a macro whose execution never completes.
    pub fn stalled_macro(mut self, uuid: impl Into<String>) -> Self {
        let uuid = uuid.into();
        self.stalled.insert(uuid.clone());
        self.with_macro(uuid, "stalled")
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Messages passed to `notify_error`.
    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::NotifyError { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) -> HostResult<()> {
        self.calls
            .write()
            .map_err(|_| HostError::LockPoisoned("action log"))?
            .push(call);
        Ok(())
    }
}

#[async_trait]
impl ActionHost for RecordingActionHost {
    async fn resolve_macro(&self, uuid: &str) -> HostResult<Option<DocumentRef>> {
        Ok(self.macros.get(uuid).cloned())
    }

    async fn execute_macro(&self, script: &DocumentRef, context: MacroContext) -> HostResult<()> {
        self.record(HostCall::ExecuteMacro {
            uuid: script.uuid.clone(),
            actor: context.actor.id.clone(),
            token: context.token.clone(),
            event: context.event,
            die_total: context.die_total,
        })?;
        if self.stalled.contains(&script.uuid) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(&script.uuid) {
            return Err(HostError::Rejected(format!(
                "macro {} threw an error",
                script.uuid
            )));
        }
        Ok(())
    }

    async fn play_sound(&self, path: &str, volume: f64) -> HostResult<()> {
        self.record(HostCall::PlaySound {
            path: path.to_owned(),
            volume,
        })
    }

    async fn toggle_status(
        &self,
        actor: &ActorId,
        condition: &str,
        active: Option<bool>,
    ) -> HostResult<()> {
        self.record(HostCall::ToggleStatus {
            actor: actor.clone(),
            condition: condition.to_owned(),
            active,
        })
    }

    async fn resolve_table(&self, uuid: &str) -> HostResult<Option<DocumentRef>> {
        Ok(self.tables.get(uuid).cloned())
    }

    async fn draw_table(&self, table: &DocumentRef) -> HostResult<()> {
        self.record(HostCall::DrawTable {
            uuid: table.uuid.clone(),
        })
    }

    async fn open_award(&self, _seed: AwardSeed) -> HostResult<()> {
        self.record(HostCall::OpenAward)
    }

    async fn request_roll(&self, actor: &ActorId, request: &RollRequest) -> HostResult<()> {
        self.record(HostCall::RequestRoll {
            actor: actor.clone(),
            category: request.category,
            key: request.key.clone(),
            dc: request.dc,
        })
    }

    async fn update_actor(
        &self,
        actor: &ActorId,
        path: &str,
        value: UpdateValue,
    ) -> HostResult<()> {
        self.record(HostCall::UpdateActor {
            actor: actor.clone(),
            path: path.to_owned(),
            value,
        })
    }

    async fn update_token(
        &self,
        token: &TokenId,
        path: &str,
        value: UpdateValue,
    ) -> HostResult<()> {
        self.record(HostCall::UpdateToken {
            token: token.clone(),
            path: path.to_owned(),
            value,
        })
    }

    fn notify_error(&self, message: &str) {
        let _ = self.record(HostCall::NotifyError {
            message: message.to_owned(),
        });
    }
}
