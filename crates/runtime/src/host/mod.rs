//! Ports to the host platform.
//!
//! The engine owns no documents. Everything it reads or changes lives on the
//! host, reached through four traits:
//! - [`SettingsStore`] for the world-scoped `enable` switch and global groups
//! - [`WorldDirectory`] for actor documents, their `triggers` flag and tokens
//! - [`HookBus`] for registering and releasing host hook subscriptions
//! - [`ActionHost`] for the asynchronous side effects actions perform
//!
//! [`HostPorts`] bundles one implementation of each so it can be cloned into
//! spawned action tasks. [`memory`] provides in-process implementations for
//! tests and local runs.
mod error;
pub mod memory;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use workflow_core::{HookName, RollRequest, UpdateValue};

pub use error::{HostError, HostResult};
pub use types::{
    ActorId, ActorSnapshot, AwardSeed, DieTerm, DocumentRef, HitPoints, HookId, MacroContext, Roll,
    TokenId,
};

/// World-scoped key/value settings.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> HostResult<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> HostResult<()>;
}

/// Read/write access to actor documents.
pub trait WorldDirectory: Send + Sync {
    fn actor(&self, id: &str) -> HostResult<Option<ActorSnapshot>>;

    fn actor_ids(&self) -> HostResult<Vec<ActorId>>;

    /// Raw value of the actor's `triggers` flag.
    fn actor_triggers(&self, id: &str) -> HostResult<Option<Value>>;

    fn set_actor_triggers(&self, id: &str, groups: Value) -> HostResult<()>;

    /// The actor's linked token, or its first active token on the scene.
    fn active_token(&self, id: &str) -> HostResult<Option<TokenId>>;
}

/// Host hook dispatcher.
///
/// Subscribing only tells the host to start delivering a hook; deliveries
/// reach the engine through [`crate::WorkflowEngine::handle_hook`].
pub trait HookBus: Send + Sync {
    fn on(&self, hook: HookName) -> HostResult<HookId>;

    fn off(&self, hook: HookName, id: HookId) -> HostResult<()>;
}

/// Asynchronous side effects performed by actions.
#[async_trait]
pub trait ActionHost: Send + Sync {
    async fn resolve_macro(&self, uuid: &str) -> HostResult<Option<DocumentRef>>;

    async fn execute_macro(&self, script: &DocumentRef, context: MacroContext) -> HostResult<()>;

    async fn play_sound(&self, path: &str, volume: f64) -> HostResult<()>;

    /// Sets or clears a status effect. `None` flips the current state.
    async fn toggle_status(
        &self,
        actor: &ActorId,
        condition: &str,
        active: Option<bool>,
    ) -> HostResult<()>;

    async fn resolve_table(&self, uuid: &str) -> HostResult<Option<DocumentRef>>;

    async fn draw_table(&self, table: &DocumentRef) -> HostResult<()>;

    async fn open_award(&self, seed: AwardSeed) -> HostResult<()>;

    async fn request_roll(&self, actor: &ActorId, request: &RollRequest) -> HostResult<()>;

    async fn update_actor(&self, actor: &ActorId, path: &str, value: UpdateValue)
    -> HostResult<()>;

    async fn update_token(&self, token: &TokenId, path: &str, value: UpdateValue)
    -> HostResult<()>;

    /// Shows a non-fatal error notification to the user.
    fn notify_error(&self, message: &str);
}

/// Cloneable bundle of host ports.
#[derive(Clone)]
pub struct HostPorts {
    pub(crate) settings: Arc<dyn SettingsStore>,
    pub(crate) world: Arc<dyn WorldDirectory>,
    pub(crate) hooks: Arc<dyn HookBus>,
    pub(crate) actions: Arc<dyn ActionHost>,
}

impl HostPorts {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        world: Arc<dyn WorldDirectory>,
        hooks: Arc<dyn HookBus>,
        actions: Arc<dyn ActionHost>,
    ) -> Self {
        Self {
            settings,
            world,
            hooks,
            actions,
        }
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn world(&self) -> &dyn WorldDirectory {
        self.world.as_ref()
    }

    pub fn hooks(&self) -> &dyn HookBus {
        self.hooks.as_ref()
    }

    pub fn actions(&self) -> &dyn ActionHost {
        self.actions.as_ref()
    }
}
