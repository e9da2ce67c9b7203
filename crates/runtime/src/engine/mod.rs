//! Workflow engine service.
//!
//! [`WorkflowEngine`] owns the two pieces of shared state the dispatcher
//! needs: the [`EventIndex`] snapshot and the table of host hooks currently
//! subscribed. Both are only changed by the administrative operations
//! (`rebuild`, `sync_hooks`, `ensure_event_hooks`, `dispose`); dispatch only
//! reads the index. The engine is cheap to clone and every clone shares the
//! same state.
//!
//! Lifecycle:
//! - [`WorkflowEngine::init`] builds the index and subscribes the needed hooks
//! - saving groups or flipping the master switch rebuilds (world scope) or
//!   extends the hook set (actor scope)
//! - [`WorkflowEngine::handle_hook`] routes a host delivery through its event
//!   handler into [`WorkflowEngine::process_event`]
//! - [`WorkflowEngine::dispose`] releases every hook

mod context;
mod dispatch;
mod executor;
mod hooks;
mod index;
mod settings;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use workflow_core::{EventKey, GroupId, HookName, TriggerGroup, TriggerGroups, required_hooks};

pub use context::{EventContext, Invocation};
pub use dispatch::DispatchSummary;
pub use executor::{ActionExecutor, ActionOutcome};
pub use hooks::HookChanges;
pub use index::{EventIndex, IndexedGroup};

use self::hooks::HookTable;
use self::settings::{WorkflowSettings, actor_groups, replace_actor_groups};
use crate::api::{Result, WorkflowError};
use crate::config::RuntimeConfig;
use crate::events::{EventBus, Topic, WorkflowEvent};
use crate::handlers::{HookPayload, OwnershipGate, normalize};
use crate::host::HostPorts;

/// Trigger-dispatch engine bound to one host.
#[derive(Clone)]
pub struct WorkflowEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: RuntimeConfig,
    ports: HostPorts,
    executor: ActionExecutor,
    events: EventBus,
    index: RwLock<Arc<EventIndex>>,
    hooks: Mutex<HookTable>,
    /// Serializes rebuilds so an older snapshot never replaces a newer one.
    admin: Mutex<()>,
}

impl WorkflowEngine {
    /// Create a new engine builder
    pub fn builder() -> WorkflowEngineBuilder {
        WorkflowEngineBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn ports(&self) -> &HostPorts {
        &self.inner.ports
    }

    /// Subscribe to engine activity on one topic
    pub fn subscribe_events(&self, topic: Topic) -> broadcast::Receiver<WorkflowEvent> {
        self.inner.events.subscribe(topic)
    }

    /// Current index snapshot.
    pub fn index(&self) -> Result<Arc<EventIndex>> {
        let index = self
            .inner
            .index
            .read()
            .map_err(|_| WorkflowError::LockPoisoned("event index"))?;
        Ok(Arc::clone(&index))
    }

    pub fn is_subscribed(&self, hook: HookName) -> bool {
        self.inner
            .hooks
            .lock()
            .map(|table| table.contains(hook))
            .unwrap_or(false)
    }

    pub fn subscribed_hooks(&self) -> Result<BTreeSet<HookName>> {
        Ok(self.hook_table()?.held())
    }

    pub fn is_enabled(&self) -> Result<bool> {
        self.settings().enabled()
    }

    /// Builds the index and subscribes the hooks it needs.
    pub fn init(&self) -> Result<()> {
        info!(target: "workflows::index", namespace = %self.inner.config.settings_namespace, "initializing workflows");
        self.rebuild()
    }

    /// Recomputes the index from settings and reconciles host hooks.
    ///
    /// With the master switch off the index is emptied and every hook is
    /// released. Otherwise the hooks kept are exactly those needed by visible
    /// world groups plus visible groups stored on any actor.
    pub fn rebuild(&self) -> Result<()> {
        let _admin = self.admin()?;
        self.rebuild_locked()
    }

    fn rebuild_locked(&self) -> Result<()> {
        if !self.settings().enabled()? {
            self.swap_index(EventIndex::empty())?;
            let changes = self.hook_table()?.release_all(self.inner.ports.hooks());
            self.publish_changes(&changes);
            debug!(target: "workflows::index", "workflows disabled, index cleared");
            self.publish(WorkflowEvent::IndexRebuilt {
                enabled: false,
                indexed_groups: 0,
                active_events: Vec::new(),
            });
            return Ok(());
        }

        let index = EventIndex::build(&self.settings().world_groups()?);
        let mut active_events = index.events();
        active_events.extend(self.actor_active_events()?);
        let indexed_groups = index.group_count();
        self.swap_index(index)?;
        self.sync_hooks(&active_events)?;

        info!(
            target: "workflows::index",
            indexed_groups,
            active_events = active_events.len(),
            "workflow index rebuilt"
        );
        self.publish(WorkflowEvent::IndexRebuilt {
            enabled: true,
            indexed_groups,
            active_events: active_events.into_iter().collect(),
        });
        Ok(())
    }

    /// Clears the index and releases every hook.
    pub fn dispose(&self) -> Result<()> {
        let _admin = self.admin()?;
        self.swap_index(EventIndex::empty())?;
        let changes = self.hook_table()?.release_all(self.inner.ports.hooks());
        self.publish_changes(&changes);
        info!(target: "workflows::index", released = changes.unsubscribed.len(), "workflows disposed");
        Ok(())
    }

    /// Subscribes exactly the hooks implied by `active_events`.
    pub fn sync_hooks(&self, active_events: &BTreeSet<EventKey>) -> Result<HookChanges> {
        let needed = required_hooks(active_events);
        let changes = self.hook_table()?.sync(self.inner.ports.hooks(), &needed)?;
        self.publish_changes(&changes);
        Ok(changes)
    }

    /// Subscribes any hook needed by the visible groups in `groups` that is
    /// not already held. Never releases a hook.
    pub fn ensure_event_hooks(&self, groups: &TriggerGroups) -> Result<HookChanges> {
        let needed = required_hooks(&groups.active_events());
        let changes = self.hook_table()?.ensure(self.inner.ports.hooks(), &needed)?;
        self.publish_changes(&changes);
        Ok(changes)
    }

    pub fn world_groups(&self) -> Result<TriggerGroups> {
        self.settings().world_groups()
    }

    /// Replaces the world groups and rebuilds.
    ///
    /// Labels are validated first; a rejected collection is neither persisted
    /// nor indexed.
    pub fn save_world_groups(&self, groups: &TriggerGroups) -> Result<()> {
        groups.validate()?;
        let _admin = self.admin()?;
        self.settings().replace_world_groups(groups)?;
        self.rebuild_locked()
    }

    pub fn upsert_world_group(&self, id: impl Into<GroupId>, group: TriggerGroup) -> Result<()> {
        let mut groups = self.world_groups()?;
        groups.upsert(id, group)?;
        self.save_world_groups(&groups)
    }

    pub fn remove_world_group(&self, id: &str) -> Result<Option<TriggerGroup>> {
        let mut groups = self.world_groups()?;
        let removed = groups.remove(id);
        if removed.is_some() {
            self.save_world_groups(&groups)?;
        }
        Ok(removed)
    }

    pub fn actor_groups(&self, actor: &str) -> Result<TriggerGroups> {
        actor_groups(self.inner.ports.world(), actor)
    }

    /// Replaces one actor's groups.
    ///
    /// The index is not rebuilt. Hooks the new groups need are subscribed
    /// right away; hooks they no longer need stay until the next rebuild.
    pub fn save_actor_groups(&self, actor: &str, groups: &TriggerGroups) -> Result<()> {
        groups.validate()?;
        if self.inner.ports.world().actor(actor)?.is_none() {
            return Err(WorkflowError::UnknownActor(actor.to_owned()));
        }
        replace_actor_groups(self.inner.ports.world(), actor, groups)?;
        if self.settings().enabled()? {
            self.ensure_event_hooks(groups)?;
        }
        Ok(())
    }

    pub fn upsert_actor_group(
        &self,
        actor: &str,
        id: impl Into<GroupId>,
        group: TriggerGroup,
    ) -> Result<()> {
        let mut groups = self.actor_groups(actor)?;
        groups.upsert(id, group)?;
        self.save_actor_groups(actor, &groups)
    }

    pub fn remove_actor_group(&self, actor: &str, id: &str) -> Result<Option<TriggerGroup>> {
        let mut groups = self.actor_groups(actor)?;
        let removed = groups.remove(id);
        if removed.is_some() {
            self.save_actor_groups(actor, &groups)?;
        }
        Ok(removed)
    }

    /// Flips the master switch and rebuilds.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let _admin = self.admin()?;
        self.settings().set_enabled(enabled)?;
        self.rebuild_locked()
    }

    /// Entry point for host hook deliveries.
    ///
    /// Deliveries for hooks the engine has not subscribed are ignored.
    pub async fn handle_hook(&self, payload: HookPayload) -> Result<DispatchSummary> {
        let hook = payload.hook();
        if !self.is_subscribed(hook) {
            debug!(target: "workflows::hooks", hook = hook.host_name(), "hook not subscribed, ignoring");
            return Ok(DispatchSummary::default());
        }

        let gate = OwnershipGate::new(
            self.inner.ports.world(),
            self.inner.config.require_ownership,
        );
        let dispatches = normalize(&payload, gate)?;

        let mut summary = DispatchSummary::default();
        for dispatch in dispatches {
            summary.merge(self.process_event(dispatch.event, dispatch.context).await);
        }
        Ok(summary)
    }

    /// Handles a delivery on a background task so the host's hook pipeline
    /// never waits on actions.
    pub fn spawn_hook(&self, payload: HookPayload) -> JoinHandle<Result<DispatchSummary>> {
        let engine = self.clone();
        tokio::spawn(async move { engine.handle_hook(payload).await })
    }

    fn settings(&self) -> WorkflowSettings<'_> {
        WorkflowSettings::new(self.inner.ports.settings(), &self.inner.config)
    }

    pub(crate) fn executor(&self) -> &ActionExecutor {
        &self.inner.executor
    }

    pub(crate) fn publish(&self, event: WorkflowEvent) {
        self.inner.events.publish(event);
    }

    fn publish_changes(&self, changes: &HookChanges) {
        for &hook in &changes.unsubscribed {
            self.publish(WorkflowEvent::HookUnsubscribed { hook });
        }
        for &hook in &changes.subscribed {
            self.publish(WorkflowEvent::HookSubscribed { hook });
        }
    }

    fn admin(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.inner
            .admin
            .lock()
            .map_err(|_| WorkflowError::LockPoisoned("engine admin"))
    }

    fn hook_table(&self) -> Result<std::sync::MutexGuard<'_, HookTable>> {
        self.inner
            .hooks
            .lock()
            .map_err(|_| WorkflowError::LockPoisoned("hook table"))
    }

    fn swap_index(&self, index: EventIndex) -> Result<()> {
        let mut current = self
            .inner
            .index
            .write()
            .map_err(|_| WorkflowError::LockPoisoned("event index"))?;
        *current = Arc::new(index);
        Ok(())
    }

    /// Events referenced by visible groups on any actor. Actors whose flag
    /// cannot be read are skipped.
    fn actor_active_events(&self) -> Result<BTreeSet<EventKey>> {
        let world = self.inner.ports.world();
        let mut events = BTreeSet::new();
        for actor in world.actor_ids()? {
            match actor_groups(world, &actor) {
                Ok(groups) => events.extend(groups.active_events()),
                Err(e) => warn!(
                    target: "workflows::index",
                    actor = %actor,
                    error = %e,
                    "skipping actor workflows"
                ),
            }
        }
        Ok(events)
    }
}

/// Builder for [`WorkflowEngine`].
pub struct WorkflowEngineBuilder {
    config: RuntimeConfig,
    ports: Option<HostPorts>,
    events: Option<EventBus>,
}

impl WorkflowEngineBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            ports: None,
            events: None,
        }
    }

    /// Override engine configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required host ports
    pub fn ports(mut self, ports: HostPorts) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Share an existing observer bus instead of creating one
    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the engine. Call [`WorkflowEngine::init`] before delivering
    /// hooks.
    pub fn build(self) -> Result<WorkflowEngine> {
        let ports = self.ports.ok_or(WorkflowError::MissingHost)?;
        let events = self
            .events
            .unwrap_or_else(|| EventBus::with_capacity(self.config.observer_buffer_size));
        let executor = ActionExecutor::new(ports.clone(), self.config.action_timeout);

        Ok(WorkflowEngine {
            inner: Arc::new(EngineInner {
                config: self.config,
                ports,
                executor,
                events,
                index: RwLock::new(Arc::new(EventIndex::empty())),
                hooks: Mutex::new(HookTable::default()),
                admin: Mutex::new(()),
            }),
        })
    }
}
