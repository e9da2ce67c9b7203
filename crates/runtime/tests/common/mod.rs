//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use workflow_core::{Action, Trigger, TriggerGroup, TriggerGroups};
use workflow_runtime::host::memory::{
    HostCall, MemoryHookBus, MemorySettings, MemoryWorld, RecordingActionHost, StoredActor,
};
use workflow_runtime::{ActorSnapshot, HitPoints, HostPorts, RuntimeConfig, WorkflowEngine};

pub struct Harness {
    pub engine: WorkflowEngine,
    pub settings: Arc<MemorySettings>,
    pub world: Arc<MemoryWorld>,
    pub bus: Arc<MemoryHookBus>,
    pub host: Arc<RecordingActionHost>,
}

impl Harness {
    pub fn new(settings: MemorySettings, world: MemoryWorld, host: RecordingActionHost) -> Self {
        Self::with_config(settings, world, host, RuntimeConfig::default())
    }

    pub fn with_config(
        settings: MemorySettings,
        world: MemoryWorld,
        host: RecordingActionHost,
        config: RuntimeConfig,
    ) -> Self {
        let settings = Arc::new(settings);
        let world = Arc::new(world);
        let bus = Arc::new(MemoryHookBus::new());
        let host = Arc::new(host);
        let ports = HostPorts::new(settings.clone(), world.clone(), bus.clone(), host.clone());
        let engine = WorkflowEngine::builder()
            .config(config)
            .ports(ports)
            .build()
            .expect("engine should build with ports");
        Self {
            engine,
            settings,
            world,
            bus,
            host,
        }
    }

    /// Builds and initializes an engine over enabled world settings.
    pub fn started(groups: &TriggerGroups, world: MemoryWorld, host: RecordingActionHost) -> Self {
        let harness = Self::new(enabled_settings(groups), world, host);
        harness.engine.init().expect("init should succeed");
        harness
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.host.calls()
    }

    /// UUIDs of executed macros, in execution order.
    pub fn executed_macros(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ExecuteMacro { uuid, .. } => Some(uuid),
                _ => None,
            })
            .collect()
    }
}

pub fn enabled_settings(groups: &TriggerGroups) -> MemorySettings {
    MemorySettings::new()
        .with("workflows.enable", json!(true))
        .with(
            "workflows.workflows",
            serde_json::to_value(groups).expect("groups serialize"),
        )
}

pub fn groups<const N: usize>(entries: [(&str, TriggerGroup); N]) -> TriggerGroups {
    entries.into_iter().collect()
}

pub fn to_flag(groups: &TriggerGroups) -> serde_json::Value {
    serde_json::to_value(groups).expect("groups serialize")
}

/// Character at 20/40 HP with a token on the scene.
pub fn hero() -> StoredActor {
    StoredActor::new(
        ActorSnapshot::new("hero", "character")
            .named("Hero")
            .with_hp(HitPoints::new(20.0, 40.0)),
    )
    .with_token("tok-hero")
}

pub fn goblin() -> StoredActor {
    StoredActor::new(
        ActorSnapshot::new("goblin", "npc")
            .named("Goblin")
            .with_hp(HitPoints::new(7.0, 7.0)),
    )
}

/// Group running one macro per UUID whenever `trigger` matches.
pub fn macro_group(label: &str, trigger: Trigger, macros: &[&str]) -> TriggerGroup {
    macros.iter().enumerate().fold(
        TriggerGroup::new(label).with_trigger("t0", trigger),
        |group, (i, uuid)| group.with_action(format!("a{i}"), Action::run_macro(*uuid)),
    )
}
