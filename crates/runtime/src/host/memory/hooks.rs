//! In-memory HookBus implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use workflow_core::HookName;

use crate::host::{HookBus, HookId, HostError, HostResult};

/// Tracks live subscriptions and counts every `on`/`off` call.
#[derive(Default)]
pub struct MemoryHookBus {
    next_id: AtomicU64,
    live: RwLock<BTreeMap<HookId, HookName>>,
    calls: AtomicU64,
}

impl MemoryHookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks with at least one live subscription.
    pub fn subscribed(&self) -> BTreeSet<HookName> {
        self.live
            .read()
            .map(|live| live.values().copied().collect())
            .unwrap_or_default()
    }

    /// Number of live subscriptions, counting duplicates.
    pub fn live_count(&self) -> usize {
        self.live.read().map(|live| live.len()).unwrap_or_default()
    }

    /// Total `on` plus `off` calls received.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl HookBus for MemoryHookBus {
    fn on(&self, hook: HookName) -> HostResult<HookId> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.live
            .write()
            .map_err(|_| HostError::LockPoisoned("hook bus"))?
            .insert(id, hook);
        Ok(id)
    }

    fn off(&self, hook: HookName, id: HookId) -> HostResult<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let mut live = self
            .live
            .write()
            .map_err(|_| HostError::LockPoisoned("hook bus"))?;
        match live.get(&id) {
            Some(held) if *held == hook => {
                live.remove(&id);
                Ok(())
            }
            _ => Err(HostError::Rejected(format!(
                "no {} subscription with id {id}",
                hook.host_name()
            ))),
        }
    }
}
