//! Host hook subscription table.
//!
//! Holds exactly the hooks currently wired to the dispatcher, keyed by hook
//! name. [`HookTable::sync`] reconciles against a required set in both
//! directions; [`HookTable::ensure`] only ever adds.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};
use workflow_core::HookName;

use crate::host::{HookBus, HookId, HostResult};

/// Hooks added and removed by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookChanges {
    pub subscribed: Vec<HookName>,
    pub unsubscribed: Vec<HookName>,
}

impl HookChanges {
    pub fn is_empty(&self) -> bool {
        self.subscribed.is_empty() && self.unsubscribed.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct HookTable {
    held: HashMap<HookName, HookId>,
}

impl HookTable {
    pub(crate) fn contains(&self, hook: HookName) -> bool {
        self.held.contains_key(&hook)
    }

    pub(crate) fn held(&self) -> BTreeSet<HookName> {
        self.held.keys().copied().collect()
    }

    /// Releases hooks outside `needed` and subscribes the missing ones.
    pub(crate) fn sync(
        &mut self,
        bus: &dyn HookBus,
        needed: &BTreeSet<HookName>,
    ) -> HostResult<HookChanges> {
        let stale: Vec<HookName> = self
            .held
            .keys()
            .copied()
            .filter(|hook| !needed.contains(hook))
            .collect();

        let mut changes = HookChanges::default();
        for hook in stale {
            self.release(bus, hook);
            changes.unsubscribed.push(hook);
        }
        changes.subscribed = self.subscribe_missing(bus, needed)?;
        Ok(changes)
    }

    /// Subscribes every hook in `needed` not already held. Never releases.
    pub(crate) fn ensure(
        &mut self,
        bus: &dyn HookBus,
        needed: &BTreeSet<HookName>,
    ) -> HostResult<HookChanges> {
        Ok(HookChanges {
            subscribed: self.subscribe_missing(bus, needed)?,
            unsubscribed: Vec::new(),
        })
    }

    pub(crate) fn release_all(&mut self, bus: &dyn HookBus) -> HookChanges {
        let mut held: Vec<HookName> = self.held.keys().copied().collect();
        held.sort();
        for &hook in &held {
            self.release(bus, hook);
        }
        HookChanges {
            subscribed: Vec::new(),
            unsubscribed: held,
        }
    }

    fn subscribe_missing(
        &mut self,
        bus: &dyn HookBus,
        needed: &BTreeSet<HookName>,
    ) -> HostResult<Vec<HookName>> {
        let mut added = Vec::new();
        for &hook in needed {
            if self.held.contains_key(&hook) {
                continue;
            }
            let id = bus.on(hook)?;
            debug!(target: "workflows::hooks", hook = hook.host_name(), id, "subscribed");
            self.held.insert(hook, id);
            added.push(hook);
        }
        Ok(added)
    }

    /// Drops the handle even when the host refuses the release, so a stale
    /// handle is never retried.
    fn release(&mut self, bus: &dyn HookBus, hook: HookName) {
        let Some(id) = self.held.remove(&hook) else {
            return;
        };
        match bus.off(hook, id) {
            Ok(()) => debug!(target: "workflows::hooks", hook = hook.host_name(), id, "unsubscribed"),
            Err(e) => warn!(
                target: "workflows::hooks",
                hook = hook.host_name(),
                id,
                error = %e,
                "host refused to release hook"
            ),
        }
    }
}
