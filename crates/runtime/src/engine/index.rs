//! Event index: global groups bucketed by the events they listen for.
//!
//! The index is an immutable snapshot. Rebuilding produces a new one which the
//! engine swaps in atomically, so a dispatch in flight keeps reading the
//! snapshot it started with.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use workflow_core::{EventKey, GroupId, TriggerGroup, TriggerGroups};

/// A global group stored in an index bucket.
#[derive(Debug, Clone)]
pub struct IndexedGroup {
    pub id: GroupId,
    pub group: Arc<TriggerGroup>,
}

#[derive(Debug, Default)]
pub struct EventIndex {
    buckets: HashMap<EventKey, Vec<IndexedGroup>>,
    group_count: usize,
}

impl EventIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes every visible group once under each distinct event it
    /// references. Hidden groups are left out entirely.
    pub fn build(groups: &TriggerGroups) -> Self {
        let mut index = Self::empty();
        for (id, group) in groups.visible() {
            let events = group.events();
            if events.is_empty() {
                continue;
            }
            let shared = Arc::new(group.clone());
            for event in events {
                index.buckets.entry(event).or_default().push(IndexedGroup {
                    id: id.to_owned(),
                    group: Arc::clone(&shared),
                });
            }
            index.group_count += 1;
        }
        index
    }

    /// Groups listening for `event`, in settings order.
    pub fn get(&self, event: EventKey) -> &[IndexedGroup] {
        self.buckets.get(&event).map_or(&[], Vec::as_slice)
    }

    /// Events with a non-empty bucket.
    pub fn events(&self) -> BTreeSet<EventKey> {
        self.buckets.keys().copied().collect()
    }

    /// Number of distinct groups in the index.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_core::{Action, Operator, Trigger};

    fn groups() -> TriggerGroups {
        [
            (
                "crits",
                TriggerGroup::new("Crits")
                    .with_trigger("a", Trigger::on(EventKey::RollAttack).when(Operator::Eq, 20.0))
                    .with_trigger("b", Trigger::on(EventKey::RollAttack).when(Operator::Eq, 1.0))
                    .with_trigger("c", Trigger::on(EventKey::RollDamage))
                    .with_action("x", Action::run_macro("Macro.crit")),
            ),
            (
                "down",
                TriggerGroup::new("Down").with_trigger("a", Trigger::on(EventKey::ZeroHp)),
            ),
            (
                "off",
                TriggerGroup::new("Off")
                    .with_trigger("a", Trigger::on(EventKey::LongRest))
                    .hidden(),
            ),
            ("empty", TriggerGroup::new("Empty")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn each_group_appears_once_per_event() {
        let index = EventIndex::build(&groups());

        let attack: Vec<_> = index.get(EventKey::RollAttack).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(attack, vec!["crits"]);
        assert_eq!(index.get(EventKey::RollDamage).len(), 1);
        assert_eq!(index.get(EventKey::ZeroHp)[0].id, "down");
        assert_eq!(index.group_count(), 2);
    }

    #[test]
    fn hidden_groups_are_not_indexed() {
        let index = EventIndex::build(&groups());
        assert!(index.get(EventKey::LongRest).is_empty());
        assert_eq!(
            index.events().into_iter().collect::<Vec<_>>(),
            vec![EventKey::RollAttack, EventKey::RollDamage, EventKey::ZeroHp]
        );
    }

    #[test]
    fn buckets_keep_settings_order() {
        let groups: TriggerGroups = ["z", "a", "m"]
            .into_iter()
            .map(|id| {
                (
                    id,
                    TriggerGroup::new(id).with_trigger("t", Trigger::on(EventKey::ShortRest)),
                )
            })
            .collect();
        let index = EventIndex::build(&groups);
        let order: Vec<_> = index.get(EventKey::ShortRest).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }
}
